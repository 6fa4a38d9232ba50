// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout plan model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// An exercise slot inside a workout plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutExercise {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub sets: u32,
    pub repetitions: u32,
    /// Load in kilograms, for weighted exercises
    pub weight: Option<f64>,
    /// Position within the plan
    pub order_index: u32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Workout plan owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
    /// Distinct exercise IDs referenced by `exercises` (queryable in Firestore)
    #[serde(default)]
    pub exercise_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkoutPlan {
    pub fn new(user_id: Uuid, name: String, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            description,
            exercises: Vec::new(),
            exercise_ids: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Add an exercise slot, keeping slots ordered by `order_index`.
    pub fn push_exercise(&mut self, slot: WorkoutExercise) {
        self.exercises.push(slot);
        self.exercises.sort_by_key(|e| e.order_index);
        self.sync_exercise_ids();
    }

    /// Remove a slot by its ID. Returns `false` if no such slot exists.
    pub fn remove_exercise(&mut self, workout_exercise_id: Uuid) -> bool {
        let before = self.exercises.len();
        self.exercises.retain(|e| e.id != workout_exercise_id);
        let removed = self.exercises.len() != before;
        if removed {
            self.sync_exercise_ids();
        }
        removed
    }

    pub fn references_exercise(&self, exercise_id: Uuid) -> bool {
        self.exercises.iter().any(|e| e.exercise_id == exercise_id)
    }

    fn sync_exercise_ids(&mut self) {
        let mut ids: Vec<Uuid> = self.exercises.iter().map(|e| e.exercise_id).collect();
        ids.sort();
        ids.dedup();
        self.exercise_ids = ids;
    }
}
