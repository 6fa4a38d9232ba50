// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scheduled workout session model.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

/// A workout plan booked for a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScheduledWorkout {
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    pub workout_plan_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
    #[serde(default)]
    pub status: WorkoutStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ScheduledWorkout {
    /// Mark as completed now, optionally replacing the notes.
    pub fn complete(&mut self, notes: Option<String>) {
        let now = Utc::now();
        self.status = WorkoutStatus::Completed;
        self.completed_at = Some(now);
        if notes.is_some() {
            self.notes = notes;
        }
        self.updated_at = Some(now);
    }
}
