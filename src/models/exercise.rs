// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise model and list filtering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Kind of training an exercise belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
    Strength,
    Cardio,
    Flexibility,
    Balance,
    Sports,
}

impl ExerciseCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseCategory::Strength => "strength",
            ExerciseCategory::Cardio => "cardio",
            ExerciseCategory::Flexibility => "flexibility",
            ExerciseCategory::Balance => "balance",
            ExerciseCategory::Sports => "sports",
        }
    }
}

/// Primary muscle group targeted by an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Arms,
    Legs,
    Core,
    FullBody,
    Glutes,
}

/// Exercise definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: ExerciseCategory,
    pub muscle_group: MuscleGroup,
    /// Owner; cleared when the owning account is deleted
    pub created_by: Option<Uuid>,
    #[serde(default)]
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Column an exercise list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseSortField {
    Name,
    #[default]
    CreatedAt,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filters applied to the set of exercises visible to a viewer.
#[derive(Debug, Clone, Default)]
pub struct ExerciseFilter {
    pub viewer: Uuid,
    pub only_mine: bool,
    pub category: Option<ExerciseCategory>,
    pub muscle_group: Option<MuscleGroup>,
    pub is_public: Option<bool>,
    pub search: Option<String>,
    pub sort_by: ExerciseSortField,
    pub sort_order: SortOrder,
    pub skip: usize,
    pub limit: usize,
}

impl ExerciseFilter {
    fn matches(&self, exercise: &Exercise) -> bool {
        if self.only_mine && exercise.created_by != Some(self.viewer) {
            return false;
        }
        if self.category.is_some_and(|c| c != exercise.category) {
            return false;
        }
        if self.muscle_group.is_some_and(|m| m != exercise.muscle_group) {
            return false;
        }
        if self.is_public.is_some_and(|p| p != exercise.is_public) {
            return false;
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let in_name = exercise.name.to_lowercase().contains(&needle);
            let in_description = exercise
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_name && !in_description {
                return false;
            }
        }
        true
    }

    fn compare(&self, a: &Exercise, b: &Exercise) -> Ordering {
        let ordering = match self.sort_by {
            ExerciseSortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            ExerciseSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            ExerciseSortField::Category => a.category.as_str().cmp(b.category.as_str()),
        }
        // Stable tie-break so pages don't shuffle between requests
        .then_with(|| a.id.cmp(&b.id));

        match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Filter, sort and page `visible`. Returns the page and the total match count.
    pub fn apply(&self, visible: Vec<Exercise>) -> (Vec<Exercise>, usize) {
        let mut matching: Vec<Exercise> = visible.into_iter().filter(|e| self.matches(e)).collect();
        matching.sort_by(|a, b| self.compare(a, b));

        let total = matching.len();
        let page = matching.into_iter().skip(self.skip).take(self.limit).collect();
        (page, total)
    }
}
