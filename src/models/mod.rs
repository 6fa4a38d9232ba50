// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod exercise;
pub mod scheduled_workout;
pub mod user;
pub mod workout_plan;

pub use exercise::{Exercise, ExerciseCategory, ExerciseFilter, MuscleGroup};
pub use scheduled_workout::{ScheduledWorkout, WorkoutStatus};
pub use user::{User, UserChanges};
pub use workout_plan::{WorkoutExercise, WorkoutPlan};
