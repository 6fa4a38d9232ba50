//! Persistence layer.
//!
//! Handlers talk to a [`Store`]; `MemoryDb` backs local runs and tests,
//! `FirestoreDb` backs deployments.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Exercise, ScheduledWorkout, User, UserChanges, WorkoutPlan};
use async_trait::async_trait;
use uuid::Uuid;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const EXERCISES: &str = "exercises";
    pub const WORKOUT_PLANS: &str = "workout_plans";
    pub const SCHEDULED_WORKOUTS: &str = "scheduled_workouts";
}

/// Storage operations used by the API.
#[async_trait]
pub trait Store: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_user_by_oauth(
        &self,
        provider: &str,
        oauth_id: &str,
    ) -> Result<Option<User>, AppError>;

    /// Insert a new user. Fails with `DuplicateEmail` if the email is taken.
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;

    /// Apply `changes` to a user. Returns `None` if the user does not exist.
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError>;

    /// Delete a user with their workout plans and scheduled workouts.
    /// Exercises they created are kept with the owner cleared.
    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError>;

    // ─── Exercises ───────────────────────────────────────────────

    async fn find_exercise(&self, id: Uuid) -> Result<Option<Exercise>, AppError>;

    /// All exercises owned by `viewer` or marked public.
    async fn list_visible_exercises(&self, viewer: Uuid) -> Result<Vec<Exercise>, AppError>;

    /// Create or replace an exercise.
    async fn save_exercise(&self, exercise: &Exercise) -> Result<(), AppError>;

    /// Delete an exercise. Fails with `Conflict` while a workout plan uses it.
    async fn delete_exercise(&self, id: Uuid) -> Result<bool, AppError>;

    // ─── Workout Plans ───────────────────────────────────────────

    async fn find_workout_plan(&self, id: Uuid) -> Result<Option<WorkoutPlan>, AppError>;

    async fn list_workout_plans(&self, owner: Uuid) -> Result<Vec<WorkoutPlan>, AppError>;

    async fn save_workout_plan(&self, plan: &WorkoutPlan) -> Result<(), AppError>;

    /// Delete a plan and the sessions scheduled from it.
    async fn delete_workout_plan(&self, id: Uuid) -> Result<bool, AppError>;

    // ─── Scheduled Workouts ──────────────────────────────────────

    async fn find_scheduled_workout(&self, id: Uuid) -> Result<Option<ScheduledWorkout>, AppError>;

    async fn list_scheduled_workouts(&self, owner: Uuid)
        -> Result<Vec<ScheduledWorkout>, AppError>;

    async fn save_scheduled_workout(&self, workout: &ScheduledWorkout) -> Result<(), AppError>;

    async fn delete_scheduled_workout(&self, id: Uuid) -> Result<bool, AppError>;
}

pub(crate) fn exercise_in_use(exercise_id: Uuid) -> AppError {
    AppError::Conflict(format!(
        "Exercise {exercise_id} is used in one or more workout plans"
    ))
}
