// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store backed by `DashMap`.
//!
//! Used when no GCP project is configured and by the test suite. Data
//! lives only as long as the process.

use super::{exercise_in_use, Store};
use crate::error::AppError;
use crate::models::{Exercise, ScheduledWorkout, User, UserChanges, WorkoutPlan};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryDb {
    users: DashMap<Uuid, User>,
    /// email -> user ID; the uniqueness index
    emails: DashMap<String, Uuid>,
    exercises: DashMap<Uuid, Exercise>,
    workout_plans: DashMap<Uuid, WorkoutPlan>,
    scheduled_workouts: DashMap<Uuid, ScheduledWorkout>,
    /// Held while plan references to exercises are checked or changed
    plan_refs: Mutex<()>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_plan_refs(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock is still usable
        self.plan_refs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Store for MemoryDb {
    // ─── Users ───────────────────────────────────────────────────

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let Some(id) = self.emails.get(email).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_user_by_oauth(
        &self,
        provider: &str,
        oauth_id: &str,
    ) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|u| {
                u.oauth_provider.as_deref() == Some(provider) && u.oauth_id.as_deref() == Some(oauth_id)
            })
            .map(|u| u.value().clone()))
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(AppError::DuplicateEmail),
            Entry::Vacant(slot) => {
                self.users.insert(user.id, user.clone());
                slot.insert(user.id);
                Ok(())
            }
        }
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError> {
        let Some(current_email) = self.users.get(&id).map(|u| u.email.clone()) else {
            return Ok(None);
        };

        // Claim the new email before touching the record
        let new_email = changes.email.clone().filter(|e| *e != current_email);
        if let Some(email) = &new_email {
            match self.emails.entry(email.clone()) {
                Entry::Occupied(_) => return Err(AppError::DuplicateEmail),
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }

        let updated = match self.users.get_mut(&id) {
            Some(mut user) => {
                changes.apply(&mut user);
                Some(user.clone())
            }
            None => None,
        };

        match (&updated, new_email) {
            (Some(_), Some(_)) => {
                self.emails.remove(&current_email);
            }
            // Deleted concurrently; release the claimed email
            (None, Some(email)) => {
                self.emails.remove(&email);
            }
            _ => {}
        }

        Ok(updated)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let Some((_, user)) = self.users.remove(&id) else {
            return Ok(false);
        };
        self.emails.remove(&user.email);

        let plan_ids: Vec<Uuid> = self
            .workout_plans
            .iter()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        for plan_id in &plan_ids {
            self.workout_plans.remove(plan_id);
        }

        self.scheduled_workouts
            .retain(|_, w| w.user_id != id && !plan_ids.contains(&w.workout_plan_id));

        for mut exercise in self.exercises.iter_mut() {
            if exercise.created_by == Some(id) {
                exercise.created_by = None;
            }
        }

        tracing::debug!(user_id = %id, plans = plan_ids.len(), "Deleted user data");
        Ok(true)
    }

    // ─── Exercises ───────────────────────────────────────────────

    async fn find_exercise(&self, id: Uuid) -> Result<Option<Exercise>, AppError> {
        Ok(self.exercises.get(&id).map(|e| e.value().clone()))
    }

    async fn list_visible_exercises(&self, viewer: Uuid) -> Result<Vec<Exercise>, AppError> {
        Ok(self
            .exercises
            .iter()
            .filter(|e| e.is_public || e.created_by == Some(viewer))
            .map(|e| e.value().clone())
            .collect())
    }

    async fn save_exercise(&self, exercise: &Exercise) -> Result<(), AppError> {
        self.exercises.insert(exercise.id, exercise.clone());
        Ok(())
    }

    async fn delete_exercise(&self, id: Uuid) -> Result<bool, AppError> {
        let _refs = self.lock_plan_refs();
        if self
            .workout_plans
            .iter()
            .any(|p| p.references_exercise(id))
        {
            return Err(exercise_in_use(id));
        }
        Ok(self.exercises.remove(&id).is_some())
    }

    // ─── Workout Plans ───────────────────────────────────────────

    async fn find_workout_plan(&self, id: Uuid) -> Result<Option<WorkoutPlan>, AppError> {
        Ok(self.workout_plans.get(&id).map(|p| p.value().clone()))
    }

    async fn list_workout_plans(&self, owner: Uuid) -> Result<Vec<WorkoutPlan>, AppError> {
        let mut plans: Vec<WorkoutPlan> = self
            .workout_plans
            .iter()
            .filter(|p| p.user_id == owner)
            .map(|p| p.value().clone())
            .collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plans)
    }

    /// Fails with `NotFound` if a referenced exercise no longer exists.
    async fn save_workout_plan(&self, plan: &WorkoutPlan) -> Result<(), AppError> {
        let _refs = self.lock_plan_refs();
        if let Some(missing) = plan
            .exercise_ids
            .iter()
            .find(|id| !self.exercises.contains_key(id))
        {
            return Err(AppError::NotFound(format!("exercise {missing}")));
        }
        self.workout_plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn delete_workout_plan(&self, id: Uuid) -> Result<bool, AppError> {
        let removed = self.workout_plans.remove(&id).is_some();
        if removed {
            self.scheduled_workouts.retain(|_, w| w.workout_plan_id != id);
        }
        Ok(removed)
    }

    // ─── Scheduled Workouts ──────────────────────────────────────

    async fn find_scheduled_workout(&self, id: Uuid) -> Result<Option<ScheduledWorkout>, AppError> {
        Ok(self.scheduled_workouts.get(&id).map(|w| w.value().clone()))
    }

    async fn list_scheduled_workouts(
        &self,
        owner: Uuid,
    ) -> Result<Vec<ScheduledWorkout>, AppError> {
        let mut workouts: Vec<ScheduledWorkout> = self
            .scheduled_workouts
            .iter()
            .filter(|w| w.user_id == owner)
            .map(|w| w.value().clone())
            .collect();
        workouts.sort_by(|a, b| {
            a.scheduled_date
                .cmp(&b.scheduled_date)
                .then_with(|| a.scheduled_time.cmp(&b.scheduled_time))
        });
        Ok(workouts)
    }

    async fn save_scheduled_workout(&self, workout: &ScheduledWorkout) -> Result<(), AppError> {
        self.scheduled_workouts.insert(workout.id, workout.clone());
        Ok(())
    }

    async fn delete_scheduled_workout(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.scheduled_workouts.remove(&id).is_some())
    }
}
