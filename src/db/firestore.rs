// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Documents are keyed by the UUID of the record they hold. Workout
//! plans carry a denormalized `exercise_ids` array so the "exercise in
//! use" check is a single `array_contains` query.

use super::{collections, exercise_in_use, Store};
use crate::error::AppError;
use crate::models::{Exercise, ScheduledWorkout, User, UserChanges, WorkoutPlan};
use async_trait::async_trait;
use uuid::Uuid;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

fn db_err(e: impl std::fmt::Display) -> AppError {
    AppError::Database(e.to_string())
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator accepts any token; skip the credential lookup.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client that is not connected.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    async fn get_doc<T>(&self, collection: &str, id: Uuid) -> Result<Option<T>, AppError>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(&id.to_string())
            .await
            .map_err(db_err)
    }

    async fn put_doc<T>(&self, collection: &str, id: Uuid, doc: &T) -> Result<(), AppError>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id.to_string())
            .object(doc)
            .execute()
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Delete a document. Returns `false` if it did not exist.
    async fn delete_doc<T>(&self, collection: &str, id: Uuid) -> Result<bool, AppError>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        if self.get_doc::<T>(collection, id).await?.is_none() {
            return Ok(false);
        }
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(id.to_string())
            .execute()
            .await
            .map_err(db_err)?;
        Ok(true)
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    async fn scheduled_for_plan(&self, plan_id: Uuid) -> Result<Vec<ScheduledWorkout>, AppError> {
        let plan_id = plan_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SCHEDULED_WORKOUTS)
            .filter(|q| q.for_all([q.field("workout_plan_id").eq(plan_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(db_err)
    }
}

#[async_trait]
impl Store for FirestoreDb {
    // ─── Users ───────────────────────────────────────────────────

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("email").eq(email)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(db_err)?;
        Ok(users.into_iter().next())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.get_doc(collections::USERS, id).await
    }

    async fn find_user_by_oauth(
        &self,
        provider: &str,
        oauth_id: &str,
    ) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| {
                q.for_all([
                    q.field("oauth_provider").eq(provider),
                    q.field("oauth_id").eq(oauth_id),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(db_err)?;
        Ok(users.into_iter().next())
    }

    // Check-then-write: two concurrent registrations for the same email
    // can both pass the lookup.
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        if self.find_user_by_email(&user.email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }
        self.put_doc(collections::USERS, user.id, user).await
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError> {
        let Some(mut user) = self.find_user_by_id(id).await? else {
            return Ok(None);
        };

        if let Some(email) = changes.email.as_deref().filter(|e| *e != user.email) {
            if self.find_user_by_email(email).await?.is_some() {
                return Err(AppError::DuplicateEmail);
            }
        }

        changes.apply(&mut user);
        self.put_doc(collections::USERS, id, &user).await?;
        Ok(Some(user))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        if self.find_user_by_id(id).await?.is_none() {
            return Ok(false);
        }
        let owner = id.to_string();

        // 1. Scheduled workouts
        let scheduled: Vec<ScheduledWorkout> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::SCHEDULED_WORKOUTS)
            .filter(|q| q.for_all([q.field("user_id").eq(owner.clone())]))
            .obj()
            .query()
            .await
            .map_err(db_err)?;
        self.batch_delete(&scheduled, collections::SCHEDULED_WORKOUTS, |w| {
            w.id.to_string()
        })
        .await?;
        tracing::debug!(user_id = %id, count = scheduled.len(), "Deleted scheduled workouts");

        // 2. Workout plans
        let plans: Vec<WorkoutPlan> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::WORKOUT_PLANS)
            .filter(|q| q.for_all([q.field("user_id").eq(owner.clone())]))
            .obj()
            .query()
            .await
            .map_err(db_err)?;
        self.batch_delete(&plans, collections::WORKOUT_PLANS, |p| p.id.to_string())
            .await?;
        tracing::debug!(user_id = %id, count = plans.len(), "Deleted workout plans");

        // 3. Exercises stay in the catalogue without an owner
        let exercises: Vec<Exercise> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::EXERCISES)
            .filter(|q| q.for_all([q.field("created_by").eq(owner.clone())]))
            .obj()
            .query()
            .await
            .map_err(db_err)?;
        for mut exercise in exercises {
            exercise.created_by = None;
            self.save_exercise(&exercise).await?;
        }

        // 4. Profile
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(&owner)
            .execute()
            .await
            .map_err(db_err)?;

        tracing::info!(user_id = %id, "User data deletion complete");
        Ok(true)
    }

    // ─── Exercises ───────────────────────────────────────────────

    async fn find_exercise(&self, id: Uuid) -> Result<Option<Exercise>, AppError> {
        self.get_doc(collections::EXERCISES, id).await
    }

    async fn list_visible_exercises(&self, viewer: Uuid) -> Result<Vec<Exercise>, AppError> {
        let viewer = viewer.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::EXERCISES)
            .filter(|q| {
                q.for_any([
                    q.field("is_public").eq(true),
                    q.field("created_by").eq(viewer.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    async fn save_exercise(&self, exercise: &Exercise) -> Result<(), AppError> {
        self.put_doc(collections::EXERCISES, exercise.id, exercise)
            .await
    }

    async fn delete_exercise(&self, id: Uuid) -> Result<bool, AppError> {
        let exercise_id = id.to_string();
        let plans: Vec<WorkoutPlan> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::WORKOUT_PLANS)
            .filter(|q| q.for_all([q.field("exercise_ids").array_contains(exercise_id.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(db_err)?;
        if !plans.is_empty() {
            return Err(exercise_in_use(id));
        }

        self.delete_doc::<Exercise>(collections::EXERCISES, id).await
    }

    // ─── Workout Plans ───────────────────────────────────────────

    async fn find_workout_plan(&self, id: Uuid) -> Result<Option<WorkoutPlan>, AppError> {
        self.get_doc(collections::WORKOUT_PLANS, id).await
    }

    async fn list_workout_plans(&self, owner: Uuid) -> Result<Vec<WorkoutPlan>, AppError> {
        let owner = owner.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WORKOUT_PLANS)
            .filter(|q| q.for_all([q.field("user_id").eq(owner.clone())]))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    async fn save_workout_plan(&self, plan: &WorkoutPlan) -> Result<(), AppError> {
        self.put_doc(collections::WORKOUT_PLANS, plan.id, plan).await
    }

    async fn delete_workout_plan(&self, id: Uuid) -> Result<bool, AppError> {
        if !self
            .delete_doc::<WorkoutPlan>(collections::WORKOUT_PLANS, id)
            .await?
        {
            return Ok(false);
        }

        let scheduled = self.scheduled_for_plan(id).await?;
        self.batch_delete(&scheduled, collections::SCHEDULED_WORKOUTS, |w| {
            w.id.to_string()
        })
        .await?;
        tracing::debug!(plan_id = %id, count = scheduled.len(), "Deleted scheduled workouts for plan");

        Ok(true)
    }

    // ─── Scheduled Workouts ──────────────────────────────────────

    async fn find_scheduled_workout(&self, id: Uuid) -> Result<Option<ScheduledWorkout>, AppError> {
        self.get_doc(collections::SCHEDULED_WORKOUTS, id).await
    }

    async fn list_scheduled_workouts(
        &self,
        owner: Uuid,
    ) -> Result<Vec<ScheduledWorkout>, AppError> {
        let owner = owner.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SCHEDULED_WORKOUTS)
            .filter(|q| q.for_all([q.field("user_id").eq(owner.clone())]))
            .order_by([("scheduled_date", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    async fn save_scheduled_workout(&self, workout: &ScheduledWorkout) -> Result<(), AppError> {
        self.put_doc(collections::SCHEDULED_WORKOUTS, workout.id, workout)
            .await
    }

    async fn delete_scheduled_workout(&self, id: Uuid) -> Result<bool, AppError> {
        self.delete_doc::<ScheduledWorkout>(collections::SCHEDULED_WORKOUTS, id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExerciseCategory, MuscleGroup};
    use chrono::{NaiveDate, Utc};

    fn assert_storable<T>()
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
    {
    }

    #[test]
    fn records_meet_document_bounds() {
        assert_storable::<User>();
        assert_storable::<Exercise>();
        assert_storable::<WorkoutPlan>();
        assert_storable::<ScheduledWorkout>();
    }

    #[tokio::test]
    async fn offline_writes_report_database_error() {
        let db = FirestoreDb::new_mock();
        let owner = Uuid::new_v4();

        let user = User::with_password("offline@example.com".into(), "h".into(), None);
        assert!(matches!(db.insert_user(&user).await, Err(AppError::Database(_))));

        let exercise = Exercise {
            id: Uuid::new_v4(),
            name: "Plank".to_string(),
            description: None,
            category: ExerciseCategory::Strength,
            muscle_group: MuscleGroup::Core,
            created_by: Some(owner),
            is_public: false,
            created_at: Utc::now(),
            updated_at: None,
        };
        assert!(matches!(
            db.save_exercise(&exercise).await,
            Err(AppError::Database(_))
        ));

        let plan = WorkoutPlan::new(owner, "Core".to_string(), None);
        assert!(matches!(
            db.save_workout_plan(&plan).await,
            Err(AppError::Database(_))
        ));

        let workout = ScheduledWorkout {
            id: Uuid::new_v4(),
            user_id: owner,
            workout_plan_id: plan.id,
            scheduled_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            scheduled_time: None,
            status: Default::default(),
            completed_at: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        assert!(matches!(
            db.save_scheduled_workout(&workout).await,
            Err(AppError::Database(_))
        ));
    }
}
