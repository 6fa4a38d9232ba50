// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout plan routes. Plans are private to their owner.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{User, WorkoutExercise, WorkoutPlan};
use crate::services::access;
use crate::time_utils::{format_optional_rfc3339, format_utc_rfc3339};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// Workout plan routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/workout-plans", get(list_plans).post(create_plan))
        .route(
            "/api/v1/workout-plans/{id}",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
        .route("/api/v1/workout-plans/{id}/exercises", post(add_exercise))
        .route(
            "/api/v1/workout-plans/{id}/exercises/{workout_exercise_id}",
            delete(remove_exercise),
        )
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutExerciseResponse {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub sets: u32,
    pub repetitions: u32,
    pub weight: Option<f64>,
    pub order_index: u32,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<WorkoutExercise> for WorkoutExerciseResponse {
    fn from(e: WorkoutExercise) -> Self {
        Self {
            id: e.id,
            exercise_id: e.exercise_id,
            sets: e.sets,
            repetitions: e.repetitions,
            weight: e.weight,
            order_index: e.order_index,
            notes: e.notes,
            created_at: format_utc_rfc3339(e.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutPlanResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub exercises: Vec<WorkoutExerciseResponse>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<WorkoutPlan> for WorkoutPlanResponse {
    fn from(p: WorkoutPlan) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            name: p.name,
            description: p.description,
            exercises: p.exercises.into_iter().map(Into::into).collect(),
            created_at: format_utc_rfc3339(p.created_at),
            updated_at: format_optional_rfc3339(p.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
struct WorkoutExerciseRequest {
    exercise_id: Uuid,
    #[validate(range(min = 1, max = 100))]
    sets: u32,
    #[validate(range(min = 1, max = 1000))]
    repetitions: u32,
    #[validate(range(min = 0.0))]
    weight: Option<f64>,
    /// Defaults to the end of the plan
    order_index: Option<u32>,
    #[validate(length(max = 500))]
    notes: Option<String>,
}

/// Turn a requested slot into a plan entry.
///
/// The referenced exercise must exist and be visible to `user`.
async fn build_slot(
    state: &AppState,
    user: &User,
    req: WorkoutExerciseRequest,
    default_index: u32,
) -> Result<WorkoutExercise> {
    let exercise_id = req.exercise_id;
    access::readable(state.db.find_exercise(exercise_id).await?, exercise_id, user)?;

    Ok(WorkoutExercise {
        id: Uuid::new_v4(),
        exercise_id,
        sets: req.sets,
        repetitions: req.repetitions,
        weight: req.weight,
        order_index: req.order_index.unwrap_or(default_index),
        notes: req.notes,
        created_at: Utc::now(),
    })
}

async fn load_own_plan(state: &AppState, user: &User, id: Uuid) -> Result<WorkoutPlan> {
    access::writable(state.db.find_workout_plan(id).await?, id, user)
}

// ─── Plans ───────────────────────────────────────────────────

async fn list_plans(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<WorkoutPlanResponse>>> {
    let plans = state.db.list_workout_plans(auth.user.id).await?;
    Ok(Json(plans.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize, Validate)]
struct CreatePlanRequest {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[validate(length(max = 1000))]
    description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    exercises: Vec<WorkoutExerciseRequest>,
}

async fn create_plan(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<WorkoutPlanResponse>)> {
    req.validate()?;

    let mut plan = WorkoutPlan::new(auth.user.id, req.name, req.description);
    for (index, slot) in req.exercises.into_iter().enumerate() {
        let slot = build_slot(&state, &auth.user, slot, index as u32).await?;
        plan.push_exercise(slot);
    }
    state.db.save_workout_plan(&plan).await?;

    tracing::debug!(plan_id = %plan.id, user_id = %auth.user.id, "Created workout plan");
    Ok((StatusCode::CREATED, Json(plan.into())))
}

async fn get_plan(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkoutPlanResponse>> {
    let plan = access::readable(state.db.find_workout_plan(id).await?, id, &auth.user)?;
    Ok(Json(plan.into()))
}

#[derive(Debug, Deserialize, Validate)]
struct UpdatePlanRequest {
    #[validate(length(min = 1, max = 100))]
    name: Option<String>,
    #[validate(length(max = 1000))]
    description: Option<String>,
}

async fn update_plan(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePlanRequest>,
) -> Result<Json<WorkoutPlanResponse>> {
    req.validate()?;

    let mut plan = load_own_plan(&state, &auth.user, id).await?;
    if let Some(name) = req.name {
        plan.name = name;
    }
    if let Some(description) = req.description {
        plan.description = Some(description);
    }
    plan.updated_at = Some(Utc::now());

    state.db.save_workout_plan(&plan).await?;
    Ok(Json(plan.into()))
}

/// Delete a plan together with its scheduled workouts.
async fn delete_plan(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    load_own_plan(&state, &auth.user, id).await?;

    if !state.db.delete_workout_plan(id).await? {
        return Err(AppError::NotFound(format!("workout plan {id}")));
    }

    tracing::debug!(plan_id = %id, user_id = %auth.user.id, "Deleted workout plan");
    Ok(StatusCode::NO_CONTENT)
}

// ─── Plan Entries ────────────────────────────────────────────

async fn add_exercise(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<WorkoutExerciseRequest>,
) -> Result<(StatusCode, Json<WorkoutPlanResponse>)> {
    req.validate()?;

    let mut plan = load_own_plan(&state, &auth.user, id).await?;
    let next_index = plan.exercises.len() as u32;
    let slot = build_slot(&state, &auth.user, req, next_index).await?;

    plan.push_exercise(slot);
    plan.updated_at = Some(Utc::now());
    state.db.save_workout_plan(&plan).await?;

    Ok((StatusCode::CREATED, Json(plan.into())))
}

async fn remove_exercise(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((id, workout_exercise_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    let mut plan = load_own_plan(&state, &auth.user, id).await?;

    if !plan.remove_exercise(workout_exercise_id) {
        return Err(AppError::NotFound(format!(
            "workout exercise {workout_exercise_id}"
        )));
    }
    plan.updated_at = Some(Utc::now());
    state.db.save_workout_plan(&plan).await?;

    Ok(StatusCode::NO_CONTENT)
}
