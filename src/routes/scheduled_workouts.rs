// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scheduled workout routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ScheduledWorkout, User, WorkoutStatus};
use crate::services::access;
use crate::time_utils::{format_optional_rfc3339, format_utc_rfc3339};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// Scheduled workout routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/v1/scheduled-workouts",
            get(list_scheduled).post(create_scheduled),
        )
        .route(
            "/api/v1/scheduled-workouts/{id}",
            get(get_scheduled)
                .put(update_scheduled)
                .delete(delete_scheduled),
        )
        .route(
            "/api/v1/scheduled-workouts/{id}/complete",
            post(complete_scheduled),
        )
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScheduledWorkoutResponse {
    pub id: Uuid,
    pub workout_plan_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
    pub status: WorkoutStatus,
    pub completed_at: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<ScheduledWorkout> for ScheduledWorkoutResponse {
    fn from(w: ScheduledWorkout) -> Self {
        Self {
            id: w.id,
            workout_plan_id: w.workout_plan_id,
            scheduled_date: w.scheduled_date,
            scheduled_time: w.scheduled_time,
            status: w.status,
            completed_at: format_optional_rfc3339(w.completed_at),
            notes: w.notes,
            created_at: format_utc_rfc3339(w.created_at),
            updated_at: format_optional_rfc3339(w.updated_at),
        }
    }
}

async fn load_own(state: &AppState, user: &User, id: Uuid) -> Result<ScheduledWorkout> {
    access::writable(state.db.find_scheduled_workout(id).await?, id, user)
}

/// The plan must exist and belong to `user`.
async fn check_plan(state: &AppState, user: &User, plan_id: Uuid) -> Result<()> {
    access::writable(state.db.find_workout_plan(plan_id).await?, plan_id, user)?;
    Ok(())
}

// ─── Listing ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ScheduledQuery {
    status: Option<WorkoutStatus>,
    /// Inclusive lower bound on `scheduled_date`
    from: Option<NaiveDate>,
    /// Inclusive upper bound on `scheduled_date`
    to: Option<NaiveDate>,
}

async fn list_scheduled(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ScheduledQuery>,
) -> Result<Json<Vec<ScheduledWorkoutResponse>>> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(AppError::BadRequest(
                "'from' must not be after 'to'".to_string(),
            ));
        }
    }

    let workouts = state.db.list_scheduled_workouts(auth.user.id).await?;
    let workouts = workouts
        .into_iter()
        .filter(|w| query.status.is_none_or(|s| s == w.status))
        .filter(|w| query.from.is_none_or(|from| w.scheduled_date >= from))
        .filter(|w| query.to.is_none_or(|to| w.scheduled_date <= to))
        .map(Into::into)
        .collect();

    Ok(Json(workouts))
}

// ─── Single Workout ──────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
struct CreateScheduledRequest {
    workout_plan_id: Uuid,
    scheduled_date: NaiveDate,
    scheduled_time: Option<NaiveTime>,
    #[validate(length(max = 1000))]
    notes: Option<String>,
}

async fn create_scheduled(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateScheduledRequest>,
) -> Result<(StatusCode, Json<ScheduledWorkoutResponse>)> {
    req.validate()?;
    check_plan(&state, &auth.user, req.workout_plan_id).await?;

    let workout = ScheduledWorkout {
        id: Uuid::new_v4(),
        user_id: auth.user.id,
        workout_plan_id: req.workout_plan_id,
        scheduled_date: req.scheduled_date,
        scheduled_time: req.scheduled_time,
        status: WorkoutStatus::Scheduled,
        completed_at: None,
        notes: req.notes,
        created_at: Utc::now(),
        updated_at: None,
    };
    state.db.save_scheduled_workout(&workout).await?;

    tracing::debug!(scheduled_id = %workout.id, user_id = %auth.user.id, "Scheduled workout");
    Ok((StatusCode::CREATED, Json(workout.into())))
}

async fn get_scheduled(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduledWorkoutResponse>> {
    let workout = access::readable(state.db.find_scheduled_workout(id).await?, id, &auth.user)?;
    Ok(Json(workout.into()))
}

#[derive(Debug, Deserialize, Validate)]
struct UpdateScheduledRequest {
    workout_plan_id: Option<Uuid>,
    scheduled_date: Option<NaiveDate>,
    scheduled_time: Option<NaiveTime>,
    status: Option<WorkoutStatus>,
    #[validate(length(max = 1000))]
    notes: Option<String>,
}

async fn update_scheduled(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateScheduledRequest>,
) -> Result<Json<ScheduledWorkoutResponse>> {
    req.validate()?;

    let mut workout = load_own(&state, &auth.user, id).await?;

    if let Some(plan_id) = req.workout_plan_id {
        check_plan(&state, &auth.user, plan_id).await?;
        workout.workout_plan_id = plan_id;
    }
    if let Some(date) = req.scheduled_date {
        workout.scheduled_date = date;
    }
    if let Some(time) = req.scheduled_time {
        workout.scheduled_time = Some(time);
    }
    if let Some(notes) = req.notes {
        workout.notes = Some(notes);
    }
    match req.status {
        Some(WorkoutStatus::Completed) if workout.status != WorkoutStatus::Completed => {
            workout.complete(None);
        }
        Some(status) if status != WorkoutStatus::Completed => {
            workout.status = status;
            workout.completed_at = None;
        }
        _ => {}
    }
    workout.updated_at = Some(Utc::now());

    state.db.save_scheduled_workout(&workout).await?;
    Ok(Json(workout.into()))
}

async fn delete_scheduled(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    load_own(&state, &auth.user, id).await?;

    if !state.db.delete_scheduled_workout(id).await? {
        return Err(AppError::NotFound(format!("scheduled workout {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize, Validate)]
struct CompleteRequest {
    #[validate(length(max = 1000))]
    notes: Option<String>,
}

/// Mark a scheduled workout as done.
async fn complete_scheduled(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<ScheduledWorkoutResponse>> {
    req.validate()?;

    let mut workout = load_own(&state, &auth.user, id).await?;
    if workout.status == WorkoutStatus::Cancelled {
        return Err(AppError::Conflict(
            "A cancelled workout cannot be completed".to_string(),
        ));
    }

    workout.complete(req.notes);
    state.db.save_scheduled_workout(&workout).await?;

    Ok(Json(workout.into()))
}
