// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise catalogue routes.
//!
//! Users see their own exercises plus every public one. Only the owner
//! may change or delete an exercise.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::exercise::{ExerciseSortField, SortOrder};
use crate::models::{Exercise, ExerciseCategory, ExerciseFilter, MuscleGroup};
use crate::services::access;
use crate::time_utils::{format_optional_rfc3339, format_utc_rfc3339};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

const DEFAULT_LIMIT: i64 = 100;

/// Exercise routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/exercises", get(list_exercises).post(create_exercise))
        .route(
            "/api/v1/exercises/{id}",
            get(get_exercise).put(update_exercise).delete(delete_exercise),
        )
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ExerciseResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: ExerciseCategory,
    pub muscle_group: MuscleGroup,
    pub created_by: Option<Uuid>,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<Exercise> for ExerciseResponse {
    fn from(e: Exercise) -> Self {
        Self {
            id: e.id,
            name: e.name,
            description: e.description,
            category: e.category,
            muscle_group: e.muscle_group,
            created_by: e.created_by,
            is_public: e.is_public,
            created_at: format_utc_rfc3339(e.created_at),
            updated_at: format_optional_rfc3339(e.updated_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ExerciseListResponse {
    pub exercises: Vec<ExerciseResponse>,
    /// Matches before paging
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
}

// ─── Listing ─────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
struct ExercisesQuery {
    #[validate(range(min = 0))]
    skip: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    limit: Option<i64>,
    only_mine: Option<bool>,
    category: Option<ExerciseCategory>,
    muscle_group: Option<MuscleGroup>,
    is_public: Option<bool>,
    #[validate(length(min = 1))]
    search: Option<String>,
    sort_by: Option<ExerciseSortField>,
    sort_order: Option<SortOrder>,
}

async fn list_exercises(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ExercisesQuery>,
) -> Result<Json<ExerciseListResponse>> {
    query.validate()?;

    // Both are range-checked non-negative above
    let skip = query.skip.unwrap_or(0) as usize;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT) as usize;

    let filter = ExerciseFilter {
        viewer: auth.user.id,
        only_mine: query.only_mine.unwrap_or(false),
        category: query.category,
        muscle_group: query.muscle_group,
        is_public: query.is_public,
        search: query.search,
        sort_by: query.sort_by.unwrap_or_default(),
        sort_order: query.sort_order.unwrap_or_default(),
        skip,
        limit,
    };

    let visible = state.db.list_visible_exercises(auth.user.id).await?;
    let (page, total) = filter.apply(visible);

    Ok(Json(ExerciseListResponse {
        exercises: page.into_iter().map(Into::into).collect(),
        total,
        skip,
        limit,
    }))
}

// ─── Single Exercise ─────────────────────────────────────────

async fn get_exercise(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExerciseResponse>> {
    let exercise = access::readable(state.db.find_exercise(id).await?, id, &auth.user)?;
    Ok(Json(exercise.into()))
}

#[derive(Debug, Deserialize, Validate)]
struct CreateExerciseRequest {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[validate(length(max = 1000))]
    description: Option<String>,
    category: ExerciseCategory,
    muscle_group: MuscleGroup,
    #[serde(default)]
    is_public: bool,
}

async fn create_exercise(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateExerciseRequest>,
) -> Result<(StatusCode, Json<ExerciseResponse>)> {
    req.validate()?;

    let exercise = Exercise {
        id: Uuid::new_v4(),
        name: req.name,
        description: req.description,
        category: req.category,
        muscle_group: req.muscle_group,
        created_by: Some(auth.user.id),
        is_public: req.is_public,
        created_at: Utc::now(),
        updated_at: None,
    };
    state.db.save_exercise(&exercise).await?;

    tracing::debug!(exercise_id = %exercise.id, user_id = %auth.user.id, "Created exercise");
    Ok((StatusCode::CREATED, Json(exercise.into())))
}

#[derive(Debug, Deserialize, Validate)]
struct UpdateExerciseRequest {
    #[validate(length(min = 1, max = 100))]
    name: Option<String>,
    #[validate(length(max = 1000))]
    description: Option<String>,
    category: Option<ExerciseCategory>,
    muscle_group: Option<MuscleGroup>,
    is_public: Option<bool>,
}

async fn update_exercise(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateExerciseRequest>,
) -> Result<Json<ExerciseResponse>> {
    req.validate()?;

    let mut exercise = access::writable(state.db.find_exercise(id).await?, id, &auth.user)?;

    if let Some(name) = req.name {
        exercise.name = name;
    }
    if let Some(description) = req.description {
        exercise.description = Some(description);
    }
    if let Some(category) = req.category {
        exercise.category = category;
    }
    if let Some(muscle_group) = req.muscle_group {
        exercise.muscle_group = muscle_group;
    }
    if let Some(is_public) = req.is_public {
        exercise.is_public = is_public;
    }
    exercise.updated_at = Some(Utc::now());

    state.db.save_exercise(&exercise).await?;
    Ok(Json(exercise.into()))
}

/// Delete an exercise. Fails with 409 while any workout plan uses it.
async fn delete_exercise(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    access::writable(state.db.find_exercise(id).await?, id, &auth.user)?;

    if !state.db.delete_exercise(id).await? {
        return Err(AppError::NotFound(format!("exercise {id}")));
    }

    tracing::debug!(exercise_id = %id, user_id = %auth.user.id, "Deleted exercise");
    Ok(StatusCode::NO_CONTENT)
}
