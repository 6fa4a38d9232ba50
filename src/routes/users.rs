// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Self-service account routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{User, UserChanges};
use crate::services::session;
use crate::time_utils::{format_optional_rfc3339, format_utc_rfc3339};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// User routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/v1/users/me",
            get(get_me).put(update_me).delete(delete_me),
        )
        .route("/api/v1/users/me/revoke-tokens", post(revoke_tokens))
}

/// Public view of an account. Never includes the password hash.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub oauth_provider: Option<String>,
    pub has_password: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            has_password: user.password_hash.is_some(),
            email: user.email,
            full_name: user.full_name,
            oauth_provider: user.oauth_provider,
            created_at: format_utc_rfc3339(user.created_at),
            updated_at: format_optional_rfc3339(user.updated_at),
        }
    }
}

async fn get_me(Extension(auth): Extension<AuthUser>) -> Json<UserResponse> {
    Json(auth.user.into())
}

#[derive(Debug, Deserialize, Validate)]
struct UpdateMeRequest {
    #[validate(email)]
    email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    full_name: Option<String>,
}

/// Update the current user's profile.
///
/// Tokens name the user by email, so changing the email invalidates
/// every token issued before the change.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<UpdateMeRequest>,
) -> Result<Json<UserResponse>> {
    req.validate()?;

    let changes = UserChanges {
        email: req.email,
        full_name: req.full_name,
        ..Default::default()
    };

    let user = state
        .db
        .update_user(auth.user.id, changes)
        .await?
        .ok_or(AppError::UserNotFound)?;

    tracing::info!(user_id = %user.id, "Updated profile");
    Ok(Json(user.into()))
}

/// Delete the account with its workout plans and scheduled workouts.
async fn delete_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<StatusCode> {
    tracing::info!(user_id = %auth.user.id, "User-initiated account deletion");

    if !state.db.delete_user(auth.user.id).await? {
        tracing::warn!(user_id = %auth.user.id, "User vanished during deletion request");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Reject every token issued so far ("log out everywhere").
async fn revoke_tokens(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<StatusCode> {
    session::revoke_tokens(&state, &auth.user).await?;
    Ok(StatusCode::NO_CONTENT)
}
