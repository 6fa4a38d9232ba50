// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login and token refresh routes.

use crate::error::Result;
use crate::routes::users::UserResponse;
use crate::services::{session, TokenPair};
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Form, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Auth routes (public).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/refresh", post(refresh))
        .route("/api/v1/auth/google", post(google_login))
}

#[derive(Debug, Deserialize, Validate)]
struct RegisterRequest {
    #[validate(email)]
    email: String,
    #[validate(length(min = 8, max = 128))]
    password: String,
    #[validate(length(min = 1, max = 100))]
    full_name: Option<String>,
}

/// Create an account with email and password.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    req.validate()?;

    let user = session::register(&state, req.email, req.password, req.full_name).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// OAuth2 password-grant style form body; `username` carries the email.
#[derive(Debug, Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenPair>> {
    let pair = session::login(&state, &form.username, form.password).await?;
    Ok(Json(pair))
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

/// Exchange a refresh token for a fresh pair.
async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenPair>> {
    let pair = session::refresh(&state, &req.refresh_token).await?;
    Ok(Json(pair))
}

#[derive(Debug, Deserialize)]
struct GoogleLoginRequest {
    /// Google ID token from the client-side sign-in flow
    token: String,
}

async fn google_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GoogleLoginRequest>,
) -> Result<Json<TokenPair>> {
    let pair = session::login_with_google(&state, &req.token).await?;
    Ok(Json(pair))
}
