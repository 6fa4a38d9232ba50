// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout Tracker: exercises, workout plans and scheduled sessions
//!
//! This crate provides the backend API: account management with signed
//! access/refresh tokens, and per-user workout data guarded by ownership
//! checks.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Store;
use services::{GoogleIdTokenVerifier, PasswordHasher, TokenService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Store>,
    pub tokens: TokenService,
    pub passwords: PasswordHasher,
    /// `None` when `GOOGLE_CLIENT_ID` is unset
    pub google_verifier: Option<Arc<GoogleIdTokenVerifier>>,
}

impl AppState {
    /// Build the services that derive from `config` around a store.
    pub fn new(
        config: Config,
        db: Arc<dyn Store>,
        google_verifier: Option<Arc<GoogleIdTokenVerifier>>,
    ) -> Self {
        Self {
            tokens: TokenService::new(&config),
            passwords: PasswordHasher::new(config.bcrypt_cost),
            db,
            google_verifier,
            config,
        }
    }
}
