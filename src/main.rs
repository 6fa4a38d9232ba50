// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout Tracker API Server
//!
//! Stores exercises, workout plans and scheduled sessions per user,
//! behind password or Google sign-in with bearer tokens.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workout_tracker::{
    config::Config,
    db::{FirestoreDb, MemoryDb, Store},
    services::GoogleIdTokenVerifier,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        algorithm = ?config.jwt_algorithm,
        bcrypt_cost = config.bcrypt_cost,
        "Starting Workout Tracker API"
    );

    // Firestore when a project is configured, otherwise in-process storage
    let db: Arc<dyn Store> = match &config.gcp_project_id {
        Some(project_id) => Arc::new(FirestoreDb::new(project_id).await?),
        None => {
            tracing::warn!("GCP_PROJECT_ID not set; using in-memory storage");
            Arc::new(MemoryDb::new())
        }
    };

    let google_verifier = match &config.google_client_id {
        Some(client_id) => Some(Arc::new(GoogleIdTokenVerifier::new(client_id)?)),
        None => {
            tracing::info!("GOOGLE_CLIENT_ID not set; Google sign-in disabled");
            None
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db, google_verifier));

    // Build router
    let app = workout_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("workout_tracker=debug,info"));

    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
