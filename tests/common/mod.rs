// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use workout_tracker::config::Config;
use workout_tracker::db::{FirestoreDb, MemoryDb};
use workout_tracker::routes::create_router;
use workout_tracker::services::GoogleIdTokenVerifier;
use workout_tracker::AppState;

#[allow(dead_code)]
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with(Config::test_default(), None)
}

#[allow(dead_code)]
pub fn create_test_app_with(
    config: Config,
    google_verifier: Option<GoogleIdTokenVerifier>,
) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        config,
        Arc::new(MemoryDb::new()),
        google_verifier.map(Arc::new),
    ));
    (create_router(state.clone()), state)
}

/// Build a JSON request, optionally authenticated.
#[allow(dead_code)]
pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and decode the JSON body (`Value::Null` if empty).
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, body)
}

#[allow(dead_code)]
pub async fn register(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    let body = serde_json::json!({ "email": email, "password": password });
    let (status, _, body) = send(
        app,
        json_request(Method::POST, "/api/v1/auth/register", None, Some(body)),
    )
    .await;
    (status, body)
}

/// Log in with the form body the login endpoint expects.
#[allow(dead_code)]
pub async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, HeaderMap, Value) {
    let form = format!(
        "username={}&password={}",
        form_encode(email),
        form_encode(password)
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    send(app, request).await
}

#[allow(dead_code)]
fn form_encode(value: &str) -> String {
    value.replace('%', "%25").replace('@', "%40").replace('+', "%2B")
}

/// Register a user and return its access and refresh tokens.
#[allow(dead_code)]
pub async fn signup(app: &Router, email: &str) -> (String, String) {
    let (status, _) = register(app, email, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = login(app, email, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    (
        body["access_token"].as_str().unwrap().to_string(),
        body["refresh_token"].as_str().unwrap().to_string(),
    )
}

/// Create an exercise and return its ID.
#[allow(dead_code)]
pub async fn create_exercise(app: &Router, token: &str, name: &str, is_public: bool) -> String {
    let body = serde_json::json!({
        "name": name,
        "category": "strength",
        "muscle_group": "legs",
        "is_public": is_public,
    });
    let (status, _, body) = send(
        app,
        json_request(Method::POST, "/api/v1/exercises", Some(token), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create exercise: {body}");
    body["id"].as_str().unwrap().to_string()
}

/// Create a workout plan using `exercise_ids` and return the plan body.
#[allow(dead_code)]
pub async fn create_plan(app: &Router, token: &str, name: &str, exercise_ids: &[&str]) -> Value {
    let exercises: Vec<Value> = exercise_ids
        .iter()
        .map(|id| serde_json::json!({ "exercise_id": id, "sets": 3, "repetitions": 10 }))
        .collect();
    let body = serde_json::json!({ "name": name, "exercises": exercises });
    let (status, _, body) = send(
        app,
        json_request(Method::POST, "/api/v1/workout-plans", Some(token), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create plan: {body}");
    body
}
