// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication on protected routes, revocation and account lifecycle.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{
    create_exercise, create_plan, create_test_app, json_request, login, send, signup,
    TEST_PASSWORD,
};

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _) = create_test_app();

    let (status, headers, body) =
        send(&app, json_request(Method::GET, "/api/v1/exercises", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_protected_route_with_other_scheme() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/users/me")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let (app, _) = create_test_app();

    let (status, headers, body) = send(
        &app,
        json_request(Method::GET, "/api/v1/users/me", Some("invalid.token.here"), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_refresh_token_is_not_access() {
    let (app, _) = create_test_app();
    let (_, refresh) = signup(&app, "refresh-only@example.com").await;

    let (status, _, _) = send(
        &app,
        json_request(Method::GET, "/api/v1/users/me", Some(&refresh), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_routes_no_auth_required() {
    let (app, _) = create_test_app();

    let (status, headers, body) = send(&app, json_request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");

    let (status, _, body) = send(&app, json_request(Method::GET, "/", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("Workout Tracker"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/v1/exercises")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_update_profile() {
    let (app, _) = create_test_app();
    let (access, _) = signup(&app, "profile@example.com").await;

    let (status, _, body) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/v1/users/me",
            Some(&access),
            Some(json!({ "full_name": "Pat Example" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full_name"], "Pat Example");
    assert!(body["updated_at"].is_string());
}

#[tokio::test]
async fn test_email_change_invalidates_old_tokens() {
    let (app, _) = create_test_app();
    let (access, _) = signup(&app, "before@example.com").await;
    signup(&app, "taken@example.com").await;

    let (status, _, body) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/v1/users/me",
            Some(&access),
            Some(json!({ "email": "taken@example.com" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "duplicate_email");

    let (status, _, _) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/v1/users/me",
            Some(&access),
            Some(json!({ "email": "after@example.com" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(
        &app,
        json_request(Method::GET, "/api/v1/users/me", Some(&access), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "user_not_found");

    let (status, _, _) = login(&app, "after@example.com", TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_revoke_tokens() {
    let (app, _) = create_test_app();
    let (access, refresh) = signup(&app, "revoke@example.com").await;

    let (status, _, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/users/me/revoke-tokens",
            Some(&access),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(
        &app,
        json_request(Method::GET, "/api/v1/users/me", Some(&access), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A fresh login works again
    let (status, _, body) = login(&app, "revoke@example.com", TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    let fresh = body["access_token"].as_str().unwrap();
    let (status, _, _) = send(
        &app,
        json_request(Method::GET, "/api/v1/users/me", Some(fresh), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_account_cascades() {
    let (app, state) = create_test_app();
    let (access, refresh) = signup(&app, "leaving@example.com").await;
    let (other, _) = signup(&app, "staying@example.com").await;

    let exercise_id = create_exercise(&app, &access, "Lunge", true).await;
    let plan = create_plan(&app, &access, "Leg day", &[&exercise_id]).await;
    let plan_id = plan["id"].as_str().unwrap().to_string();

    let (status, _, scheduled) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/scheduled-workouts",
            Some(&access),
            Some(json!({ "workout_plan_id": plan_id, "scheduled_date": "2026-11-02" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let scheduled_id = scheduled["id"].as_str().unwrap().parse().unwrap();

    let (status, _, _) = send(
        &app,
        json_request(Method::DELETE, "/api/v1/users/me", Some(&access), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Tokens of a deleted account no longer resolve
    for (method, uri, body) in [
        (Method::GET, "/api/v1/users/me", None),
        (
            Method::POST,
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": refresh })),
        ),
    ] {
        let token = body.is_none().then_some(access.as_str());
        let (status, _, _) = send(&app, json_request(method, uri, token, body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    assert!(state
        .db
        .find_workout_plan(plan_id.parse().unwrap())
        .await
        .unwrap()
        .is_none());
    assert!(state
        .db
        .find_scheduled_workout(scheduled_id)
        .await
        .unwrap()
        .is_none());

    // The public exercise survives without an owner
    let (status, _, body) = send(
        &app,
        json_request(
            Method::GET,
            &format!("/api/v1/exercises/{exercise_id}"),
            Some(&other),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["created_by"].is_null());
}
