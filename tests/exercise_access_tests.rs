// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise visibility, ownership and listing tests.

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{create_exercise, create_plan, create_test_app, json_request, send, signup};

#[tokio::test]
async fn test_private_exercise_hidden_from_others() {
    let (app, _) = create_test_app();
    let (alice, _) = signup(&app, "alice@example.com").await;
    let (bob, _) = signup(&app, "bob@example.com").await;

    let private_id = create_exercise(&app, &alice, "Secret squat", false).await;
    let uri = format!("/api/v1/exercises/{private_id}");

    let (status, _, _) = send(&app, json_request(Method::GET, &uri, Some(&alice), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(&app, json_request(Method::GET, &uri, Some(&bob), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn test_public_exercise_read_only_for_others() {
    let (app, _) = create_test_app();
    let (alice, _) = signup(&app, "alice@example.com").await;
    let (bob, _) = signup(&app, "bob@example.com").await;

    let public_id = create_exercise(&app, &alice, "Open squat", true).await;
    let uri = format!("/api/v1/exercises/{public_id}");

    let (status, _, _) = send(&app, json_request(Method::GET, &uri, Some(&bob), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(
        &app,
        json_request(Method::PUT, &uri, Some(&bob), Some(json!({ "name": "Mine now" }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(&app, json_request(Method::DELETE, &uri, Some(&bob), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = send(
        &app,
        json_request(
            Method::PUT,
            &uri,
            Some(&alice),
            Some(json!({ "name": "Front squat", "is_public": false })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Front squat");
    assert_eq!(body["is_public"], false);
}

#[tokio::test]
async fn test_missing_exercise_is_not_found() {
    let (app, _) = create_test_app();
    let (alice, _) = signup(&app, "alice@example.com").await;

    let uri = format!("/api/v1/exercises/{}", uuid::Uuid::new_v4());
    let (status, _, _) = send(&app, json_request(Method::GET, &uri, Some(&alice), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_referenced_exercise_cannot_be_deleted() {
    let (app, _) = create_test_app();
    let (alice, _) = signup(&app, "alice@example.com").await;

    let exercise_id = create_exercise(&app, &alice, "Deadlift", false).await;
    let plan = create_plan(&app, &alice, "Pull day", &[&exercise_id]).await;
    let uri = format!("/api/v1/exercises/{exercise_id}");

    let (status, _, body) =
        send(&app, json_request(Method::DELETE, &uri, Some(&alice), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    // Free it up and try again
    let plan_uri = format!("/api/v1/workout-plans/{}", plan["id"].as_str().unwrap());
    let (status, _, _) =
        send(&app, json_request(Method::DELETE, &plan_uri, Some(&alice), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(&app, json_request(Method::DELETE, &uri, Some(&alice), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(&app, json_request(Method::GET, &uri, Some(&alice), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_shows_own_and_public() {
    let (app, _) = create_test_app();
    let (alice, _) = signup(&app, "alice@example.com").await;
    let (bob, _) = signup(&app, "bob@example.com").await;

    create_exercise(&app, &alice, "Alice private", false).await;
    create_exercise(&app, &alice, "Alice public", true).await;
    create_exercise(&app, &bob, "Bob private", false).await;

    let (status, _, body) = send(
        &app,
        json_request(Method::GET, "/api/v1/exercises?sort_by=name&sort_order=asc", Some(&bob), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    let names: Vec<&str> = body["exercises"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice public", "Bob private"]);

    let (_, _, body) = send(
        &app,
        json_request(Method::GET, "/api/v1/exercises?only_mine=true", Some(&bob), None),
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["exercises"][0]["name"], "Bob private");
}

#[tokio::test]
async fn test_list_filters_and_paging() {
    let (app, _) = create_test_app();
    let (alice, _) = signup(&app, "alice@example.com").await;

    for name in ["Back squat", "Goblet squat", "Bench press"] {
        create_exercise(&app, &alice, name, false).await;
    }

    let (_, _, body) = send(
        &app,
        json_request(Method::GET, "/api/v1/exercises?search=SQUAT", Some(&alice), None),
    )
    .await;
    assert_eq!(body["total"], 2);

    let (_, _, body) = send(
        &app,
        json_request(
            Method::GET,
            "/api/v1/exercises?sort_by=name&sort_order=asc&skip=1&limit=1",
            Some(&alice),
            None,
        ),
    )
    .await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["skip"], 1);
    assert_eq!(body["limit"], 1);
    assert_eq!(body["exercises"].as_array().unwrap().len(), 1);
    assert_eq!(body["exercises"][0]["name"], "Bench press");

    let (_, _, body) = send(
        &app,
        json_request(Method::GET, "/api/v1/exercises?category=cardio", Some(&alice), None),
    )
    .await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_list_rejects_bad_paging() {
    let (app, _) = create_test_app();
    let (alice, _) = signup(&app, "alice@example.com").await;

    for query in ["limit=0", "limit=101", "skip=-1", "search="] {
        let (status, _, _) = send(
            &app,
            json_request(
                Method::GET,
                &format!("/api/v1/exercises?{query}"),
                Some(&alice),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {query}");
    }
}

#[tokio::test]
async fn test_create_validation() {
    let (app, _) = create_test_app();
    let (alice, _) = signup(&app, "alice@example.com").await;

    let (status, _, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/exercises",
            Some(&alice),
            Some(json!({ "name": "", "category": "strength", "muscle_group": "legs" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
