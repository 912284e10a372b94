//! HTTP tests for the section endpoints that resolve before any database
//! access: authentication, payload validation and path parsing.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, send, token_for, token_with, TEST_SECRET};
use serde_json::json;

fn bubble(id: &str, start: &str) -> serde_json::Value {
    json!({
        "id": id,
        "layer": "1",
        "bubbleName": "Bubble",
        "startTime": start,
        "stopTime": "00:06:784",
        "color": "#98DDCA",
    })
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_rejected() {
    let app = common::build_offline_app();
    let response = send(app, Method::GET, "/api/v1/sections", None, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Missing Authorization header");
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() {
    let app = common::build_offline_app();
    let request = axum::http::Request::builder()
        .uri("/api/v1/sections")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = common::build_offline_app();
    let token = token_with(1, -300, TEST_SECRET);
    let response = send(app, Method::GET, "/api/v1/sections/1", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired token");
}

#[tokio::test]
async fn token_from_another_issuer_is_rejected() {
    let app = common::build_offline_app();
    let token = token_with(1, 900, "a-different-secret");
    let response = send(app, Method::DELETE, "/api/v1/sections/1", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Payload validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_with_duplicate_ids_reports_batch_error() {
    let app = common::build_offline_app();
    let body = json!({
        "bubbles": [bubble("b1", "00:05:445"), bubble("b1", "00:07:000")],
    });
    let response = send(app, Method::POST, "/api/v1/sections", Some(&token_for(1)), Some(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["fields"]["bubbles"]["non_field_errors"][0]["kind"],
        "DUPLICATE_ID"
    );
    assert!(json["fields"].get("comments").is_none());
}

#[tokio::test]
async fn update_reports_every_invalid_field() {
    let app = common::build_offline_app();
    let body = json!({
        "bubbles": [bubble("b1", "5.445")],
        "comments": [
            {"id": "c1", "startTime": 1.0, "endTime": "soon", "text": "hi"},
            {"startTime": 1.0, "endTime": 2.0, "text": "no id"},
        ],
    });
    let response = send(app, Method::PUT, "/api/v1/sections/9", Some(&token_for(1)), Some(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let fields = &body_json(response).await["fields"];
    assert_eq!(fields["bubbles"]["items"]["0"]["startTime"][0]["kind"], "FORMAT");
    assert_eq!(fields["comments"]["items"]["0"]["endTime"][0]["kind"], "FORMAT");
    assert_eq!(fields["comments"]["items"]["1"]["id"][0]["kind"], "MISSING_FIELD");
}

#[tokio::test]
async fn unknown_reconcile_mode_is_rejected() {
    let app = common::build_offline_app();
    let response = send(
        app,
        Method::PUT,
        "/api/v1/sections/9?mode=merge",
        Some(&token_for(1)),
        Some(json!({"bubbles": []})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().contains("merge"));
}

#[tokio::test]
async fn malformed_json_body_uses_error_envelope() {
    let app = common::build_offline_app();
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/v1/sections")
        .header("authorization", format!("Bearer {}", token_for(1)))
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"bubbles\": ["))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn wrongly_typed_collection_uses_error_envelope() {
    let app = common::build_offline_app();
    let response = send(
        app,
        Method::POST,
        "/api/v1/sections",
        Some(&token_for(1)),
        Some(json!({"bubbles": 5})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn unknown_collection_is_rejected() {
    let app = common::build_offline_app();
    let response = send(
        app,
        Method::GET,
        "/api/v1/sections/9/markers",
        Some(&token_for(1)),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Unknown annotation collection"));
}

#[tokio::test]
async fn non_numeric_section_id_is_rejected() {
    let app = common::build_offline_app();
    let response = send(
        app,
        Method::GET,
        "/api/v1/sections/abc",
        Some(&token_for(1)),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}
