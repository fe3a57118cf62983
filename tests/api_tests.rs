// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end tests of the JSON API.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app};

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn login(app: &Router, identifier: &str, secret: &str) -> StatusCode {
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/auth/login",
            json!({ "identifier": identifier, "secret": secret }),
        ))
        .await
        .unwrap();
    response.status()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(empty_request(Method::GET, "/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let (app, _) = create_test_app();

    for uri in ["/api/me", "/api/metrics", "/api/activities", "/api/program-stats"] {
        let response = app
            .clone()
            .oneshot(empty_request(Method::GET, uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn test_login_with_legacy_field_names() {
    let (app, state) = create_test_app();

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/auth/login",
            json!({
                "email": "maria@example.com",
                "password": "password123",
                "rememberMe": true
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["isAuthenticated"], true);
    assert_eq!(body["isEducator"], true);
    assert_eq!(body["isProfessional"], false);
    assert_eq!(body["user"]["role"], "educator");
    assert!(body["token"].as_str().unwrap().starts_with("token_"));
    assert!(state.session.has_refresh_token());
}

#[tokio::test]
async fn test_bad_login_returns_401() {
    let (app, state) = create_test_app();

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/auth/login",
            json!({ "identifier": "admin", "secret": "nope" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "login_failed");
    assert!(!state.session.is_authenticated());
}

#[tokio::test]
async fn test_login_while_authenticated_redirects_to_dashboard() {
    let (app, _) = create_test_app();
    assert_eq!(login(&app, "admin", "admin").await, StatusCode::OK);

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/auth/login",
            json!({ "identifier": "user", "secret": "user" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/dashboard"
    );
}

#[tokio::test]
async fn test_session_logout_cycle() {
    let (app, _) = create_test_app();
    login(&app, "user", "user").await;

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/api/me"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["identifier"], "user");
    assert_eq!(me["profileComplete"], false);

    let response = app
        .clone()
        .oneshot(empty_request(Method::POST, "/auth/logout"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["isAuthenticated"], false);

    let response = app
        .oneshot(empty_request(Method::GET, "/api/me"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_endpoint() {
    let (app, state) = create_test_app();

    let response = app
        .clone()
        .oneshot(empty_request(Method::POST, "/auth/refresh"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["refreshed"], false);
    assert!(body["token"].is_null());

    login(&app, "admin", "admin").await;
    let before = state.session.token().unwrap();

    let response = app
        .oneshot(empty_request(Method::POST, "/auth/refresh"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["refreshed"], true);
    assert_ne!(body["token"].as_str().unwrap(), before);
}

#[tokio::test]
async fn test_permissions_endpoint() {
    let (app, _) = create_test_app();
    login(&app, "admin", "admin").await;

    let cases = [
        ("individual", true),
        ("professional", true),
        ("educator", false),
    ];
    for (role, granted) in cases {
        let response = app
            .clone()
            .oneshot(empty_request(
                Method::GET,
                &format!("/api/permissions/{}", role),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["role"], role);
        assert_eq!(body["granted"], granted, "{}", role);
    }

    let response = app
        .oneshot(empty_request(Method::GET, "/api/permissions/superuser"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_update() {
    let (app, _) = create_test_app();
    login(&app, "user", "user").await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            "/api/me",
            json!({ "name": "Jordan", "profileComplete": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Jordan");
    assert_eq!(body["profileComplete"], true);
    assert_eq!(body["role"], "individual");

    let response = app
        .oneshot(json_request(Method::PATCH, "/api/me", json!({ "name": "" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metric_updates() {
    let (app, _) = create_test_app();
    login(&app, "admin", "admin").await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/metrics/calories",
            json!({ "amount": 500 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["totalCaloriesConsumed"], 2150.0);
    assert_eq!(body["caloriesRemaining"], 0.0);
    assert_eq!(body["healthScore"], 84);
    assert_eq!(body["chartData"]["macros"]["carbs"], 251);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/metrics/water",
            json!({ "amount": -1.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/metrics/calories",
            json!({ "amount": 1e300 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/metrics/calories",
            json!({ "amount": -300 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["totalCaloriesConsumed"], 1850.0);

    let response = app
        .clone()
        .oneshot(empty_request(Method::POST, "/api/metrics/reset"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["healthScore"], 0);
    assert_eq!(body["waterProgress"], 0);
    assert_eq!(body["dailyData"]["calories"]["target"], 2000.0);
}

#[tokio::test]
async fn test_weekly_update_index_bounds() {
    let (app, _) = create_test_app();
    login(&app, "admin", "admin").await;

    for (day, applied) in [("2", true), ("7", false), ("-1", false)] {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::PUT,
                &format!("/api/metrics/weekly/{}", day),
                json!({ "calories": 2222 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", day);
        let body = body_json(response).await;
        assert_eq!(body["applied"], applied, "{}", day);
    }

    let response = app
        .oneshot(empty_request(Method::GET, "/api/metrics"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(
        body["chartData"]["weekly"],
        json!([1800.0, 2100.0, 2222.0, 2200.0, 1700.0, 2050.0, 1650.0])
    );
}

#[tokio::test]
async fn test_activities_endpoint() {
    let (app, _) = create_test_app();
    login(&app, "user", "user").await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/activities",
            json!({ "id": "new", "title": "Yoga", "icon": "🧘", "time": "now" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["id"], "new");
    assert_eq!(body.as_array().unwrap().len(), 5);

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/activities",
            json!({ "id": "", "title": "Yoga", "icon": "", "time": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_responses_are_not_cached() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(empty_request(Method::GET, "/auth/session"))
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(empty_request(Method::GET, "/api/nope"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["details"], "/api/nope");
}
