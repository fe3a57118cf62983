// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::Response;
use flourish_hub::config::Config;
use flourish_hub::db::Storage;
use flourish_hub::models::Credentials;
use flourish_hub::routes::create_router;
use flourish_hub::AppState;
use std::sync::Arc;

/// Create in-memory storage for both tiers.
#[allow(dead_code)]
pub fn test_storage() -> Arc<Storage> {
    Arc::new(Storage::in_memory())
}

/// Create a test app over in-memory storage with no simulated latency.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::with_storage(
        Config::test_default(),
        test_storage(),
    ));
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn creds(identifier: &str, secret: &str, remember: bool) -> Credentials {
    Credentials {
        identifier: identifier.to_string(),
        secret: secret.to_string(),
        remember,
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}
