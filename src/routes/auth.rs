// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes: login, logout, refresh and session status.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::models::{Credentials, User};
use crate::services::SessionStore;
use crate::AppState;

/// Routes open to everyone.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
        .route("/auth/session", get(session))
}

/// Routes only reachable while logged out.
/// The guest guard is applied in routes/mod.rs.
pub fn guest_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/login", post(login))
}

/// Current session as seen by the frontend.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_individual: bool,
    pub is_professional: bool,
    pub is_educator: bool,
}

impl SessionResponse {
    fn from_store(store: &SessionStore) -> Self {
        Self {
            is_authenticated: store.is_authenticated(),
            user: store.user(),
            token: store.token(),
            is_individual: store.is_individual(),
            is_professional: store.is_professional(),
            is_educator: store.is_educator(),
        }
    }
}

/// Result of a refresh attempt.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RefreshResponse {
    pub refreshed: bool,
    pub token: Option<String>,
}

/// Log in with identifier + secret.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<SessionResponse>> {
    state.session.login(credentials).await?;
    Ok(Json(SessionResponse::from_store(&state.session)))
}

async fn logout(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    state.session.logout();
    Json(SessionResponse::from_store(&state.session))
}

/// Rotate the access token. A failed refresh leaves the client logged out.
async fn refresh(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    let refreshed = state.session.refresh_auth_token().await;
    Json(RefreshResponse {
        refreshed,
        token: state.session.token(),
    })
}

async fn session(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    Json(SessionResponse::from_store(&state.session))
}
