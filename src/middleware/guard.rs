// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Navigation guard.
//!
//! Reads only the session's `is_authenticated` flag and the route's
//! `requires_auth` / `requires_guest` flags.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Per-route access flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteFlags {
    pub requires_auth: bool,
    pub requires_guest: bool,
}

impl RouteFlags {
    pub const AUTH: RouteFlags = RouteFlags {
        requires_auth: true,
        requires_guest: false,
    };
    pub const GUEST: RouteFlags = RouteFlags {
        requires_auth: false,
        requires_guest: true,
    };
}

/// Where navigation should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Proceed,
    RedirectToLogin,
    RedirectToDashboard,
}

impl GuardOutcome {
    pub fn redirect_path(self) -> Option<&'static str> {
        match self {
            GuardOutcome::Proceed => None,
            GuardOutcome::RedirectToLogin => Some(LOGIN_PATH),
            GuardOutcome::RedirectToDashboard => Some(DASHBOARD_PATH),
        }
    }
}

/// Decide a navigation.
pub fn evaluate(is_authenticated: bool, flags: RouteFlags) -> GuardOutcome {
    if flags.requires_auth && !is_authenticated {
        GuardOutcome::RedirectToLogin
    } else if flags.requires_guest && is_authenticated {
        GuardOutcome::RedirectToDashboard
    } else {
        GuardOutcome::Proceed
    }
}

async fn guard(state: &AppState, flags: RouteFlags, request: Request, next: Next) -> Response {
    match evaluate(state.session.is_authenticated(), flags) {
        GuardOutcome::Proceed => next.run(request).await,
        // API clients get a status rather than a page redirect.
        GuardOutcome::RedirectToLogin => AppError::Unauthorized.into_response(),
        GuardOutcome::RedirectToDashboard => Redirect::to(DASHBOARD_PATH).into_response(),
    }
}

/// Middleware for routes that need a logged-in session.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    guard(&state, RouteFlags::AUTH, request, next).await
}

/// Middleware for guest-only routes (login).
pub async fn require_guest(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    guard(&state, RouteFlags::GUEST, request, next).await
}
