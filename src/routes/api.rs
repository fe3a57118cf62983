// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::models::{Activity, ProfileUpdate, ProgramStats, User, UserRole, WeeklySeries};
use crate::services::MetricsSummary;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require an authenticated session).
/// The auth guard is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).patch(update_me))
        .route("/api/permissions/{role}", get(get_permission))
        .route("/api/metrics", get(get_metrics))
        .route("/api/metrics/calories", post(add_calories))
        .route("/api/metrics/water", post(add_water))
        .route("/api/metrics/exercise", post(add_exercise))
        .route("/api/metrics/sleep", post(set_sleep))
        .route("/api/metrics/reset", post(reset_metrics))
        .route("/api/metrics/weekly/{day}", put(update_weekly))
        .route("/api/activities", get(get_activities).post(add_activity))
        .route("/api/program-stats", get(get_program_stats))
}

// ─── User Profile ────────────────────────────────────────────

async fn get_me(State(state): State<Arc<AppState>>) -> Result<Json<User>> {
    state.session.user().map(Json).ok_or(AppError::Unauthorized)
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>> {
    update.validate()?;
    state
        .session
        .update_profile(update)?
        .map(Json)
        .ok_or(AppError::Unauthorized)
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PermissionResponse {
    pub role: UserRole,
    pub granted: bool,
}

async fn get_permission(
    State(state): State<Arc<AppState>>,
    Path(role): Path<String>,
) -> Result<Json<PermissionResponse>> {
    let role: UserRole = role
        .parse()
        .map_err(|e: crate::models::user::UnknownRole| AppError::BadRequest(e.to_string()))?;

    Ok(Json(PermissionResponse {
        role,
        granted: state.session.has_permission(role),
    }))
}

// ─── Metrics ─────────────────────────────────────────────────

async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSummary> {
    Json(state.metrics.summary())
}

/// Calorie delta. Negative values correct earlier entries.
#[derive(Debug, Deserialize, Validate)]
struct CaloriesRequest {
    /// kcal
    #[validate(range(min = -20000.0, max = 20000.0))]
    amount: f64,
}

#[derive(Debug, Deserialize, Validate)]
struct WaterRequest {
    /// litres
    #[validate(range(min = 0.0, max = 20.0))]
    amount: f64,
}

#[derive(Debug, Deserialize, Validate)]
struct ExerciseRequest {
    #[validate(range(min = 0.0, max = 1440.0))]
    minutes: f64,
}

#[derive(Debug, Deserialize, Validate)]
struct SleepRequest {
    #[validate(range(min = 0.0, max = 24.0))]
    hours: f64,
}

async fn add_calories(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CaloriesRequest>,
) -> Result<Json<MetricsSummary>> {
    req.validate()?;
    state.metrics.update_calories(req.amount)?;
    Ok(Json(state.metrics.summary()))
}

async fn add_water(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WaterRequest>,
) -> Result<Json<MetricsSummary>> {
    req.validate()?;
    state.metrics.update_water(req.amount)?;
    Ok(Json(state.metrics.summary()))
}

async fn add_exercise(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExerciseRequest>,
) -> Result<Json<MetricsSummary>> {
    req.validate()?;
    state.metrics.update_exercise(req.minutes)?;
    Ok(Json(state.metrics.summary()))
}

async fn set_sleep(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SleepRequest>,
) -> Result<Json<MetricsSummary>> {
    req.validate()?;
    state.metrics.update_sleep(req.hours)?;
    Ok(Json(state.metrics.summary()))
}

async fn reset_metrics(State(state): State<Arc<AppState>>) -> Result<Json<MetricsSummary>> {
    state.metrics.reset_daily_data()?;
    Ok(Json(state.metrics.summary()))
}

#[derive(Debug, Deserialize)]
struct WeeklyRequest {
    calories: f64,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeeklyResponse {
    /// False when the day index was out of range and nothing changed.
    pub applied: bool,
    pub weekly: WeeklySeries,
}

/// Set one day of the weekly series. Indices outside 0–6 are ignored.
async fn update_weekly(
    State(state): State<Arc<AppState>>,
    Path(day): Path<i64>,
    Json(req): Json<WeeklyRequest>,
) -> Result<Json<WeeklyResponse>> {
    let applied = match usize::try_from(day) {
        Ok(index) => state.metrics.update_weekly_data(index, req.calories)?,
        Err(_) => false,
    };

    Ok(Json(WeeklyResponse {
        applied,
        weekly: state.metrics.chart_data().weekly,
    }))
}

// ─── Activities ──────────────────────────────────────────────

async fn get_activities(State(state): State<Arc<AppState>>) -> Json<Vec<Activity>> {
    Json(state.metrics.recent_activities())
}

async fn add_activity(
    State(state): State<Arc<AppState>>,
    Json(activity): Json<Activity>,
) -> Result<Json<Vec<Activity>>> {
    activity.validate()?;
    state.metrics.add_activity(activity)?;
    Ok(Json(state.metrics.recent_activities()))
}

async fn get_program_stats(State(state): State<Arc<AppState>>) -> Json<ProgramStats> {
    Json(state.metrics.program_stats())
}
