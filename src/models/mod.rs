// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity;
pub mod metrics;
pub mod session;
pub mod user;

pub use activity::{Activity, ActivityLog};
pub use metrics::{
    ChartData, Counter, DailyMetrics, MacroTotals, MetricsRecord, ProgramStats, StoredMetrics,
    WeeklySeries,
};
pub use session::SessionRecord;
pub use user::{Credentials, ProfileUpdate, User, UserRole};
