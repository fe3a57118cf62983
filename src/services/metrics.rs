// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Metric store: daily counters, macro totals, weekly series and the
//! recent-activity feed.
//!
//! Every mutator writes the full state through to durable storage before
//! returning. Derived values are recomputed on each read.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::{Storage, StorageError};
use crate::error::Result;
use crate::models::{
    Activity, ActivityLog, ChartData, DailyMetrics, MacroTotals, MetricsRecord, ProgramStats,
};
use crate::time_utils::now_rfc3339;

#[derive(Debug, Clone, Default)]
struct MetricState {
    daily: DailyMetrics,
    chart: ChartData,
    activities: ActivityLog,
    program_stats: ProgramStats,
}

impl MetricState {
    fn record(&self) -> MetricsRecord {
        MetricsRecord {
            daily_data: self.daily.clone(),
            chart_data: self.chart.clone(),
            recent_activities: self.activities.to_vec(),
            last_updated: now_rfc3339(),
        }
    }
}

/// Dashboard view of the metrics plus every derived indicator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MetricsSummary {
    pub daily_data: DailyMetrics,
    pub chart_data: ChartData,
    pub total_calories_consumed: f64,
    pub calories_remaining: f64,
    pub water_progress: i64,
    pub health_score: u32,
}

/// Owns the nutrition and activity metrics.
pub struct MetricStore {
    storage: Arc<Storage>,
    state: Mutex<MetricState>,
}

impl MetricStore {
    /// Create a store holding the built-in defaults. Call
    /// [`load_user_data`](Self::load_user_data) to merge persisted data.
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            state: Mutex::new(MetricState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MetricState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &MetricState) -> std::result::Result<(), StorageError> {
        self.storage.write_metrics(&state.record())
    }

    /// Apply `op` under the lock, then write through.
    fn mutate<F>(&self, op: &'static str, f: F) -> Result<()>
    where
        F: FnOnce(&mut MetricState),
    {
        let mut state = self.state();
        f(&mut state);
        self.persist(&state)?;
        tracing::debug!(op, "Metrics updated");
        Ok(())
    }

    // ─── Persistence ─────────────────────────────────────────────

    /// Merge persisted metrics over the current values.
    ///
    /// Missing fields keep their current values. Unreadable data is logged
    /// and ignored.
    pub fn load_user_data(&self) {
        let mut stored = match self.storage.read_metrics() {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                tracing::debug!("No stored metrics, using defaults");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load nutrition data, using defaults");
                return;
            }
        };

        let mut state = self.state();
        let MetricState {
            daily,
            chart,
            activities,
            ..
        } = &mut *state;

        if let Some(entries) = stored.recent_activities.take() {
            *activities = ActivityLog::from_newest_first(entries);
        }
        tracing::info!(last_updated = ?stored.last_updated, "Loaded stored metrics");
        stored.merge_into(daily, chart);
    }

    /// Write the full current state to durable storage.
    pub fn save_user_data(&self) -> Result<()> {
        let state = self.state();
        self.persist(&state)?;
        Ok(())
    }

    // ─── Mutators ────────────────────────────────────────────────

    /// Add `amount` kcal (negative corrects an entry) and fold it into
    /// the macro totals.
    pub fn update_calories(&self, amount: f64) -> Result<()> {
        self.mutate("update_calories", |s| {
            let macros = s.chart.macros.with_calories(amount);
            s.daily.calories.current += amount;
            s.chart.macros = macros;
        })
    }

    /// Add litres of water, keeping one decimal place.
    pub fn update_water(&self, amount: f64) -> Result<()> {
        self.mutate("update_water", |s| s.daily.add_water(amount))
    }

    pub fn update_exercise(&self, minutes: f64) -> Result<()> {
        self.mutate("update_exercise", |s| s.daily.exercise.current += minutes)
    }

    /// Set (not add) last night's sleep.
    pub fn update_sleep(&self, hours: f64) -> Result<()> {
        self.mutate("update_sleep", |s| s.daily.sleep.current = hours)
    }

    /// Zero all counters and macro totals. Targets and the weekly series
    /// are kept.
    pub fn reset_daily_data(&self) -> Result<()> {
        self.mutate("reset_daily_data", |s| {
            s.daily.reset();
            s.chart.macros = MacroTotals::ZERO;
        })
    }

    /// Record a day's calorie total.
    ///
    /// Returns `Ok(false)` without writing when `day_index` is outside 0–6.
    pub fn update_weekly_data(&self, day_index: usize, calories: f64) -> Result<bool> {
        let mut state = self.state();
        if !state.chart.weekly.set(day_index, calories) {
            tracing::debug!(day_index, "Ignoring out-of-range weekly index");
            return Ok(false);
        }
        self.persist(&state)?;
        tracing::debug!(day_index, "Weekly data updated");
        Ok(true)
    }

    pub fn add_activity(&self, activity: Activity) -> Result<()> {
        self.mutate("add_activity", |s| s.activities.push(activity))
    }

    // ─── Derived Reads ───────────────────────────────────────────

    pub fn daily_data(&self) -> DailyMetrics {
        self.state().daily.clone()
    }

    pub fn chart_data(&self) -> ChartData {
        self.state().chart.clone()
    }

    pub fn recent_activities(&self) -> Vec<Activity> {
        self.state().activities.to_vec()
    }

    pub fn program_stats(&self) -> ProgramStats {
        self.state().program_stats
    }

    pub fn total_calories_consumed(&self) -> f64 {
        self.state().daily.total_calories_consumed()
    }

    pub fn calories_remaining(&self) -> f64 {
        self.state().daily.calories_remaining()
    }

    pub fn water_progress(&self) -> i64 {
        self.state().daily.water_progress()
    }

    pub fn health_score(&self) -> u32 {
        self.state().daily.health_score()
    }

    /// Consistent snapshot of all values and derived indicators.
    pub fn summary(&self) -> MetricsSummary {
        let state = self.state();
        MetricsSummary {
            daily_data: state.daily.clone(),
            chart_data: state.chart.clone(),
            total_calories_consumed: state.daily.total_calories_consumed(),
            calories_remaining: state.daily.calories_remaining(),
            water_progress: state.daily.water_progress(),
            health_score: state.daily.health_score(),
        }
    }
}
