//! Daily nutrition/activity metrics and their derived indicators.
//!
//! Derived values (remaining calories, hydration progress, health score)
//! are pure functions over the current counters, recomputed on every read.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Activity;
use crate::time_utils::round_half_up;

// ─── Macro derivation constants ──────────────────────────────────

/// Share of calories attributed to carbohydrates.
pub const CARBS_RATIO: f64 = 0.45;
/// Share of calories attributed to protein.
pub const PROTEIN_RATIO: f64 = 0.25;
/// Share of calories attributed to fat.
pub const FAT_RATIO: f64 = 0.30;
/// kcal per gram of carbohydrate or protein.
pub const KCAL_PER_GRAM_CARBS_PROTEIN: f64 = 4.0;
/// kcal per gram of fat.
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;
/// Flat fiber heuristic: 1 g per this many kcal.
pub const KCAL_PER_GRAM_FIBER: f64 = 100.0;

/// A tracked quantity with its daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Counter {
    pub current: f64,
    pub target: f64,
}

impl Counter {
    pub const fn new(current: f64, target: f64) -> Self {
        Self { current, target }
    }

    /// Progress towards the target, capped to `[0, 1]`.
    ///
    /// A non-positive target counts as met.
    pub fn capped_ratio(&self) -> f64 {
        if self.target <= 0.0 {
            return 1.0;
        }
        (self.current / self.target).clamp(0.0, 1.0)
    }
}

/// The four daily counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyMetrics {
    /// kcal
    pub calories: Counter,
    /// litres
    pub water: Counter,
    /// minutes
    pub exercise: Counter,
    /// hours
    pub sleep: Counter,
}

impl Default for DailyMetrics {
    fn default() -> Self {
        Self {
            calories: Counter::new(1650.0, 2000.0),
            water: Counter::new(1.8, 2.5),
            exercise: Counter::new(45.0, 60.0),
            sleep: Counter::new(7.2, 8.0),
        }
    }
}

impl DailyMetrics {
    /// Zero every `current`, keeping targets.
    pub fn reset(&mut self) {
        for counter in [
            &mut self.calories,
            &mut self.water,
            &mut self.exercise,
            &mut self.sleep,
        ] {
            counter.current = 0.0;
        }
    }

    /// Add water, keeping one decimal place.
    pub fn add_water(&mut self, amount: f64) {
        self.water.current = round_half_up((self.water.current + amount) * 10.0) / 10.0;
    }

    pub fn total_calories_consumed(&self) -> f64 {
        self.calories.current
    }

    pub fn calories_remaining(&self) -> f64 {
        (self.calories.target - self.calories.current).max(0.0)
    }

    /// Hydration as a whole percentage of target. May exceed 100.
    pub fn water_progress(&self) -> i64 {
        if self.water.target <= 0.0 {
            return 0;
        }
        round_half_up(self.water.current / self.water.target * 100.0) as i64
    }

    /// Composite 0–100 score: mean of the four target-capped ratios.
    pub fn health_score(&self) -> u32 {
        let ratios = [
            self.calories.capped_ratio(),
            self.water.capped_ratio(),
            self.exercise.capped_ratio(),
            self.sleep.capped_ratio(),
        ];
        let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
        round_half_up(mean * 100.0) as u32
    }
}

/// Running gram totals for the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MacroTotals {
    pub carbs: i64,
    pub protein: i64,
    pub fat: i64,
    pub fiber: i64,
}

impl Default for MacroTotals {
    fn default() -> Self {
        Self {
            carbs: 195,
            protein: 125,
            fat: 65,
            fiber: 28,
        }
    }
}

impl MacroTotals {
    pub const ZERO: MacroTotals = MacroTotals {
        carbs: 0,
        protein: 0,
        fat: 0,
        fiber: 0,
    };

    /// Fold a calorie delta into the totals.
    ///
    /// Each macro is rounded independently; no residual is carried, so
    /// small deltas can contribute nothing. Totals saturate at the `i64`
    /// bounds.
    pub fn apply_calories(&mut self, calories: f64) {
        self.carbs = self
            .carbs
            .saturating_add(grams(calories * CARBS_RATIO / KCAL_PER_GRAM_CARBS_PROTEIN));
        self.protein = self
            .protein
            .saturating_add(grams(calories * PROTEIN_RATIO / KCAL_PER_GRAM_CARBS_PROTEIN));
        self.fat = self
            .fat
            .saturating_add(grams(calories * FAT_RATIO / KCAL_PER_GRAM_FAT));
        self.fiber = self
            .fiber
            .saturating_add(grams(calories / KCAL_PER_GRAM_FIBER));
    }

    /// Totals after folding in `calories`, leaving `self` untouched.
    pub fn with_calories(mut self, calories: f64) -> Self {
        self.apply_calories(calories);
        self
    }
}

/// Whole grams; `as` saturates out-of-range values and maps NaN to 0.
fn grams(value: f64) -> i64 {
    round_half_up(value) as i64
}

/// Calorie totals for the last seven days (index 0–6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeeklySeries([f64; WeeklySeries::DAYS]);

impl Default for WeeklySeries {
    fn default() -> Self {
        Self([1800.0, 2100.0, 1950.0, 2200.0, 1700.0, 2050.0, 1650.0])
    }
}

impl WeeklySeries {
    pub const DAYS: usize = 7;

    pub fn new(values: [f64; Self::DAYS]) -> Self {
        Self(values)
    }

    /// Write one day's total. Returns `false` (and changes nothing) when
    /// `day` is out of range.
    pub fn set(&mut self, day: usize, calories: f64) -> bool {
        match self.0.get_mut(day) {
            Some(slot) => {
                *slot = calories;
                true
            }
            None => false,
        }
    }

    pub fn values(&self) -> &[f64; Self::DAYS] {
        &self.0
    }
}

/// Chart-facing aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChartData {
    pub macros: MacroTotals,
    pub weekly: WeeklySeries,
}

/// Static program display counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgramStats {
    pub active_users: u32,
    pub completed_programs: u32,
}

impl Default for ProgramStats {
    fn default() -> Self {
        Self {
            active_users: 248,
            completed_programs: 156,
        }
    }
}

// ─── Persisted record ────────────────────────────────────────────

/// Metrics namespace record as written to durable storage.
///
/// Stored at key `nutrition_data`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    pub daily_data: DailyMetrics,
    pub chart_data: ChartData,
    pub recent_activities: Vec<Activity>,
    /// RFC3339 write time
    pub last_updated: String,
}

/// Metrics record as read back. Every field is optional so that a record
/// written by an older client merges over the defaults.
///
/// Fields are parsed one at a time: a malformed field is logged and
/// dropped while its siblings still load.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMetrics {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub daily_data: StoredDailyMetrics,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub chart_data: StoredChartData,
    #[serde(default, deserialize_with = "lenient")]
    pub recent_activities: Option<Vec<Activity>>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoredDailyMetrics {
    #[serde(default, deserialize_with = "lenient")]
    pub calories: Option<Counter>,
    #[serde(default, deserialize_with = "lenient")]
    pub water: Option<Counter>,
    #[serde(default, deserialize_with = "lenient")]
    pub exercise: Option<Counter>,
    #[serde(default, deserialize_with = "lenient")]
    pub sleep: Option<Counter>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoredChartData {
    #[serde(default, deserialize_with = "lenient")]
    pub macros: Option<MacroTotals>,
    #[serde(default, deserialize_with = "lenient")]
    pub weekly: Option<WeeklySeries>,
}

/// Parse a field through `serde_json::Value`, mapping `null` and malformed
/// values to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::warn!(
                error = %e,
                field_type = std::any::type_name::<T>(),
                "Ignoring malformed stored metrics field"
            );
            Ok(None)
        }
    }
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    lenient(deserializer).map(Option::unwrap_or_default)
}

impl StoredMetrics {
    /// Overlay loaded fields onto `daily` and `chart`; missing fields keep
    /// their current values.
    pub fn merge_into(self, daily: &mut DailyMetrics, chart: &mut ChartData) {
        let StoredDailyMetrics {
            calories,
            water,
            exercise,
            sleep,
        } = self.daily_data;
        if let Some(c) = calories {
            daily.calories = c;
        }
        if let Some(c) = water {
            daily.water = c;
        }
        if let Some(c) = exercise {
            daily.exercise = c;
        }
        if let Some(c) = sleep {
            daily.sleep = c;
        }

        if let Some(macros) = self.chart_data.macros {
            chart.macros = macros;
        }
        if let Some(weekly) = self.chart_data.weekly {
            chart.weekly = weekly;
        }
    }
}
