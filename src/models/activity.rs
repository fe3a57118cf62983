// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recent-activity feed model.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One user action shown in the dashboard feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Activity {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 16))]
    pub icon: String,
    /// Display label, e.g. "2 hours ago"
    #[validate(length(max = 64))]
    pub time: String,
}

impl Activity {
    pub fn new(id: &str, title: &str, icon: &str, time: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            icon: icon.to_string(),
            time: time.to_string(),
        }
    }
}

/// Bounded newest-first activity list.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityLog {
    entries: VecDeque<Activity>,
}

impl ActivityLog {
    /// Maximum number of retained entries.
    pub const CAPACITY: usize = 10;

    pub fn empty() -> Self {
        Self {
            entries: VecDeque::with_capacity(Self::CAPACITY + 1),
        }
    }

    /// Build a log from entries already ordered newest-first, keeping the
    /// newest `CAPACITY`.
    pub fn from_newest_first(entries: Vec<Activity>) -> Self {
        let mut entries: VecDeque<Activity> = entries.into();
        entries.truncate(Self::CAPACITY);
        Self { entries }
    }

    /// Insert at the front, evicting the oldest entries past capacity.
    /// Entries are not deduplicated.
    pub fn push(&mut self, activity: Activity) {
        self.entries.push_front(activity);
        while self.entries.len() > Self::CAPACITY {
            self.entries.pop_back();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<Activity> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for ActivityLog {
    /// Seed feed shown to a fresh dashboard.
    fn default() -> Self {
        Self::from_newest_first(vec![
            Activity::new("1", "Completed morning workout", "🏃", "2 hours ago"),
            Activity::new("2", "Logged breakfast", "🥞", "3 hours ago"),
            Activity::new("3", "Drank water", "💧", "4 hours ago"),
            Activity::new("4", "Read nutrition article", "📖", "1 day ago"),
        ])
    }
}
