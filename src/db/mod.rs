//! Storage layer (durable + ephemeral key-value tiers).

pub mod storage;

pub use storage::{Storage, StorageError};

use serde::{Deserialize, Serialize};

/// Storage keys as constants.
pub mod keys {
    /// Session namespace (user + tokens)
    pub const SESSION: &str = "nutrition_app_session";
    /// Metrics namespace (daily data, charts, activity feed)
    pub const METRICS: &str = "nutrition_data";
}

/// Which persistence tier a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    /// Survives restarts.
    Durable,
    /// Cleared when the client session ends.
    Ephemeral,
}

impl StorageTier {
    /// Tier chosen by the login "remember me" flag.
    pub fn for_remember(remember: bool) -> Self {
        if remember {
            StorageTier::Durable
        } else {
            StorageTier::Ephemeral
        }
    }

    pub fn other(self) -> Self {
        match self {
            StorageTier::Durable => StorageTier::Ephemeral,
            StorageTier::Ephemeral => StorageTier::Durable,
        }
    }
}
