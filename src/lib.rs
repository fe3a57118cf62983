// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flourish Hub: state layer for a personal wellness dashboard
//!
//! This crate provides the session store (login against a fixed identity
//! list, token lifecycle, role permissions, two-tier persistence) and the
//! metric store (daily nutrition/activity counters, macro derivation,
//! activity feed, write-through persistence), plus a small JSON API over
//! both.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{Storage, StorageError};
use services::{MetricStore, SessionStore};
use std::sync::Arc;

/// Shared application state.
///
/// Built once at startup and passed by reference to every handler.
pub struct AppState {
    pub config: Config,
    pub session: SessionStore,
    pub metrics: MetricStore,
}

impl AppState {
    /// Open storage per `config`, build both stores and restore any
    /// persisted session and metrics.
    pub fn initialize(config: Config) -> Result<Self, StorageError> {
        let storage = Arc::new(match &config.data_dir {
            Some(dir) => Storage::open(dir)?,
            None => Storage::in_memory(),
        });
        Ok(Self::with_storage(config, storage))
    }

    /// Build both stores over an existing storage handle.
    pub fn with_storage(config: Config, storage: Arc<Storage>) -> Self {
        let session = SessionStore::new(storage.clone(), &config);
        let metrics = MetricStore::new(storage);

        session.initialize_auth();
        metrics.load_user_data();

        Self {
            config,
            session,
            metrics,
        }
    }
}
