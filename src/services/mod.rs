// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - the session and metric stores and their helpers.

pub mod identity;
pub mod metrics;
pub mod session;
pub mod token;

pub use identity::IdentityTable;
pub use metrics::{MetricStore, MetricsSummary};
pub use session::SessionStore;
pub use token::TokenIssuer;
