// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (navigation guard, response headers).

pub mod guard;
pub mod headers;

pub use guard::{require_auth, require_guest};
