// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Opaque session token generation.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::AuthError;

/// Random bytes per token.
const TOKEN_BYTES: usize = 32;

pub const ACCESS_PREFIX: &str = "token_";
pub const REFRESH_PREFIX: &str = "refresh_";

/// Issues random, opaque bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    rng: SystemRandom,
}

impl Default for TokenIssuer {
    fn default() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }
}

impl TokenIssuer {
    pub fn access_token(&self) -> Result<String, AuthError> {
        self.issue(ACCESS_PREFIX)
    }

    pub fn refresh_token(&self) -> Result<String, AuthError> {
        self.issue(REFRESH_PREFIX)
    }

    fn issue(&self, prefix: &str) -> Result<String, AuthError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AuthError::TokenGeneration)?;
        Ok(format!("{}{}", prefix, URL_SAFE_NO_PAD.encode(bytes)))
    }
}
