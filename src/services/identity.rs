// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fixed identity table and credential validation.

use subtle::ConstantTimeEq;

use crate::error::AuthError;
use crate::models::{User, UserRole};

/// One account in the identity table.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: &'static str,
    pub identifier: &'static str,
    pub name: &'static str,
    pub role: UserRole,
    pub profile_complete: bool,
    secret: &'static str,
}

impl Identity {
    const fn new(
        id: &'static str,
        identifier: &'static str,
        name: &'static str,
        role: UserRole,
        profile_complete: bool,
        secret: &'static str,
    ) -> Self {
        Self {
            id,
            identifier,
            name,
            role,
            profile_complete,
            secret,
        }
    }

    fn to_user(&self) -> User {
        User {
            id: self.id.to_string(),
            identifier: self.identifier.to_string(),
            name: self.name.to_string(),
            role: self.role,
            profile_complete: self.profile_complete,
            last_login: None,
        }
    }
}

const DEMO_SECRET: &str = "password123";

const BUILTIN_IDENTITIES: [Identity; 6] = [
    Identity::new("1", "sarah@example.com", "Sarah Chen", UserRole::Individual, true, DEMO_SECRET),
    Identity::new("2", "robert@example.com", "Robert Thompson", UserRole::Individual, true, DEMO_SECRET),
    Identity::new("3", "maria@example.com", "Maria Rodriguez", UserRole::Educator, true, DEMO_SECRET),
    Identity::new("4", "admin@example.com", "Admin User", UserRole::Professional, true, DEMO_SECRET),
    Identity::new("5", "admin", "Administrator", UserRole::Professional, true, "admin"),
    Identity::new("6", "user", "Regular User", UserRole::Individual, false, "user"),
];

/// The set of accounts that may log in.
#[derive(Debug, Clone)]
pub struct IdentityTable {
    identities: Vec<Identity>,
}

impl Default for IdentityTable {
    fn default() -> Self {
        Self {
            identities: BUILTIN_IDENTITIES.to_vec(),
        }
    }
}

impl IdentityTable {
    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    /// Check an identifier/secret pair.
    ///
    /// Matching is exact (no case folding or trimming). The secret is
    /// compared in constant time, and an unknown identifier still performs
    /// a comparison.
    pub fn validate(&self, identifier: &str, secret: &str) -> Result<User, AuthError> {
        let found = self.identities.iter().find(|i| i.identifier == identifier);

        let expected = found.map_or(DEMO_SECRET, |i| i.secret);
        let secret_matches: bool = secret.as_bytes().ct_eq(expected.as_bytes()).into();

        match found {
            Some(identity) if secret_matches => Ok(identity.to_user()),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}
