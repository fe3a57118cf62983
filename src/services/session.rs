// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: login, logout, token refresh and profile updates.
//!
//! State machine:
//! - LoggedOut --(login ok)--> Active
//! - Active --(logout | failed refresh)--> LoggedOut
//! - Active --(refresh ok | profile update)--> Active
//!
//! All session state sits behind one mutex. The simulated latency windows
//! of `login` and `refresh_auth_token` are awaited without the lock held,
//! so concurrent logins are not serialized: the last one to finish wins.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::config::Config;
use crate::db::{keys, Storage, StorageError, StorageTier};
use crate::error::{AppError, AuthError, Result};
use crate::models::{Credentials, ProfileUpdate, SessionRecord, User, UserRole};
use crate::services::identity::IdentityTable;
use crate::services::token::TokenIssuer;
use crate::time_utils::now_rfc3339;

#[derive(Debug, Clone, Default)]
struct SessionState {
    user: Option<User>,
    token: Option<String>,
    refresh_token: Option<String>,
    /// Tier holding the persisted copy, fixed at login or restore.
    tier: Option<StorageTier>,
}

impl SessionState {
    fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// Record to persist for the current session, with its tier.
    ///
    /// The refresh token is only written to the durable tier.
    fn record(&self) -> Option<(StorageTier, SessionRecord)> {
        let (user, token, tier) = (self.user.as_ref()?, self.token.as_ref()?, self.tier?);
        let refresh_token = match tier {
            StorageTier::Durable => self.refresh_token.clone(),
            StorageTier::Ephemeral => None,
        };
        Some((
            tier,
            SessionRecord {
                user: user.clone(),
                token: token.clone(),
                refresh_token,
            },
        ))
    }
}

/// Why a token refresh was abandoned.
#[derive(Debug, thiserror::Error)]
enum RefreshFailure {
    #[error("session changed while refreshing")]
    SessionChanged,

    #[error(transparent)]
    Token(#[from] AuthError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Owns the authenticated session.
pub struct SessionStore {
    storage: Arc<Storage>,
    identities: IdentityTable,
    tokens: TokenIssuer,
    login_latency: Duration,
    refresh_latency: Duration,
    state: Mutex<SessionState>,
}

impl SessionStore {
    pub fn new(storage: Arc<Storage>, config: &Config) -> Self {
        Self::with_identities(storage, config, IdentityTable::default())
    }

    pub fn with_identities(
        storage: Arc<Storage>,
        config: &Config,
        identities: IdentityTable,
    ) -> Self {
        Self {
            storage,
            identities,
            tokens: TokenIssuer::default(),
            login_latency: config.login_latency,
            refresh_latency: config.refresh_latency,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ─── Lifecycle ───────────────────────────────────────────────

    /// Restore a persisted session, probing the durable tier first.
    ///
    /// Corrupt records are deleted and treated as absent; nothing is
    /// surfaced to the caller. An active session is left as is, so calling
    /// this repeatedly changes nothing.
    pub fn initialize_auth(&self) {
        if self.is_authenticated() {
            tracing::debug!("Session already active, skipping restore");
            return;
        }

        for tier in [StorageTier::Durable, StorageTier::Ephemeral] {
            match self.storage.read_session(tier) {
                Ok(Some(record)) => {
                    let mut state = self.state();
                    // A login may have completed since the check above.
                    if state.is_authenticated() {
                        return;
                    }
                    tracing::info!(user_id = %record.user.id, ?tier, "Restored session");
                    *state = SessionState {
                        user: Some(record.user),
                        token: Some(record.token),
                        refresh_token: record.refresh_token,
                        tier: Some(tier),
                    };
                    return;
                }
                Ok(None) => {}
                Err(e) if e.is_corrupt() => {
                    tracing::warn!(error = %e, ?tier, "Discarding corrupt stored session");
                    if let Err(e) = self.storage.remove(tier, keys::SESSION) {
                        tracing::warn!(error = %e, ?tier, "Failed to remove corrupt session");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, ?tier, "Failed to read stored session");
                }
            }
        }
        tracing::debug!("No stored session found");
    }

    /// Validate credentials and open a session.
    ///
    /// Waits out the simulated validation latency first. On failure no
    /// state changes and `AppError::LoginFailed` is returned.
    pub async fn login(&self, credentials: Credentials) -> Result<User> {
        tokio::time::sleep(self.login_latency).await;

        match self.open_session(&credentials) {
            Ok(user) => {
                tracing::info!(
                    user_id = %user.id,
                    role = user.role.as_str(),
                    remember = credentials.remember,
                    "Login succeeded"
                );
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(reason = %e, "Login failed");
                Err(AppError::LoginFailed(e))
            }
        }
    }

    fn open_session(&self, credentials: &Credentials) -> std::result::Result<User, AuthError> {
        let mut user = self
            .identities
            .validate(&credentials.identifier, &credentials.secret)?;
        user.last_login = Some(now_rfc3339());

        let next = SessionState {
            user: Some(user.clone()),
            token: Some(self.tokens.access_token()?),
            refresh_token: Some(self.tokens.refresh_token()?),
            tier: Some(StorageTier::for_remember(credentials.remember)),
        };

        let mut state = self.state();
        // Write the new record before dropping the other tier's copy, so a
        // failed write leaves the previous session where it was.
        if let Some((tier, record)) = next.record() {
            self.storage.write_session(tier, &record)?;
            self.storage.remove(tier.other(), keys::SESSION)?;
        }
        *state = next;

        Ok(user)
    }

    /// Drop the session from memory and both storage tiers.
    pub fn logout(&self) {
        let mut state = self.state();
        let user_id = state.user.take().map(|u| u.id);
        *state = SessionState::default();

        if let Err(e) = self.storage.clear_session() {
            tracing::warn!(error = %e, "Failed to clear stored session");
        }
        tracing::info!(user_id = ?user_id, "Logged out");
    }

    /// Swap the access token for a fresh one.
    ///
    /// Returns `false` straight away when no refresh token is held. Any
    /// failure after that forces a full logout and returns `false`.
    pub async fn refresh_auth_token(&self) -> bool {
        let held = self.state().refresh_token.clone();
        let Some(held) = held else {
            return false;
        };

        tokio::time::sleep(self.refresh_latency).await;

        match self.rotate_token(&held) {
            Ok(()) => {
                tracing::info!("Access token refreshed");
                true
            }
            Err(reason) => {
                tracing::warn!(%reason, "Token refresh failed, logging out");
                self.logout();
                false
            }
        }
    }

    fn rotate_token(&self, held: &str) -> std::result::Result<(), RefreshFailure> {
        let mut state = self.state();
        if state.user.is_none() || state.refresh_token.as_deref() != Some(held) {
            return Err(RefreshFailure::SessionChanged);
        }

        let mut next = state.clone();
        next.token = Some(self.tokens.access_token()?);
        if let Some((tier, record)) = next.record() {
            self.storage.write_session(tier, &record)?;
        }
        *state = next;
        Ok(())
    }

    /// Merge `update` into the current user and re-persist.
    ///
    /// Returns `Ok(None)` without doing anything when logged out.
    pub fn update_profile(&self, update: ProfileUpdate) -> Result<Option<User>> {
        let mut state = self.state();
        let Some(user) = state.user.as_mut() else {
            tracing::debug!("Profile update ignored, no user logged in");
            return Ok(None);
        };
        user.apply(update);
        let updated = user.clone();

        if let Some((tier, record)) = state.record() {
            self.storage.write_session(tier, &record)?;
        }
        tracing::debug!(user_id = %updated.id, "Profile updated");
        Ok(Some(updated))
    }

    // ─── Derived Reads ───────────────────────────────────────────

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    pub fn user(&self) -> Option<User> {
        self.state().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state().token.clone()
    }

    pub fn has_refresh_token(&self) -> bool {
        self.state().refresh_token.is_some()
    }

    /// Tier holding the persisted session, if any.
    pub fn storage_tier(&self) -> Option<StorageTier> {
        self.state().tier
    }

    pub fn role(&self) -> Option<UserRole> {
        self.state().user.as_ref().map(|u| u.role)
    }

    pub fn is_individual(&self) -> bool {
        self.role() == Some(UserRole::Individual)
    }

    pub fn is_professional(&self) -> bool {
        self.role() == Some(UserRole::Professional)
    }

    pub fn is_educator(&self) -> bool {
        self.role() == Some(UserRole::Educator)
    }

    /// True iff a user is present and their role ranks at least `required`.
    pub fn has_permission(&self, required: UserRole) -> bool {
        self.role().is_some_and(|role| role.satisfies(required))
    }
}
