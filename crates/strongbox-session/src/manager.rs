// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session issuance and verification.

use std::time::Duration;

use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use strongbox_config::model::SessionConfig;
use strongbox_core::StrongboxError;
use tokio::time::Instant;
use tracing::{debug, info};

/// Random bytes per token (256 bits), hex-encoded on the wire.
pub const TOKEN_BYTES: usize = 32;

const INVALID_SESSION: &str = "invalid or expired session";

#[derive(Debug)]
struct Session {
    owner_id: String,
    expires_at: Instant,
    /// Absolute ceiling from `max_lifetime_secs`; sliding never passes it.
    hard_deadline: Option<Instant>,
}

impl Session {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Issues and verifies sliding-expiry session tokens.
///
/// Each token lives in its own map entry; verify holds that entry's lock
/// across the expiry check and the slide.
pub struct SessionManager {
    sessions: DashMap<String, Session>,
    timeout: Duration,
    max_lifetime: Option<Duration>,
    rng: SystemRandom,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("sessions", &self.sessions.len())
            .field("timeout", &self.timeout)
            .field("max_lifetime", &self.max_lifetime)
            .finish()
    }
}

impl SessionManager {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_lifetime: config.max_lifetime_secs.map(Duration::from_secs),
            rng: SystemRandom::new(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue a new token for `owner_id`, valid for the idle timeout.
    pub fn create_session(&self, owner_id: &str) -> Result<String, StrongboxError> {
        if owner_id.trim().is_empty() {
            return Err(StrongboxError::validation("owner_id", "must not be empty"));
        }
        let mut bytes = [0u8; TOKEN_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| StrongboxError::Internal("system random source unavailable".to_string()))?;
        let token = hex::encode(bytes);

        let now = Instant::now();
        let hard_deadline = self.max_lifetime.map(|max| now + max);
        let expires_at = match hard_deadline {
            Some(ceiling) => (now + self.timeout).min(ceiling),
            None => now + self.timeout,
        };
        self.sessions.insert(
            token.clone(),
            Session {
                owner_id: owner_id.to_string(),
                expires_at,
                hard_deadline,
            },
        );
        info!(owner_id, "session created");
        Ok(token)
    }

    /// Resolve `token` to its owner and slide its expiry forward.
    ///
    /// Unknown and expired tokens both yield the same `AccessDenied`.
    pub fn verify(&self, token: &str) -> Result<String, StrongboxError> {
        let now = Instant::now();
        if let Some(mut session) = self.sessions.get_mut(token)
            && !session.is_expired(now)
        {
            let slid = now + self.timeout;
            session.expires_at = match session.hard_deadline {
                Some(ceiling) => slid.min(ceiling),
                None => slid,
            };
            return Ok(session.owner_id.clone());
        }

        if self
            .sessions
            .remove_if(token, |_, s| s.is_expired(now))
            .is_some()
        {
            debug!("expired session evicted");
        }
        Err(StrongboxError::AccessDenied(INVALID_SESSION.to_string()))
    }

    /// End a session early. Returns whether it existed.
    pub fn invalidate(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// End every session belonging to `owner_id`.
    pub fn invalidate_owner(&self, owner_id: &str) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.owner_id != owner_id);
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            info!(owner_id, removed, "sessions invalidated");
        }
        removed
    }

    /// Drop all expired sessions.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired(now));
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            debug!(purged, "expired sessions purged");
        }
        purged
    }

    /// Sessions that would still verify right now.
    pub fn active_count(&self) -> usize {
        let now = Instant::now();
        self.sessions
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .count()
    }
}
