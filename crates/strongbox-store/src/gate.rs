// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-gated facade over [`SecretStore`].
//!
//! Callers unlock once, then present the session token on every call. The
//! gate resolves the owner from the token and forwards to the store.

use std::sync::Arc;

use serde_json::json;
use strongbox_audit::AuditLevel;
use strongbox_core::StrongboxError;
use strongbox_session::SessionManager;
use tracing::{info, warn};

use crate::model::{RevealedSecret, SecretFilter, SecretInput, SecretSummary, SecretUpdate};
use crate::store::SecretStore;

#[derive(Debug, Clone)]
pub struct SessionGate {
    sessions: Arc<SessionManager>,
    store: Arc<SecretStore>,
}

impl SessionGate {
    pub fn new(sessions: Arc<SessionManager>, store: Arc<SecretStore>) -> Self {
        Self { sessions, store }
    }

    pub fn store(&self) -> &Arc<SecretStore> {
        &self.store
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Open a session for `owner_id` and return its token.
    ///
    /// Proving the caller is `owner_id` (master passphrase, OS login) happens
    /// before this call.
    pub fn unlock(&self, owner_id: &str) -> Result<String, StrongboxError> {
        let token = self.sessions.create_session(owner_id)?;
        self.store.audit().append(
            AuditLevel::Info,
            "vault unlocked",
            json!({"owner_id": owner_id}),
        );
        info!(owner_id, "vault unlocked");
        Ok(token)
    }

    /// End the session. Returns false if the token was already gone.
    pub fn lock(&self, token: &str) -> bool {
        let Ok(owner_id) = self.sessions.verify(token) else {
            return false;
        };
        let removed = self.sessions.invalidate(token);
        if removed {
            self.store.audit().append(
                AuditLevel::Info,
                "vault locked",
                json!({"owner_id": owner_id}),
            );
        }
        removed
    }

    /// Owner behind `token`. Failures are audited without the token itself.
    pub fn resolve(&self, token: &str) -> Result<String, StrongboxError> {
        self.sessions.verify(token).inspect_err(|e| {
            self.store.audit().append(
                AuditLevel::Warn,
                "session verification failed",
                json!({"code": e.code()}),
            );
            warn!("session verification failed");
        })
    }

    pub async fn add(&self, token: &str, input: SecretInput) -> Result<SecretSummary, StrongboxError> {
        let owner_id = self.resolve(token)?;
        self.store.add(&owner_id, input).await
    }

    pub async fn get(&self, token: &str, id: &str, purpose: &str) -> Result<RevealedSecret, StrongboxError> {
        let owner_id = self.resolve(token)?;
        self.store.get(&owner_id, id, purpose).await
    }

    pub async fn list(&self, token: &str, filter: &SecretFilter) -> Result<Vec<SecretSummary>, StrongboxError> {
        let owner_id = self.resolve(token)?;
        self.store.list(&owner_id, filter).await
    }

    pub async fn update(
        &self,
        token: &str,
        id: &str,
        changes: SecretUpdate,
    ) -> Result<SecretSummary, StrongboxError> {
        let owner_id = self.resolve(token)?;
        self.store.update(&owner_id, id, changes).await
    }

    pub async fn delete(&self, token: &str, id: &str) -> Result<(), StrongboxError> {
        let owner_id = self.resolve(token)?;
        self.store.delete(&owner_id, id).await
    }

    pub async fn next_key(
        &self,
        token: &str,
        provider_id: &str,
        purpose: &str,
    ) -> Result<RevealedSecret, StrongboxError> {
        let owner_id = self.resolve(token)?;
        self.store.next_key(&owner_id, provider_id, purpose).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InMemorySchemaRegistry;
    use crate::repository::InMemoryRepository;
    use std::time::Duration;
    use strongbox_config::model::SessionConfig;
    use strongbox_vault::EncryptionCore;
    use tracing_test::traced_test;

    fn gate() -> SessionGate {
        let store = SecretStore::builder(
            Arc::new(InMemoryRepository::new()),
            Arc::new(InMemorySchemaRegistry::with_builtin_providers().unwrap()),
            Arc::new(EncryptionCore::from_key([3u8; 32])),
        )
        .build();
        let sessions = SessionManager::new(&SessionConfig {
            timeout_secs: 60,
            max_lifetime_secs: None,
        });
        SessionGate::new(Arc::new(sessions), Arc::new(store))
    }

    fn key() -> SecretInput {
        SecretInput::api_key("openai", "main").field("apiKey", format!("sk-{}", "z".repeat(48)))
    }

    #[tokio::test]
    async fn token_resolves_to_owner() {
        let gate = gate();
        let token = gate.unlock("alice").unwrap();
        let summary = gate.add(&token, key()).await.unwrap();
        let listed = gate.list(&token, &SecretFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(gate.store().access().owns("alice", &summary.id));
    }

    #[tokio::test]
    async fn locked_session_is_rejected() {
        let gate = gate();
        let token = gate.unlock("alice").unwrap();
        assert!(gate.lock(&token));
        assert!(!gate.lock(&token));
        assert!(matches!(
            gate.list(&token, &SecretFilter::default()).await,
            Err(StrongboxError::AccessDenied(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_session_is_rejected() {
        let gate = gate();
        let token = gate.unlock("alice").unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(gate.resolve(&token).is_err());
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_verification_never_records_token() {
        let gate = gate();
        let bogus = "deadbeefcafe0123";
        assert!(gate.get(bogus, "id", "x").await.is_err());

        let entry = gate
            .store()
            .audit()
            .entries()
            .into_iter()
            .find(|e| e.message == "session verification failed")
            .unwrap();
        assert_eq!(entry.level, AuditLevel::Warn);
        assert!(!entry.data.to_string().contains(bogus));
        assert!(logs_contain("session verification failed"));
        assert!(!logs_contain(bogus));
    }

    #[tokio::test]
    async fn owners_are_isolated_through_tokens() {
        let gate = gate();
        let alice = gate.unlock("alice").unwrap();
        let bob = gate.unlock("bob").unwrap();
        let summary = gate.add(&alice, key()).await.unwrap();
        assert!(matches!(
            gate.get(&bob, &summary.id, "x").await,
            Err(StrongboxError::AccessDenied(_))
        ));
        assert!(gate.delete(&alice, &summary.id).await.is_ok());
    }
}
