// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full service graph (encryption core, store,
//! rotation engine, session gate, audit ledger) over in-memory collaborators.
//! The encryption key is derived through the real Argon2id path with the
//! cheapest parameters the config validator accepts.

use std::sync::Arc;

use secrecy::SecretString;
use strongbox_audit::AuditLedger;
use strongbox_config::model::StrongboxConfig;
use strongbox_config::{ChainMode, ReadMode};
use strongbox_core::StrongboxError;
use strongbox_rotation::KeyRotationEngine;
use strongbox_session::SessionManager;
use strongbox_store::{
    InMemoryRepository, InMemorySchemaRegistry, SecretStore, SessionGate, StoreSettings,
};
use strongbox_vault::EncryptionCore;

use crate::mock_probe::MockProbe;

const TEST_PASSPHRASE: &str = "correct horse battery staple";
const TEST_SALT: [u8; 16] = *b"strongbox-tests!";

/// A syntactically valid OpenAI key built from one repeated character.
pub fn openai_key(c: char) -> String {
    format!("sk-{}", c.to_string().repeat(48))
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: StrongboxConfig,
    probe: Option<MockProbe>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = StrongboxConfig::default();
        config.vault.kdf_memory_cost = 32768;
        config.vault.kdf_iterations = 2;
        config.vault.kdf_parallelism = 1;
        Self {
            config,
            probe: None,
        }
    }

    /// Set the session idle timeout.
    pub fn with_session_timeout(mut self, secs: u64) -> Self {
        self.config.session.timeout_secs = secs;
        self
    }

    /// Set the audit chain linkage.
    pub fn with_chain_mode(mut self, mode: ChainMode) -> Self {
        self.config.audit.chain_mode = mode;
        self
    }

    /// Set the default field read mode.
    pub fn with_read_mode(mut self, mode: ReadMode) -> Self {
        self.config.vault.read_mode = mode;
        self
    }

    /// Set the failure count that marks a rotated key unhealthy.
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.config.rotation.failure_threshold = threshold;
        self
    }

    /// Install a connectivity probe.
    pub fn with_probe(mut self, probe: MockProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Build the harness, deriving the key and wiring every service.
    pub fn build(self) -> Result<TestHarness, StrongboxError> {
        let config = self.config;
        let cipher = Arc::new(EncryptionCore::from_passphrase(
            &SecretString::from(TEST_PASSPHRASE.to_string()),
            &TEST_SALT,
            &config.vault,
        )?);
        let repository = Arc::new(InMemoryRepository::new());
        let registry = Arc::new(InMemorySchemaRegistry::with_builtin_providers()?);
        let audit = Arc::new(AuditLedger::new(&config.audit));
        let rotation = Arc::new(KeyRotationEngine::new(&config.rotation));
        let sessions = Arc::new(SessionManager::new(&config.session));
        let probe = self.probe.map(Arc::new);

        let mut builder = SecretStore::builder(repository.clone(), registry.clone(), cipher.clone())
            .audit(audit.clone())
            .rotation(rotation.clone())
            .settings(StoreSettings::from_config(&config));
        if let Some(probe) = &probe {
            builder = builder.probe(probe.clone());
        }
        let store = Arc::new(builder.build());
        let gate = SessionGate::new(sessions.clone(), store.clone());

        Ok(TestHarness {
            config,
            cipher,
            repository,
            registry,
            audit,
            rotation,
            sessions,
            store,
            gate,
            probe,
        })
    }
}

/// A complete test environment over in-memory collaborators.
pub struct TestHarness {
    /// Configuration the services were built from.
    pub config: StrongboxConfig,
    pub cipher: Arc<EncryptionCore>,
    /// Backing repository, exposed for inspecting stored blobs.
    pub repository: Arc<InMemoryRepository>,
    /// Registry pre-loaded with the built-in providers.
    pub registry: Arc<InMemorySchemaRegistry>,
    pub audit: Arc<AuditLedger>,
    pub rotation: Arc<KeyRotationEngine>,
    pub sessions: Arc<SessionManager>,
    pub store: Arc<SecretStore>,
    /// Token-gated facade over `store`.
    pub gate: SessionGate,
    /// The installed probe, if any.
    pub probe: Option<Arc<MockProbe>>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with every default.
    pub fn new() -> Result<Self, StrongboxError> {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strongbox_store::SecretInput;

    #[tokio::test]
    async fn harness_wires_shared_services() {
        let harness = TestHarness::new().unwrap();
        let input = SecretInput::api_key("openai", "main").field("apiKey", openai_key('a'));
        let summary = harness.store.add("alice", input).await.unwrap();

        assert!(Arc::ptr_eq(harness.store.audit(), &harness.audit));
        assert_eq!(harness.audit.len(), 1);
        assert_eq!(harness.repository.len().await, 1);
        assert!(harness.store.access().owns("alice", &summary.id));
    }

    #[test]
    fn builder_overrides_config() {
        let harness = TestHarness::builder()
            .with_session_timeout(5)
            .with_chain_mode(ChainMode::Linked)
            .build()
            .unwrap();
        assert_eq!(harness.config.session.timeout_secs, 5);
        assert_eq!(harness.audit.chain_mode(), ChainMode::Linked);
    }
}
