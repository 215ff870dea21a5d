// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The secret store: validated, encrypted CRUD over API keys and credentials.
//!
//! Every check-then-act sequence on one secret (ownership check, decrypt,
//! usage bump; update; shred and removal) runs under that secret's own async
//! mutex, so unrelated secrets never contend. The connectivity probe runs
//! after every lock is released.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use strongbox_audit::{AuditLedger, AuditLevel};
use strongbox_config::{ReadMode, StrongboxConfig};
use strongbox_core::{
    ConnectivityProbe, ProviderSchema, ResourceKind, RotationStrategy, SchemaRegistry,
    SecretKind, SecretMetadata, SecretRepository, StoredSecret, StrongboxError, TestStatus,
};
use strongbox_rotation::{KeyRotationEngine, PoolStats, RotationCandidate};
use strongbox_vault::EncryptionCore;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::access::AccessControlLedger;
use crate::generator::{self, GeneratorOptions};
use crate::model::{RevealedSecret, SecretFilter, SecretInput, SecretSummary, SecretUpdate};
use crate::strength::{self, StrengthReport};

/// Field scored against `min_credential_strength` on credentials.
const PASSWORD_FIELD: &str = "password";

/// Tunables taken from [`StrongboxConfig`].
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub read_mode: ReadMode,
    pub probe_timeout: Duration,
    pub min_credential_strength: u8,
    pub default_strategy: RotationStrategy,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self::from_config(&StrongboxConfig::default())
    }
}

impl StoreSettings {
    pub fn from_config(config: &StrongboxConfig) -> Self {
        Self {
            read_mode: config.vault.read_mode,
            probe_timeout: Duration::from_millis(config.store.probe_timeout_ms),
            min_credential_strength: config.store.min_credential_strength,
            default_strategy: config.rotation.default_strategy,
        }
    }
}

/// Builder for [`SecretStore`]. Audit and rotation default to fresh instances.
pub struct SecretStoreBuilder {
    repository: Arc<dyn SecretRepository>,
    registry: Arc<dyn SchemaRegistry>,
    cipher: Arc<EncryptionCore>,
    audit: Option<Arc<AuditLedger>>,
    rotation: Option<Arc<KeyRotationEngine>>,
    access: Option<Arc<AccessControlLedger>>,
    probe: Option<Arc<dyn ConnectivityProbe>>,
    settings: StoreSettings,
}

impl SecretStoreBuilder {
    pub fn audit(mut self, audit: Arc<AuditLedger>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn rotation(mut self, rotation: Arc<KeyRotationEngine>) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn access(mut self, access: Arc<AccessControlLedger>) -> Self {
        self.access = Some(access);
        self
    }

    pub fn probe(mut self, probe: Arc<dyn ConnectivityProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn settings(mut self, settings: StoreSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> SecretStore {
        SecretStore {
            repository: self.repository,
            registry: self.registry,
            cipher: self.cipher,
            audit: self.audit.unwrap_or_default(),
            rotation: self.rotation.unwrap_or_default(),
            access: self.access.unwrap_or_default(),
            probe: self.probe,
            locks: DashMap::new(),
            settings: self.settings,
        }
    }
}

/// Encrypted CRUD over secrets with ownership checks and auditing.
pub struct SecretStore {
    repository: Arc<dyn SecretRepository>,
    registry: Arc<dyn SchemaRegistry>,
    cipher: Arc<EncryptionCore>,
    audit: Arc<AuditLedger>,
    rotation: Arc<KeyRotationEngine>,
    access: Arc<AccessControlLedger>,
    probe: Option<Arc<dyn ConnectivityProbe>>,
    locks: DashMap<String, Arc<Mutex<()>>>,
    settings: StoreSettings,
}

impl std::fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStore")
            .field("settings", &self.settings)
            .field("probe", &self.probe.is_some())
            .finish_non_exhaustive()
    }
}

/// Rotation pools are scoped per owner so two owners' keys for the same
/// provider never share a pool.
pub fn pool_id(owner_id: &str, provider_id: &str) -> String {
    format!("{owner_id}/{provider_id}")
}

/// Exclusive hold on one secret id.
///
/// Dropping it releases the mutex and removes the map entry unless another
/// task is queued on it, so the map only holds ids with work in flight.
struct EntityLock<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    id: String,
    mutex: Arc<Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for EntityLock<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // One reference in the map, one in `self.mutex`; anything more is a waiter.
        self.locks.remove_if(&self.id, |_, held| {
            Arc::ptr_eq(held, &self.mutex) && Arc::strong_count(held) == 2
        });
    }
}

/// A record whose every field has been overwritten by [`SecretStore::delete`].
fn is_shredded(secret: &StoredSecret) -> bool {
    !secret.fields.is_empty()
        && secret
            .fields
            .values()
            .all(|blob| blob.bytes().all(|b| b == 0))
}

impl SecretStore {
    pub fn builder(
        repository: Arc<dyn SecretRepository>,
        registry: Arc<dyn SchemaRegistry>,
        cipher: Arc<EncryptionCore>,
    ) -> SecretStoreBuilder {
        SecretStoreBuilder {
            repository,
            registry,
            cipher,
            audit: None,
            rotation: None,
            access: None,
            probe: None,
            settings: StoreSettings::default(),
        }
    }

    pub fn audit(&self) -> &Arc<AuditLedger> {
        &self.audit
    }

    pub fn rotation(&self) -> &Arc<KeyRotationEngine> {
        &self.rotation
    }

    pub fn access(&self) -> &Arc<AccessControlLedger> {
        &self.access
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    async fn lock_entity(&self, id: &str) -> EntityLock<'_> {
        let mutex = self.locks.entry(id.to_string()).or_default().clone();
        let guard = Arc::clone(&mutex).lock_owned().await;
        EntityLock {
            locks: &self.locks,
            id: id.to_string(),
            mutex,
            guard: Some(guard),
        }
    }

    fn resolve_schema(&self, kind: SecretKind, provider_id: &str) -> Result<ProviderSchema, StrongboxError> {
        match self.registry.schema(provider_id) {
            Some(schema) if schema.kind == kind => Ok(schema),
            Some(schema) => Err(StrongboxError::validation(
                "kind",
                format!("provider {provider_id} expects {}", schema.kind),
            )),
            None if kind == SecretKind::Credential => Ok(ProviderSchema::login(provider_id)),
            None => Err(StrongboxError::not_found(ResourceKind::Provider, provider_id)),
        }
    }

    /// Check names, presence, format and (for credentials) password strength.
    ///
    /// With `partial`, absent required fields are allowed since they keep
    /// their stored value.
    fn validate_fields(
        &self,
        schema: &ProviderSchema,
        fields: &BTreeMap<String, SecretString>,
        partial: bool,
    ) -> Result<(), StrongboxError> {
        for name in fields.keys() {
            if schema.field(name).is_none() {
                return Err(StrongboxError::validation(
                    name.clone(),
                    format!("not a field of provider {}", schema.id),
                ));
            }
        }
        for spec in &schema.fields {
            let value = fields.get(&spec.name).map(|v| v.expose_secret());
            match value {
                None | Some("") if spec.required && !(partial && value.is_none()) => {
                    return Err(StrongboxError::validation(
                        spec.name.clone(),
                        "required field is missing",
                    ));
                }
                Some(v) if !v.is_empty() && !spec.accepts(v) => {
                    return Err(StrongboxError::validation(
                        spec.name.clone(),
                        format!("invalid format for {}", spec.label),
                    ));
                }
                _ => {}
            }
        }
        if schema.kind == SecretKind::Credential
            && let Some(password) = fields.get(PASSWORD_FIELD)
        {
            let score = strength::analyze_strength(password.expose_secret()).score;
            if score < self.settings.min_credential_strength {
                return Err(StrongboxError::WeakSecret {
                    score,
                    minimum: self.settings.min_credential_strength,
                });
            }
        }
        Ok(())
    }

    fn audit_rejection(&self, owner_id: &str, operation: &str, target: &str, err: &StrongboxError) {
        let level = match err {
            StrongboxError::Validation { .. } | StrongboxError::WeakSecret { .. } => AuditLevel::Warn,
            StrongboxError::AccessDenied(_) => AuditLevel::Warn,
            StrongboxError::NotFound { .. } => AuditLevel::Info,
            _ => AuditLevel::Error,
        };
        let mut data = json!({
            "owner_id": owner_id,
            "operation": operation,
            "target": target,
            "code": err.code(),
        });
        if let StrongboxError::Validation { field, .. } = err {
            data["field"] = json!(field);
        }
        self.audit
            .append(level, format!("secret {operation} rejected"), data);
    }

    /// Ownership check for a locked id: `NotFound` if the record is gone,
    /// `AccessDenied` if it belongs to someone else.
    /// The caller's record, hiding one whose shred committed but whose
    /// removal did not.
    async fn owned_record(&self, owner_id: &str, id: &str) -> Result<StoredSecret, StrongboxError> {
        match self.owned_stored(owner_id, id).await? {
            record if is_shredded(&record) => Err(StrongboxError::not_found(ResourceKind::Secret, id)),
            record => Ok(record),
        }
    }

    async fn owned_stored(&self, owner_id: &str, id: &str) -> Result<StoredSecret, StrongboxError> {
        let record = self.repository.read(id).await?;
        match record {
            Some(record) if self.access.owns(owner_id, id) && record.owner_id == owner_id => {
                Ok(record)
            }
            Some(_) => Err(StrongboxError::AccessDenied(format!(
                "secret {id} is not owned by the caller"
            ))),
            None => Err(StrongboxError::not_found(ResourceKind::Secret, id)),
        }
    }

    /// Validate, encrypt and store a new secret.
    pub async fn add(&self, owner_id: &str, input: SecretInput) -> Result<SecretSummary, StrongboxError> {
        let result = self.add_inner(owner_id, input).await;
        if let Err(e) = &result {
            self.audit_rejection(owner_id, "add", "new", e);
        }
        result
    }

    async fn add_inner(&self, owner_id: &str, input: SecretInput) -> Result<SecretSummary, StrongboxError> {
        if owner_id.trim().is_empty() {
            return Err(StrongboxError::validation("owner_id", "must not be empty"));
        }
        if input.provider_id.trim().is_empty() {
            return Err(StrongboxError::validation("provider_id", "must not be empty"));
        }
        let schema = self.resolve_schema(input.kind, &input.provider_id)?;
        self.validate_fields(&schema, &input.fields, false)?;

        let fields = self.cipher.encrypt_fields(&input.fields)?;
        let plain_descriptor = |name: &str| {
            (input.kind == SecretKind::Credential)
                .then(|| input.fields.get(name))
                .flatten()
                .map(|v| v.expose_secret().to_string())
        };
        let metadata = SecretMetadata {
            tags: input.tags.clone(),
            url: input.url.clone().or_else(|| plain_descriptor("url")),
            username: input.username.clone().or_else(|| plain_descriptor("username")),
            notes: input.notes.clone(),
            test_status: TestStatus::Pending,
            tested_at: None,
        };
        let now = Utc::now();
        let name = if input.name.trim().is_empty() {
            schema.display_name.clone()
        } else {
            input.name.clone()
        };
        let secret = StoredSecret {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            kind: input.kind,
            provider_id: input.provider_id.clone(),
            name,
            fields,
            active: true,
            usage_count: 0,
            last_used_at: None,
            created_at: now,
            updated_at: now,
            metadata,
        };
        let id = secret.id.clone();
        let mut summary = SecretSummary::from(&secret);

        self.repository.create(secret).await?;
        self.access.grant(owner_id, &id);
        self.audit.append(
            AuditLevel::Info,
            "secret added",
            json!({
                "owner_id": owner_id,
                "secret_id": id,
                "provider_id": input.provider_id,
                "kind": input.kind,
            }),
        );
        metrics::counter!("strongbox_secrets_added_total", "kind" => input.kind.to_string())
            .increment(1);
        info!(owner_id, secret_id = %id, provider_id = %input.provider_id, "secret added");

        if input.test_connection
            && schema.probe.is_some()
            && let Some(probe) = &self.probe
        {
            let status = self.run_probe(probe.as_ref(), &schema, &input.fields).await;
            if let Some(updated) = self.record_probe(owner_id, &id, status).await {
                summary = updated;
            }
        }
        Ok(summary)
    }

    async fn run_probe(
        &self,
        probe: &dyn ConnectivityProbe,
        schema: &ProviderSchema,
        fields: &BTreeMap<String, SecretString>,
    ) -> TestStatus {
        match tokio::time::timeout(self.settings.probe_timeout, probe.probe(schema, fields)).await {
            Ok(Ok(())) => TestStatus::Success,
            Ok(Err(e)) => {
                warn!(provider_id = %schema.id, error = %e, "connectivity probe failed");
                TestStatus::Failed
            }
            Err(_) => {
                let err = StrongboxError::Timeout {
                    duration: self.settings.probe_timeout,
                };
                warn!(provider_id = %schema.id, error = %err, "connectivity probe timed out");
                TestStatus::Failed
            }
        }
    }

    /// Store the probe outcome. The secret may have been deleted meanwhile.
    async fn record_probe(&self, owner_id: &str, id: &str, status: TestStatus) -> Option<SecretSummary> {
        let _lock = self.lock_entity(id).await;
        let mut record = self
            .repository
            .read(id)
            .await
            .ok()
            .flatten()
            .filter(|r| !is_shredded(r))?;
        record.metadata.test_status = status;
        record.metadata.tested_at = Some(Utc::now());
        if let Err(e) = self.repository.update(record.clone()).await {
            warn!(secret_id = id, error = %e, "failed to record probe outcome");
            return None;
        }
        self.audit.append(
            AuditLevel::Info,
            "secret connectivity tested",
            json!({"owner_id": owner_id, "secret_id": id, "status": status}),
        );
        Some(SecretSummary::from(&record))
    }

    /// Decrypt a secret for its owner using the configured read mode.
    pub async fn get(&self, owner_id: &str, id: &str, purpose: &str) -> Result<RevealedSecret, StrongboxError> {
        self.get_with_mode(owner_id, id, purpose, self.settings.read_mode)
            .await
    }

    /// Like [`Self::get`] but any undecryptable field fails the call.
    pub async fn get_strict(&self, owner_id: &str, id: &str, purpose: &str) -> Result<RevealedSecret, StrongboxError> {
        self.get_with_mode(owner_id, id, purpose, ReadMode::Strict)
            .await
    }

    pub async fn get_with_mode(
        &self,
        owner_id: &str,
        id: &str,
        purpose: &str,
        mode: ReadMode,
    ) -> Result<RevealedSecret, StrongboxError> {
        let result = self.get_inner(owner_id, id, purpose, mode).await;
        if let Err(e) = &result {
            self.audit_rejection(owner_id, "get", id, e);
        }
        result
    }

    async fn get_inner(
        &self,
        owner_id: &str,
        id: &str,
        purpose: &str,
        mode: ReadMode,
    ) -> Result<RevealedSecret, StrongboxError> {
        let _lock = self.lock_entity(id).await;

        let mut record = self.owned_record(owner_id, id).await?;
        let fields = self.cipher.decrypt_fields(&record.fields, mode)?;

        record.usage_count = record.usage_count.saturating_add(1);
        record.last_used_at = Some(Utc::now());
        self.repository.update(record.clone()).await?;
        self.rotation.record_usage(id);

        let revealed = RevealedSecret {
            summary: SecretSummary::from(&record),
            fields,
        };
        let unreadable = revealed.unreadable();
        self.audit.append(
            if unreadable.is_empty() { AuditLevel::Info } else { AuditLevel::Warn },
            "secret accessed",
            json!({
                "owner_id": owner_id,
                "secret_id": id,
                "provider_id": record.provider_id,
                "purpose": purpose,
                "unreadable_fields": unreadable,
            }),
        );
        metrics::counter!("strongbox_secret_reads_total").increment(1);
        Ok(revealed)
    }

    /// Sanitized records for `owner_id`, oldest first.
    pub async fn list(&self, owner_id: &str, filter: &SecretFilter) -> Result<Vec<SecretSummary>, StrongboxError> {
        let mut records: Vec<StoredSecret> = self
            .repository
            .list_by_owner(owner_id)
            .await?
            .into_iter()
            .filter(|r| self.access.owns(owner_id, &r.id) && !is_shredded(r) && filter.matches(r))
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        debug!(owner_id, count = records.len(), "secrets listed");
        Ok(records.iter().map(SecretSummary::from).collect())
    }

    /// Apply a partial update. Only the supplied fields are re-encrypted.
    pub async fn update(
        &self,
        owner_id: &str,
        id: &str,
        changes: SecretUpdate,
    ) -> Result<SecretSummary, StrongboxError> {
        let result = self.update_inner(owner_id, id, changes).await;
        if let Err(e) = &result {
            self.audit_rejection(owner_id, "update", id, e);
        }
        result
    }

    async fn update_inner(
        &self,
        owner_id: &str,
        id: &str,
        changes: SecretUpdate,
    ) -> Result<SecretSummary, StrongboxError> {
        let _lock = self.lock_entity(id).await;

        let mut record = self.owned_record(owner_id, id).await?;
        if !changes.fields.is_empty() {
            let schema = self.resolve_schema(record.kind, &record.provider_id)?;
            self.validate_fields(&schema, &changes.fields, true)?;
            let encrypted = self.cipher.encrypt_fields(&changes.fields)?;
            record.fields.extend(encrypted);
        }
        if let Some(name) = &changes.name {
            if name.trim().is_empty() {
                return Err(StrongboxError::validation("name", "must not be empty"));
            }
            record.name = name.clone();
        }
        if let Some(tags) = &changes.tags {
            record.metadata.tags = tags.clone();
        }
        if let Some(url) = &changes.url {
            record.metadata.url = Some(url.clone());
        }
        if let Some(username) = &changes.username {
            record.metadata.username = Some(username.clone());
        }
        if let Some(notes) = &changes.notes {
            record.metadata.notes = Some(notes.clone());
        }
        if let Some(active) = changes.active {
            record.active = active;
        }
        record.updated_at = Utc::now();
        self.repository.update(record.clone()).await?;

        if changes.active == Some(false) {
            self.rotation
                .remove_from_pool(&pool_id(owner_id, &record.provider_id), id);
        }
        self.audit.append(
            AuditLevel::Info,
            "secret updated",
            json!({"owner_id": owner_id, "secret_id": id, "changed": changes.changed()}),
        );
        Ok(SecretSummary::from(&record))
    }

    /// Crypto-shred and remove a secret.
    ///
    /// Every field blob is overwritten with NUL bytes of equal length and that
    /// overwrite is committed before the record leaves the repository, the
    /// rotation pool and the access index. A failed overwrite aborts the delete.
    pub async fn delete(&self, owner_id: &str, id: &str) -> Result<(), StrongboxError> {
        let result = self.delete_inner(owner_id, id).await;
        if let Err(e) = &result {
            self.audit_rejection(owner_id, "delete", id, e);
        }
        result
    }

    async fn delete_inner(&self, owner_id: &str, id: &str) -> Result<(), StrongboxError> {
        let _lock = self.lock_entity(id).await;
        // Shredded leftovers stay reachable here so a retry can finish removal.
        let record = self.owned_stored(owner_id, id).await?;
        let provider_id = record.provider_id.clone();

        let mut shredded = record;
        for blob in shredded.fields.values_mut() {
            let len = blob.len();
            zeroize::Zeroize::zeroize(blob);
            *blob = "\0".repeat(len);
        }
        shredded.active = false;
        shredded.updated_at = Utc::now();
        let field_count = shredded.fields.len();
        self.repository.update(shredded).await.map_err(|e| {
            StrongboxError::Internal(format!("crypto-shred of secret {id} did not commit: {e}"))
        })?;

        if !self.repository.delete(id).await? {
            return Err(StrongboxError::Internal(format!(
                "secret {id} vanished during delete"
            )));
        }
        self.rotation
            .remove_from_pool(&pool_id(owner_id, &provider_id), id);
        self.access.revoke(owner_id, id);

        self.audit.append(
            AuditLevel::Info,
            "secret deleted",
            json!({
                "owner_id": owner_id,
                "secret_id": id,
                "provider_id": provider_id,
                "shredded_fields": field_count,
            }),
        );
        metrics::counter!("strongbox_secrets_deleted_total").increment(1);
        info!(owner_id, secret_id = id, "secret crypto-shredded and deleted");
        Ok(())
    }

    /// Random secret from the OS CSPRNG.
    pub fn generate_secret(options: &GeneratorOptions) -> Result<SecretString, StrongboxError> {
        generator::generate_secret(options)
    }

    /// Deterministic strength score.
    pub fn analyze_strength(secret: &str) -> StrengthReport {
        strength::analyze_strength(secret)
    }

    async fn candidates(&self, owner_id: &str, provider_id: &str) -> Result<Vec<StoredSecret>, StrongboxError> {
        Ok(self
            .repository
            .list_by_owner(owner_id)
            .await?
            .into_iter()
            .filter(|r| r.provider_id == provider_id && !is_shredded(r))
            .collect())
    }

    /// Build (or rebuild) the owner's pool for `provider_id` from every
    /// active secret they hold for it.
    pub async fn enable_rotation(
        &self,
        owner_id: &str,
        provider_id: &str,
        strategy: Option<RotationStrategy>,
    ) -> Result<PoolStats, StrongboxError> {
        let strategy = strategy.unwrap_or(self.settings.default_strategy);
        let mut secrets: Vec<StoredSecret> = self
            .candidates(owner_id, provider_id)
            .await?
            .into_iter()
            .filter(|r| r.active)
            .collect();
        secrets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let pool = pool_id(owner_id, provider_id);
        let ids = secrets.iter().map(|s| s.id.clone()).collect();
        self.rotation.create_pool(&pool, ids, strategy)?;
        for s in &secrets {
            self.rotation.seed_usage(&s.id, s.usage_count, s.last_used_at);
        }
        self.audit.append(
            AuditLevel::Info,
            "rotation enabled",
            json!({
                "owner_id": owner_id,
                "provider_id": provider_id,
                "strategy": strategy,
                "keys": secrets.len(),
            }),
        );
        self.rotation.pool_stats(&pool)
    }

    /// Add one of the owner's active secrets to its provider pool.
    pub async fn add_to_rotation(&self, owner_id: &str, id: &str) -> Result<bool, StrongboxError> {
        let _lock = self.lock_entity(id).await;
        let record = self.owned_record(owner_id, id).await?;
        if !record.active {
            return Err(StrongboxError::validation(
                "active",
                "inactive secrets cannot join rotation",
            ));
        }
        let added = self
            .rotation
            .add_to_pool(&pool_id(owner_id, &record.provider_id), id)?;
        if added {
            self.rotation
                .seed_usage(id, record.usage_count, record.last_used_at);
            self.audit.append(
                AuditLevel::Info,
                "secret added to rotation",
                json!({"owner_id": owner_id, "secret_id": id, "provider_id": record.provider_id}),
            );
        }
        Ok(added)
    }

    pub async fn remove_from_rotation(&self, owner_id: &str, id: &str) -> Result<bool, StrongboxError> {
        let _lock = self.lock_entity(id).await;
        let record = self.owned_record(owner_id, id).await?;
        let removed = self
            .rotation
            .remove_from_pool(&pool_id(owner_id, &record.provider_id), id);
        if removed {
            self.audit.append(
                AuditLevel::Info,
                "secret removed from rotation",
                json!({"owner_id": owner_id, "secret_id": id, "provider_id": record.provider_id}),
            );
        }
        Ok(removed)
    }

    /// Select the next key from the owner's pool and read it.
    pub async fn next_key(
        &self,
        owner_id: &str,
        provider_id: &str,
        purpose: &str,
    ) -> Result<RevealedSecret, StrongboxError> {
        let candidates: Vec<RotationCandidate> = self
            .candidates(owner_id, provider_id)
            .await?
            .into_iter()
            .filter(|r| self.access.owns(owner_id, &r.id))
            .map(|r| RotationCandidate::new(r.id, r.active))
            .collect();
        let id = match self
            .rotation
            .select_next(&pool_id(owner_id, provider_id), &candidates)
        {
            Ok(id) => id,
            Err(e) => {
                self.audit_rejection(owner_id, "rotate", provider_id, &e);
                return Err(e);
            }
        };
        debug!(owner_id, provider_id, secret_id = %id, "rotation selected key");
        self.get(owner_id, &id, purpose).await
    }

    /// Feed the result of using a rotated key back into its health.
    pub async fn report_key_outcome(&self, owner_id: &str, id: &str, success: bool) -> Result<(), StrongboxError> {
        {
            let _lock = self.lock_entity(id).await;
            self.owned_record(owner_id, id).await?;
        }
        if success {
            self.rotation.record_success(id)?;
        } else {
            self.rotation.record_failure(id)?;
            self.audit.append(
                AuditLevel::Warn,
                "rotated key reported failing",
                json!({"owner_id": owner_id, "secret_id": id, "healthy": self.rotation.is_healthy(id)}),
            );
        }
        Ok(())
    }

    pub fn pool_stats(&self, owner_id: &str, provider_id: &str) -> Result<PoolStats, StrongboxError> {
        self.rotation.pool_stats(&pool_id(owner_id, provider_id))
    }
}
