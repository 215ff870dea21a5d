// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory reference implementation of the repository contract.

use std::collections::HashMap;

use async_trait::async_trait;
use strongbox_core::{ResourceKind, SecretRepository, StoredSecret, StrongboxError};
use tokio::sync::RwLock;
use zeroize::Zeroize;

/// Process-local repository for tests and embedding.
///
/// Removed and replaced records have their field blobs zeroized before the
/// memory is released.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: RwLock<HashMap<String, StoredSecret>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Whether any stored record still carries `blob` in one of its fields.
    pub async fn contains_blob(&self, blob: &str) -> bool {
        self.records
            .read()
            .await
            .values()
            .any(|r| r.fields.values().any(|v| v == blob))
    }
}

fn wipe(secret: &mut StoredSecret) {
    for blob in secret.fields.values_mut() {
        blob.zeroize();
    }
}

#[async_trait]
impl SecretRepository for InMemoryRepository {
    async fn create(&self, secret: StoredSecret) -> Result<(), StrongboxError> {
        let mut records = self.records.write().await;
        if records.contains_key(&secret.id) {
            return Err(StrongboxError::validation(
                "id",
                format!("secret {} already exists", secret.id),
            ));
        }
        records.insert(secret.id.clone(), secret);
        Ok(())
    }

    async fn read(&self, id: &str) -> Result<Option<StoredSecret>, StrongboxError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn update(&self, secret: StoredSecret) -> Result<(), StrongboxError> {
        let mut records = self.records.write().await;
        match records.get_mut(&secret.id) {
            Some(existing) => {
                wipe(existing);
                *existing = secret;
                Ok(())
            }
            None => Err(StrongboxError::not_found(ResourceKind::Secret, secret.id)),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StrongboxError> {
        match self.records.write().await.remove(id) {
            Some(mut removed) => {
                wipe(&mut removed);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<StoredSecret>, StrongboxError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::Utc;
    use strongbox_core::{SecretKind, SecretMetadata};

    fn record(id: &str, owner: &str) -> StoredSecret {
        let now = Utc::now();
        StoredSecret {
            id: id.into(),
            owner_id: owner.into(),
            kind: SecretKind::ApiKey,
            provider_id: "openai".into(),
            name: id.into(),
            fields: BTreeMap::from([("apiKey".to_string(), format!("blob-{id}"))]),
            active: true,
            usage_count: 0,
            last_used_at: None,
            created_at: now,
            updated_at: now,
            metadata: SecretMetadata::default(),
        }
    }

    #[tokio::test]
    async fn create_read_roundtrip() {
        let repo = InMemoryRepository::new();
        repo.create(record("s1", "alice")).await.unwrap();
        let read = repo.read("s1").await.unwrap().unwrap();
        assert_eq!(read.owner_id, "alice");
        assert!(repo.read("s2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_create_fails() {
        let repo = InMemoryRepository::new();
        repo.create(record("s1", "alice")).await.unwrap();
        assert!(repo.create(record("s1", "alice")).await.is_err());
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let repo = InMemoryRepository::new();
        assert!(matches!(
            repo.update(record("s1", "alice")).await,
            Err(StrongboxError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn update_replaces_blob() {
        let repo = InMemoryRepository::new();
        repo.create(record("s1", "alice")).await.unwrap();
        let mut changed = record("s1", "alice");
        changed.fields.insert("apiKey".into(), "fresh".into());
        repo.update(changed).await.unwrap();
        assert!(!repo.contains_blob("blob-s1").await);
        assert!(repo.contains_blob("fresh").await);
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let repo = InMemoryRepository::new();
        repo.create(record("s1", "alice")).await.unwrap();
        assert!(repo.delete("s1").await.unwrap());
        assert!(!repo.delete("s1").await.unwrap());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn list_by_owner_filters() {
        let repo = InMemoryRepository::new();
        repo.create(record("s1", "alice")).await.unwrap();
        repo.create(record("s2", "bob")).await.unwrap();
        repo.create(record("s3", "alice")).await.unwrap();
        let mut ids: Vec<String> = repo
            .list_by_owner("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        ids.sort();
        assert_eq!(ids, ["s1", "s3"]);
        assert_eq!(repo.len().await, 3);
    }
}
