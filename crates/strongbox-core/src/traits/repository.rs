// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repository contract for secret persistence backends.

use async_trait::async_trait;

use crate::error::StrongboxError;
use crate::types::StoredSecret;

/// Narrow persistence contract behind the secret store.
///
/// Implementations only ever see ciphertext. The store serializes all
/// writes for a given id, so backends need per-call atomicity but no
/// cross-call transactions.
#[async_trait]
pub trait SecretRepository: Send + Sync + 'static {
    /// Persists a new record. Fails if the id already exists.
    async fn create(&self, secret: StoredSecret) -> Result<(), StrongboxError>;

    /// Reads a record by id.
    async fn read(&self, id: &str) -> Result<Option<StoredSecret>, StrongboxError>;

    /// Replaces an existing record. Fails with `NotFound` if absent.
    async fn update(&self, secret: StoredSecret) -> Result<(), StrongboxError>;

    /// Removes a record, returning whether it existed.
    async fn delete(&self, id: &str) -> Result<bool, StrongboxError>;

    /// Lists every record belonging to an owner.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<StoredSecret>, StrongboxError>;
}
