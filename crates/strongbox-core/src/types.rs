// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the store, the repository contract and the rotation engine.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which family of record a secret belongs to.
///
/// Both kinds share identical storage and encryption mechanics; they differ
/// only in the field schema they are validated against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SecretKind {
    /// Third-party API credential (keys, tokens, org ids).
    ApiKey,
    /// Website or service login (username, password, url).
    Credential,
}

/// Outcome of the optional connectivity probe run when a secret is added.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TestStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

/// How the rotation engine picks the next key from a pool.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RotationStrategy {
    #[default]
    RoundRobin,
    LeastUsed,
    Random,
    Weighted,
}

/// Non-secret descriptors attached to a stored secret.
///
/// Nothing here is encrypted, so nothing here may hold secret material.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretMetadata {
    /// Free-form labels used for search.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Login or console URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Account name shown next to the record.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Result of the last connectivity probe.
    #[serde(default)]
    pub test_status: TestStatus,
    #[serde(default)]
    pub tested_at: Option<DateTime<Utc>>,
}

/// A secret as persisted through the repository contract.
///
/// Every value in `fields` is an encrypted blob in the vault wire format;
/// plaintext never reaches this struct.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSecret {
    pub id: String,
    pub owner_id: String,
    pub kind: SecretKind,
    /// Provider id for API keys, domain for credentials.
    pub provider_id: String,
    pub name: String,
    /// Field name to ciphertext blob.
    pub fields: BTreeMap<String, String>,
    pub active: bool,
    pub usage_count: u64,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: SecretMetadata,
}

impl std::fmt::Debug for StoredSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSecret")
            .field("id", &self.id)
            .field("owner_id", &self.owner_id)
            .field("kind", &self.kind)
            .field("provider_id", &self.provider_id)
            .field("name", &self.name)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("active", &self.active)
            .field("usage_count", &self.usage_count)
            .finish_non_exhaustive()
    }
}
