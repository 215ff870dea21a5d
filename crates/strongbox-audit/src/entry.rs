// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit entry model and the chain hash function.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strum::{Display, EnumString};

/// Hash every chain starts from: 64 hex zeros.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Severity of an audited event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuditLevel {
    Info,
    Warn,
    Error,
    Critical,
}

/// One immutable record in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry identifier (UUID v4).
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: AuditLevel,
    pub message: String,
    /// Structured context. Ids only, never secret material.
    pub data: serde_json::Value,
    /// Hex SHA-256 over the previous hash and this entry's content.
    pub hash: String,
    /// Hash this entry was chained to. Present only in linked chain mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_hash: Option<String>,
}

impl AuditEntry {
    /// Recompute this entry's hash against `previous`.
    pub fn compute_hash(&self, previous: &str) -> String {
        chain_hash(previous, &self.timestamp, self.level, &self.message, &self.data)
    }
}

/// `SHA-256(previous | timestamp | level | message | data)` as lowercase hex.
///
/// `data` is serialized with sorted object keys so the digest is stable
/// across serialize/deserialize cycles.
pub fn chain_hash(
    previous: &str,
    timestamp: &DateTime<Utc>,
    level: AuditLevel,
    message: &str,
    data: &serde_json::Value,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(previous.as_bytes());
    hasher.update(b"|");
    hasher.update(
        timestamp
            .to_rfc3339_opts(SecondsFormat::Nanos, true)
            .as_bytes(),
    );
    hasher.update(b"|");
    hasher.update(level.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(message.as_bytes());
    hasher.update(b"|");
    hasher.update(data.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Composable query over the ledger. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub level: Option<AuditLevel>,
    /// Matches entries whose `data.owner_id` equals this value.
    pub owner_id: Option<String>,
    /// Inclusive lower bound.
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound.
    pub until: Option<DateTime<Utc>>,
    /// Maximum number of entries returned. Falls back to the configured default.
    pub limit: Option<usize>,
}

impl AuditFilter {
    pub fn level(mut self, level: AuditLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn matches(&self, entry: &AuditEntry) -> bool {
        if self.level.is_some_and(|l| l != entry.level) {
            return false;
        }
        if let Some(owner) = &self.owner_id
            && entry.data.get("owner_id").and_then(|v| v.as_str()) != Some(owner.as_str())
        {
            return false;
        }
        if self.since.is_some_and(|s| entry.timestamp < s) {
            return false;
        }
        if self.until.is_some_and(|u| entry.timestamp > u) {
            return false;
        }
        true
    }
}

/// Outcome of replaying the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub valid: bool,
    /// Index of the first entry whose hash or linkage diverges.
    pub first_invalid: Option<usize>,
    /// Number of entries examined.
    pub checked: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> AuditEntry {
        let timestamp = Utc::now();
        let data = json!({"owner_id": "u1", "secret_id": "s1"});
        let hash = chain_hash(GENESIS_HASH, &timestamp, AuditLevel::Info, "secret accessed", &data);
        AuditEntry {
            id: "e1".into(),
            timestamp,
            level: AuditLevel::Info,
            message: "secret accessed".into(),
            data,
            hash,
            previous_hash: None,
        }
    }

    #[test]
    fn genesis_is_64_zeros() {
        assert_eq!(GENESIS_HASH.len(), 64);
        assert!(GENESIS_HASH.chars().all(|c| c == '0'));
    }

    #[test]
    fn hash_is_deterministic_hex() {
        let entry = sample();
        assert_eq!(entry.compute_hash(GENESIS_HASH), entry.hash);
        assert_eq!(entry.hash.len(), 64);
    }

    #[test]
    fn hash_depends_on_previous_and_content() {
        let entry = sample();
        assert_ne!(entry.compute_hash(&"1".repeat(64)), entry.hash);

        let mut changed = entry.clone();
        changed.message = "secret deleted".into();
        assert_ne!(changed.compute_hash(GENESIS_HASH), entry.hash);

        let mut relevel = entry.clone();
        relevel.level = AuditLevel::Warn;
        assert_ne!(relevel.compute_hash(GENESIS_HASH), entry.hash);
    }

    #[test]
    fn hash_survives_json_roundtrip() {
        let entry = sample();
        let json = serde_json::to_string(&entry).unwrap();
        let back: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.compute_hash(GENESIS_HASH), entry.hash);
    }

    #[test]
    fn external_shape_omits_previous_hash_when_unset() {
        let value = serde_json::to_value(sample()).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["data", "hash", "id", "level", "message", "timestamp"]);
        assert_eq!(value["level"], "info");
    }

    #[test]
    fn filter_matches_owner_in_data() {
        let entry = sample();
        assert!(AuditFilter::default().owner("u1").matches(&entry));
        assert!(!AuditFilter::default().owner("u2").matches(&entry));
        assert!(!AuditFilter::default().level(AuditLevel::Error).matches(&entry));
    }
}
