// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inputs and sanitized views exchanged with [`crate::SecretStore`] callers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;
use strongbox_core::{SecretKind, SecretMetadata, StoredSecret};
use strongbox_vault::DecryptedField;

/// A new secret to store. Field values are plaintext until encrypted by the store.
#[derive(Debug)]
pub struct SecretInput {
    pub kind: SecretKind,
    /// Provider id for API keys, domain for credentials.
    pub provider_id: String,
    pub name: String,
    pub fields: BTreeMap<String, SecretString>,
    pub tags: Vec<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub notes: Option<String>,
    /// Run the provider's connectivity probe after storing.
    pub test_connection: bool,
}

impl SecretInput {
    pub fn api_key(provider_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(SecretKind::ApiKey, provider_id, name)
    }

    pub fn credential(domain: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(SecretKind::Credential, domain, name)
    }

    fn new(kind: SecretKind, provider_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            provider_id: provider_id.into(),
            name: name.into(),
            fields: BTreeMap::new(),
            tags: Vec::new(),
            url: None,
            username: None,
            notes: None,
            test_connection: false,
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .insert(name.into(), SecretString::from(value.into()));
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn test_connection(mut self) -> Self {
        self.test_connection = true;
        self
    }
}

/// Partial update. `None` leaves the attribute unchanged; only the listed
/// fields are re-encrypted.
#[derive(Debug, Default)]
pub struct SecretUpdate {
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub notes: Option<String>,
    pub active: Option<bool>,
    pub fields: BTreeMap<String, SecretString>,
}

impl SecretUpdate {
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .insert(name.into(), SecretString::from(value.into()));
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Attribute names this update touches, for audit data.
    pub(crate) fn changed(&self) -> Vec<String> {
        let mut changed: Vec<String> = [
            ("name", self.name.is_some()),
            ("tags", self.tags.is_some()),
            ("url", self.url.is_some()),
            ("username", self.username.is_some()),
            ("notes", self.notes.is_some()),
            ("active", self.active.is_some()),
        ]
        .into_iter()
        .filter(|(_, set)| *set)
        .map(|(name, _)| name.to_string())
        .collect();
        changed.extend(self.fields.keys().map(|k| format!("fields.{k}")));
        changed
    }
}

/// List filters. All set filters must match.
#[derive(Debug, Clone, Default)]
pub struct SecretFilter {
    /// Case-insensitive substring over name, url, username, and tags.
    pub search: Option<String>,
    /// Exact provider id.
    pub provider_id: Option<String>,
    pub kind: Option<SecretKind>,
    pub active_only: bool,
}

impl SecretFilter {
    pub fn search(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }

    pub fn provider(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    pub fn kind(mut self, kind: SecretKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn active_only(mut self) -> Self {
        self.active_only = true;
        self
    }

    pub(crate) fn matches(&self, secret: &StoredSecret) -> bool {
        if self.active_only && !secret.active {
            return false;
        }
        if self.kind.is_some_and(|k| k != secret.kind) {
            return false;
        }
        if self
            .provider_id
            .as_ref()
            .is_some_and(|p| *p != secret.provider_id)
        {
            return false;
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let meta = &secret.metadata;
            let hit = secret.name.to_lowercase().contains(&needle)
                || meta
                    .url
                    .as_ref()
                    .is_some_and(|u| u.to_lowercase().contains(&needle))
                || meta
                    .username
                    .as_ref()
                    .is_some_and(|u| u.to_lowercase().contains(&needle))
                || meta
                    .tags
                    .iter()
                    .any(|t| t.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// A stored secret without any field values, safe to list and log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretSummary {
    pub id: String,
    pub kind: SecretKind,
    pub provider_id: String,
    pub name: String,
    /// Names of the encrypted fields. Values are never included.
    pub field_names: Vec<String>,
    pub active: bool,
    pub usage_count: u64,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub metadata: SecretMetadata,
}

impl From<&StoredSecret> for SecretSummary {
    fn from(secret: &StoredSecret) -> Self {
        Self {
            id: secret.id.clone(),
            kind: secret.kind,
            provider_id: secret.provider_id.clone(),
            name: secret.name.clone(),
            field_names: secret.fields.keys().cloned().collect(),
            active: secret.active,
            usage_count: secret.usage_count,
            last_used_at: secret.last_used_at,
            created_at: secret.created_at,
            updated_at: secret.updated_at,
            metadata: secret.metadata.clone(),
        }
    }
}

/// A secret decrypted on demand by `get`.
#[derive(Debug)]
pub struct RevealedSecret {
    pub summary: SecretSummary,
    pub fields: BTreeMap<String, DecryptedField>,
}

impl RevealedSecret {
    /// Plaintext of `name`, or `None` if absent or unreadable.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(DecryptedField::expose)
    }

    /// Names of fields that failed to decrypt.
    pub fn unreadable(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, f)| f.is_unreadable())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> StoredSecret {
        let now = Utc::now();
        StoredSecret {
            id: "s1".into(),
            owner_id: "alice".into(),
            kind: SecretKind::Credential,
            provider_id: "github.com".into(),
            name: "Work GitHub".into(),
            fields: BTreeMap::from([("password".to_string(), "blob".to_string())]),
            active: true,
            usage_count: 0,
            last_used_at: None,
            created_at: now,
            updated_at: now,
            metadata: SecretMetadata {
                tags: vec!["Work".into()],
                url: Some("https://GitHub.com/login".into()),
                username: Some("octocat".into()),
                ..SecretMetadata::default()
            },
        }
    }

    #[test]
    fn search_is_case_insensitive_over_descriptors() {
        let s = stored();
        assert!(SecretFilter::default().search("github.COM").matches(&s));
        assert!(SecretFilter::default().search("OCTO").matches(&s));
        assert!(SecretFilter::default().search("work").matches(&s));
        assert!(!SecretFilter::default().search("gitlab").matches(&s));
    }

    #[test]
    fn provider_filter_is_exact() {
        let s = stored();
        assert!(SecretFilter::default().provider("github.com").matches(&s));
        assert!(!SecretFilter::default().provider("github").matches(&s));
    }

    #[test]
    fn kind_and_active_filters() {
        let mut s = stored();
        assert!(!SecretFilter::default().kind(SecretKind::ApiKey).matches(&s));
        s.active = false;
        assert!(!SecretFilter::default().active_only().matches(&s));
        assert!(SecretFilter::default().matches(&s));
    }

    #[test]
    fn summary_carries_no_blobs() {
        let summary = SecretSummary::from(&stored());
        assert_eq!(summary.field_names, ["password"]);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("blob"));
    }

    #[test]
    fn update_lists_changes() {
        let update = SecretUpdate::default().active(false).field("apiKey", "x");
        assert_eq!(update.changed(), ["active", "fields.apiKey"]);
    }
}
