// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner to secret-id membership index.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Which owner may touch which secret. Pure in-memory lookup, no I/O.
#[derive(Debug, Default)]
pub struct AccessControlLedger {
    owners: RwLock<HashMap<String, HashSet<String>>>,
}

impl AccessControlLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, HashSet<String>>> {
        self.owners.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, HashSet<String>>> {
        self.owners.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Record `owner_id` as the owner of `secret_id`.
    pub fn grant(&self, owner_id: &str, secret_id: &str) {
        self.write()
            .entry(owner_id.to_string())
            .or_default()
            .insert(secret_id.to_string());
    }

    /// Remove the membership. Returns whether it existed.
    pub fn revoke(&self, owner_id: &str, secret_id: &str) -> bool {
        let mut owners = self.write();
        let Some(ids) = owners.get_mut(owner_id) else {
            return false;
        };
        let removed = ids.remove(secret_id);
        if ids.is_empty() {
            owners.remove(owner_id);
        }
        removed
    }

    pub fn owns(&self, owner_id: &str, secret_id: &str) -> bool {
        self.read()
            .get(owner_id)
            .is_some_and(|ids| ids.contains(secret_id))
    }

    /// Every secret id held by `owner_id`, sorted. Used by audits and tests;
    /// the store checks ownership through [`Self::owns`].
    pub fn secrets_of(&self, owner_id: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .read()
            .get(owner_id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    /// Whether any owner still references `secret_id`. Lets audits and tests
    /// confirm a deleted id left the index.
    pub fn is_referenced(&self, secret_id: &str) -> bool {
        self.read().values().any(|ids| ids.contains(secret_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_then_owns() {
        let acl = AccessControlLedger::new();
        acl.grant("alice", "s1");
        assert!(acl.owns("alice", "s1"));
        assert!(!acl.owns("bob", "s1"));
        assert!(!acl.owns("alice", "s2"));
    }

    #[test]
    fn revoke_removes_membership_once() {
        let acl = AccessControlLedger::new();
        acl.grant("alice", "s1");
        assert!(acl.revoke("alice", "s1"));
        assert!(!acl.revoke("alice", "s1"));
        assert!(!acl.owns("alice", "s1"));
        assert!(!acl.is_referenced("s1"));
    }

    #[test]
    fn secrets_of_is_sorted() {
        let acl = AccessControlLedger::new();
        for id in ["s3", "s1", "s2"] {
            acl.grant("alice", id);
        }
        assert_eq!(acl.secrets_of("alice"), ["s1", "s2", "s3"]);
        assert!(acl.secrets_of("nobody").is_empty());
    }
}
