// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only, hash-chained audit ledger.
//!
//! Every entry's hash covers the hash before it, so editing, dropping or
//! reordering a stored entry breaks the chain from that point on. The chain
//! starts at an anchor: [`GENESIS_HASH`] for a fresh ledger, or the hash of
//! the last entry removed by [`AuditLedger::clear`] or retention trimming.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde_json::json;
use strongbox_config::ChainMode;
use strongbox_config::model::AuditConfig;
use strongbox_core::StrongboxError;
use tracing::{debug, error, info, warn};

use crate::entry::{
    AuditEntry, AuditFilter, AuditLevel, GENESIS_HASH, IntegrityReport, chain_hash,
};

struct LedgerState {
    entries: Vec<AuditEntry>,
    /// Hash the first retained entry was chained to.
    anchor: String,
    /// Hash of the newest entry, or the anchor when empty.
    head: String,
}

/// Synchronous, ordered audit sink shared by every service.
pub struct AuditLedger {
    state: Mutex<LedgerState>,
    mode: ChainMode,
    max_entries: usize,
    default_limit: usize,
}

impl std::fmt::Debug for AuditLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLedger")
            .field("mode", &self.mode)
            .field("len", &self.len())
            .finish()
    }
}

impl Default for AuditLedger {
    fn default() -> Self {
        Self::new(&AuditConfig::default())
    }
}

impl AuditLedger {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                entries: Vec::new(),
                anchor: GENESIS_HASH.to_string(),
                head: GENESIS_HASH.to_string(),
            }),
            mode: config.chain_mode,
            max_entries: config.max_entries.max(1),
            default_limit: config.default_query_limit,
        }
    }

    pub fn chain_mode(&self) -> ChainMode {
        self.mode
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        // A panic while holding the lock cannot leave a half-appended entry:
        // entries are pushed fully formed.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Hash, store and return a new entry, advancing the chain head.
    pub fn append(
        &self,
        level: AuditLevel,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> AuditEntry {
        let mut state = self.lock();
        let entry = self.push(&mut state, level, message.into(), data);
        drop(state);

        emit(&entry);
        entry
    }

    /// Hash and store one entry under the caller's lock.
    fn push(
        &self,
        state: &mut LedgerState,
        level: AuditLevel,
        message: String,
        data: serde_json::Value,
    ) -> AuditEntry {
        let timestamp = Utc::now();
        let hash = chain_hash(&state.head, &timestamp, level, &message, &data);
        let entry = AuditEntry {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            level,
            message,
            data,
            hash: hash.clone(),
            previous_hash: match self.mode {
                ChainMode::Linked => Some(state.head.clone()),
                ChainMode::Replay => None,
            },
        };
        state.entries.push(entry.clone());
        state.head = hash;

        if state.entries.len() > self.max_entries {
            let excess = state.entries.len() - self.max_entries;
            let removed: Vec<_> = state.entries.drain(..excess).collect();
            if let Some(last) = removed.last() {
                state.anchor = last.hash.clone();
            }
            debug!(trimmed = excess, "audit retention cap reached");
        }
        entry
    }

    /// Entries matching `filter`, newest first, capped at the filter limit
    /// or the configured default.
    pub fn query(&self, filter: &AuditFilter) -> Vec<AuditEntry> {
        let limit = filter.limit.unwrap_or(self.default_limit);
        let state = self.lock();
        let mut matched: Vec<AuditEntry> = state
            .entries
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        drop(state);

        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched.truncate(limit);
        matched
    }

    /// Replay the chain from its anchor and report the first divergence.
    pub fn verify_integrity(&self) -> IntegrityReport {
        let state = self.lock();
        verify_chain(&state.entries, &state.anchor, self.mode)
    }

    /// Record the clear itself, then drop everything before that record.
    ///
    /// The retained record and the anchor it was hashed against keep the
    /// chain verifiable; the ledger is never left empty.
    pub fn clear(&self, admin_id: &str, reason: &str) -> Result<AuditEntry, StrongboxError> {
        if admin_id.trim().is_empty() {
            return Err(StrongboxError::validation("admin_id", "must not be empty"));
        }
        let mut state = self.lock();
        let cleared = state.entries.len();
        let entry = self.push(
            &mut state,
            AuditLevel::Critical,
            "audit ledger cleared".to_string(),
            json!({
                "admin_id": admin_id,
                "reason": reason,
                "cleared_entries": cleared,
            }),
        );
        let pos = state.entries.len() - 1;
        let last_cleared = state.entries.drain(..pos).last();
        if let Some(last) = last_cleared {
            state.anchor = last.hash;
        }
        drop(state);

        emit(&entry);
        Ok(entry)
    }

    /// Snapshot of all retained entries in append order.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.lock().entries.clone()
    }

    /// Hash the oldest retained entry is chained to.
    pub fn anchor(&self) -> String {
        self.lock().anchor.clone()
    }

    /// Hash of the newest entry.
    pub fn head(&self) -> String {
        self.lock().head.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize the retained chain with its anchor for offline verification.
    pub fn export_json(&self) -> Result<String, StrongboxError> {
        let state = self.lock();
        serde_json::to_string_pretty(&json!({
            "anchor": state.anchor,
            "chain_mode": self.mode,
            "entries": state.entries,
        }))
        .map_err(|e| StrongboxError::Internal(format!("failed to export audit ledger: {e}")))
    }

    #[cfg(test)]
    pub(crate) fn tamper<F: FnOnce(&mut AuditEntry)>(&self, index: usize, f: F) {
        let mut state = self.lock();
        f(&mut state.entries[index]);
    }
}

/// Verify `entries` as a chain starting at `anchor`.
///
/// In replay mode each hash is recomputed against the running hash of the
/// entry before it. In linked mode each entry is also checked against its
/// own stored `previous_hash`, which must equal the hash of its predecessor.
pub fn verify_chain(entries: &[AuditEntry], anchor: &str, mode: ChainMode) -> IntegrityReport {
    let mut previous = anchor;
    for (index, entry) in entries.iter().enumerate() {
        let linked_ok = match mode {
            ChainMode::Replay => true,
            ChainMode::Linked => entry.previous_hash.as_deref() == Some(previous),
        };
        if !linked_ok || entry.compute_hash(previous) != entry.hash {
            return IntegrityReport {
                valid: false,
                first_invalid: Some(index),
                checked: index + 1,
            };
        }
        previous = &entry.hash;
    }
    IntegrityReport {
        valid: true,
        first_invalid: None,
        checked: entries.len(),
    }
}

/// Mirror an entry to tracing and metrics. Data carries ids only.
fn emit(entry: &AuditEntry) {
    metrics::counter!("strongbox_audit_entries_total", "level" => entry.level.to_string())
        .increment(1);
    match entry.level {
        AuditLevel::Info => info!(audit_id = %entry.id, data = %entry.data, "{}", entry.message),
        AuditLevel::Warn => warn!(audit_id = %entry.id, data = %entry.data, "{}", entry.message),
        AuditLevel::Error | AuditLevel::Critical => {
            error!(audit_id = %entry.id, level = %entry.level, data = %entry.data, "{}", entry.message)
        }
    }
}
