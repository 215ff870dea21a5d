// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tamper-evident audit ledger for Strongbox.
//!
//! Every sensitive operation in the store appends an entry here. Entries are
//! SHA-256 hash-chained from a sentinel anchor; [`AuditLedger::verify_integrity`]
//! replays the chain and reports the first entry that no longer matches.

pub mod entry;
pub mod ledger;

pub use entry::{AuditEntry, AuditFilter, AuditLevel, GENESIS_HASH, IntegrityReport};
pub use ledger::{AuditLedger, verify_chain};
