// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Short-lived session tokens gating vault operations.
//!
//! A token is issued on unlock and expires after a fixed idle timeout. Every
//! successful [`SessionManager::verify`] slides the deadline forward from
//! "now". Expired sessions are evicted lazily on lookup and are reported
//! exactly like tokens that never existed.

pub mod manager;

pub use manager::{SessionManager, TOKEN_BYTES};
