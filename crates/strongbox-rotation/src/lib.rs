// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key rotation engine for Strongbox.
//!
//! Keeps one pool of secret ids per provider, tracks per-key health, and
//! picks the next key by round-robin, least-used, random, or weighted
//! selection. Callers pass the current active/inactive state of the pool's
//! secrets on every selection; the engine never reads the store itself.

pub mod engine;
pub mod health;

pub use engine::{KeyRotationEngine, PoolStats, RotationCandidate};
pub use health::KeyHealth;
