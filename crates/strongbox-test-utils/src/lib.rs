// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Strongbox integration tests.
//!
//! Provides a mock connectivity probe and a harness that wires every service
//! together with in-memory collaborators and cheap key derivation.
//!
//! # Components
//!
//! - [`TestHarness`] - Fully assembled store, gate, rotation engine and audit ledger
//! - [`MockProbe`] - Connectivity probe with scripted outcomes

pub mod harness;
pub mod mock_probe;

pub use harness::{TestHarness, TestHarnessBuilder, openai_key};
pub use mock_probe::MockProbe;
