// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted secret store for Strongbox.
//!
//! [`SecretStore`] validates API keys and credentials against provider
//! schemas, encrypts every field, enforces ownership, and audits every
//! access. [`SessionGate`] puts it behind session tokens. Rotation pools,
//! secret generation and strength scoring hang off the same store.

pub mod access;
pub mod gate;
pub mod generator;
pub mod model;
pub mod probe;
pub mod registry;
pub mod repository;
pub mod store;
pub mod strength;

pub use access::AccessControlLedger;
pub use gate::SessionGate;
pub use generator::{GeneratorOptions, generate_secret};
pub use model::{RevealedSecret, SecretFilter, SecretInput, SecretSummary, SecretUpdate};
pub use probe::HttpProbe;
pub use registry::{InMemorySchemaRegistry, builtin_schemas};
pub use repository::InMemoryRepository;
pub use store::{SecretStore, SecretStoreBuilder, StoreSettings, pool_id};
pub use strength::{Requirements, StrengthLabel, StrengthReport, analyze_strength};
