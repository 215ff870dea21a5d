// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Strongbox secrets core.
//!
//! Provides the error taxonomy, the persisted secret model, and the traits
//! for collaborators the core consumes but does not own: the secret
//! repository, the provider schema registry and the connectivity probe.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ResourceKind, StrongboxError};
pub use types::{RotationStrategy, SecretKind, SecretMetadata, StoredSecret, TestStatus};

pub use traits::{
    ConnectivityProbe, FieldSpec, ProbeSpec, ProviderSchema, SchemaRegistry, SecretRepository,
};
