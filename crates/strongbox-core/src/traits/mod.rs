// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits the core consumes but does not own.

pub mod probe;
pub mod repository;
pub mod schema;

pub use probe::ConnectivityProbe;
pub use repository::SecretRepository;
pub use schema::{FieldSpec, ProbeSpec, ProviderSchema, SchemaRegistry};
