// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connectivity probe contract for checking freshly added keys.

use std::collections::BTreeMap;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::StrongboxError;
use crate::traits::schema::ProviderSchema;

/// Checks that a set of plaintext fields authenticates against its provider.
///
/// Callers bound every probe with a timeout and treat any error as a
/// non-fatal `failed` outcome.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync + 'static {
    async fn probe(
        &self,
        schema: &ProviderSchema,
        fields: &BTreeMap<String, SecretString>,
    ) -> Result<(), StrongboxError>;
}
