// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory provider schema registry.

use std::collections::HashMap;
use std::sync::RwLock;

use strongbox_core::{
    FieldSpec, ProbeSpec, ProviderSchema, SchemaRegistry, SecretKind, StrongboxError,
};

/// Schema registry backed by a map, pre-loadable with common providers.
#[derive(Debug, Default)]
pub struct InMemorySchemaRegistry {
    schemas: RwLock<HashMap<String, ProviderSchema>>,
}

impl InMemorySchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with [`builtin_schemas`].
    pub fn with_builtin_providers() -> Result<Self, StrongboxError> {
        let registry = Self::new();
        for schema in builtin_schemas()? {
            registry.register(schema);
        }
        Ok(registry)
    }

    /// Add or replace a schema.
    pub fn register(&self, schema: ProviderSchema) {
        self.schemas
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(schema.id.clone(), schema);
    }
}

impl SchemaRegistry for InMemorySchemaRegistry {
    fn schema(&self, provider_id: &str) -> Option<ProviderSchema> {
        self.schemas
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(provider_id)
            .cloned()
    }

    fn providers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .schemas
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

fn api_key_schema(
    id: &str,
    display_name: &str,
    fields: Vec<FieldSpec>,
    probe: Option<ProbeSpec>,
) -> ProviderSchema {
    ProviderSchema {
        id: id.to_string(),
        display_name: display_name.to_string(),
        kind: SecretKind::ApiKey,
        fields,
        probe,
    }
}

/// Schemas for a handful of widely used API providers.
pub fn builtin_schemas() -> Result<Vec<ProviderSchema>, StrongboxError> {
    Ok(vec![
        api_key_schema(
            "openai",
            "OpenAI",
            vec![
                FieldSpec::required("apiKey", "API Key").with_format("sk-[A-Za-z0-9]{48}")?,
                FieldSpec::optional("organizationId", "Organization ID")
                    .with_format("org-[A-Za-z0-9]+")?,
            ],
            Some(ProbeSpec::bearer("https://api.openai.com/v1/models", "apiKey")),
        ),
        api_key_schema(
            "anthropic",
            "Anthropic",
            vec![FieldSpec::required("apiKey", "API Key").with_format("sk-ant-[A-Za-z0-9_-]{20,}")?],
            Some(ProbeSpec {
                url: "https://api.anthropic.com/v1/models".to_string(),
                auth_field: "apiKey".to_string(),
                header: "x-api-key".to_string(),
                prefix: String::new(),
            }),
        ),
        api_key_schema(
            "github",
            "GitHub",
            vec![FieldSpec::required("token", "Personal Access Token")
                .with_format("gh[pousr]_[A-Za-z0-9]{36}")?],
            Some(ProbeSpec::bearer("https://api.github.com/user", "token")),
        ),
        api_key_schema(
            "stripe",
            "Stripe",
            vec![
                FieldSpec::required("secretKey", "Secret Key")
                    .with_format("sk_(live|test)_[A-Za-z0-9]{24,}")?,
                FieldSpec::optional("publishableKey", "Publishable Key")
                    .with_format("pk_(live|test)_[A-Za-z0-9]{24,}")?,
            ],
            Some(ProbeSpec::bearer("https://api.stripe.com/v1/balance", "secretKey")),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_load() {
        let registry = InMemorySchemaRegistry::with_builtin_providers().unwrap();
        assert_eq!(registry.providers(), ["anthropic", "github", "openai", "stripe"]);
    }

    #[test]
    fn openai_key_format() {
        let registry = InMemorySchemaRegistry::with_builtin_providers().unwrap();
        let schema = registry.schema("openai").unwrap();
        let field = schema.field("apiKey").unwrap();
        assert!(field.accepts(&format!("sk-{}", "a".repeat(48))));
        assert!(!field.accepts("bad"));
        assert!(!field.accepts(&format!("sk-{}", "a".repeat(47))));
    }

    #[test]
    fn register_replaces() {
        let registry = InMemorySchemaRegistry::new();
        registry.register(ProviderSchema::login("example.com"));
        let mut replaced = ProviderSchema::login("example.com");
        replaced.display_name = "Example".into();
        registry.register(replaced);
        assert_eq!(registry.schema("example.com").unwrap().display_name, "Example");
        assert!(registry.schema("missing").is_none());
    }
}
