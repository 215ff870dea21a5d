// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider schema registry contract.
//!
//! Schemas are owned by an external registry and consumed read-only for
//! input validation and connectivity probing.

use regex::Regex;

use crate::error::StrongboxError;
use crate::types::SecretKind;

/// Declaration of a single input field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub required: bool,
    /// Optional format the value must match in full.
    pub format: Option<Regex>,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            required: true,
            format: None,
        }
    }

    pub fn optional(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            required: false,
            format: None,
        }
    }

    /// Attach a format regex. The pattern is anchored to the whole value.
    pub fn with_format(mut self, pattern: &str) -> Result<Self, StrongboxError> {
        let anchored = format!("^(?:{pattern})$");
        let regex = Regex::new(&anchored).map_err(|e| {
            StrongboxError::Config(format!("invalid format regex for `{}`: {e}", self.name))
        })?;
        self.format = Some(regex);
        Ok(self)
    }

    /// Whether `value` satisfies the declared format (always true without one).
    pub fn accepts(&self, value: &str) -> bool {
        self.format.as_ref().is_none_or(|re| re.is_match(value))
    }
}

/// How to check that a freshly added key actually works.
#[derive(Debug, Clone)]
pub struct ProbeSpec {
    /// Endpoint hit with an authenticated GET.
    pub url: String,
    /// Field whose plaintext is sent as the credential.
    pub auth_field: String,
    /// Header carrying the credential.
    pub header: String,
    /// Prefix placed before the credential, e.g. `Bearer `.
    pub prefix: String,
}

impl ProbeSpec {
    /// Bearer-token probe against `url` using `auth_field`.
    pub fn bearer(url: impl Into<String>, auth_field: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_field: auth_field.into(),
            header: "Authorization".to_string(),
            prefix: "Bearer ".to_string(),
        }
    }
}

/// Field definitions for one provider or login domain.
#[derive(Debug, Clone)]
pub struct ProviderSchema {
    pub id: String,
    pub display_name: String,
    pub kind: SecretKind,
    pub fields: Vec<FieldSpec>,
    pub probe: Option<ProbeSpec>,
}

impl ProviderSchema {
    /// Generic login schema used for credential domains without a registered schema.
    pub fn login(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            display_name: domain.clone(),
            id: domain,
            kind: SecretKind::Credential,
            fields: vec![
                FieldSpec::required("username", "Username"),
                FieldSpec::required("password", "Password"),
                FieldSpec::optional("url", "Login URL"),
                FieldSpec::optional("totp", "TOTP seed"),
            ],
            probe: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Read-only lookup of provider schemas.
pub trait SchemaRegistry: Send + Sync + 'static {
    /// Schema for `provider_id`, if registered.
    fn schema(&self, provider_id: &str) -> Option<ProviderSchema>;

    /// Ids of every registered provider.
    fn providers(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_anchored() {
        let spec = FieldSpec::required("apiKey", "API Key")
            .with_format("sk-[A-Za-z0-9]{4}")
            .unwrap();
        assert!(spec.accepts("sk-abcd"));
        assert!(!spec.accepts("xsk-abcd"));
        assert!(!spec.accepts("sk-abcde"));
    }

    #[test]
    fn field_without_format_accepts_anything() {
        let spec = FieldSpec::optional("orgId", "Organization");
        assert!(spec.accepts(""));
        assert!(spec.accepts("anything at all"));
    }

    #[test]
    fn invalid_regex_is_config_error() {
        let err = FieldSpec::required("x", "X").with_format("(").unwrap_err();
        assert!(matches!(err, StrongboxError::Config(_)));
    }

    #[test]
    fn login_schema_requires_username_and_password() {
        let schema = ProviderSchema::login("github.com");
        assert_eq!(schema.kind, SecretKind::Credential);
        assert!(schema.field("username").unwrap().required);
        assert!(schema.field("password").unwrap().required);
        assert!(!schema.field("url").unwrap().required);
    }

    proptest::proptest! {
        #[test]
        fn anchored_format_rejects_surrounding_text(
            body in "[A-Za-z0-9]{4}",
            extra in "[a-z ]{1,8}",
        ) {
            let spec = FieldSpec::required("apiKey", "API Key")
                .with_format("sk-[A-Za-z0-9]{4}")
                .unwrap();
            let value = format!("sk-{body}");
            proptest::prop_assert!(spec.accepts(&value));
            let prefixed = format!("{extra}{value}");
            let suffixed = format!("{value}{extra}");
            proptest::prop_assert!(!spec.accepts(&prefixed));
            proptest::prop_assert!(!spec.accepts(&suffixed));
        }
    }
}
