// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Strongbox secrets core.
//!
//! Error payloads carry contextual identifiers only. Secret values, ciphertext
//! and passphrases must never be formatted into any variant.

use strum::Display;
use thiserror::Error;

/// The kind of resource a [`StrongboxError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
    Secret,
    Session,
    Pool,
    Provider,
}

/// The primary error type used across all Strongbox services.
#[derive(Debug, Error)]
pub enum StrongboxError {
    /// Missing, unknown or malformed input field.
    #[error("validation error on `{field}`: {message}")]
    Validation { field: String, message: String },

    /// Ownership or session check failed.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Secret, session, pool or provider schema is absent.
    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: String },

    /// Authentication tag mismatch or malformed ciphertext blob.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Secret strength is below the configured policy threshold.
    #[error("secret too weak: score {score} is below the required {minimum}")]
    WeakSecret { score: u8, minimum: u8 },

    /// No healthy or active key remained after the self-healing fallback.
    #[error("rotation exhausted: no usable key for provider {provider}")]
    RotationExhausted { provider: String },

    /// Connectivity probe against a provider failed.
    #[error("connectivity probe failed: {0}")]
    Probe(String),

    /// Configuration errors (invalid values, unreadable files).
    #[error("configuration error: {0}")]
    Config(String),

    /// Repository backend errors.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StrongboxError {
    /// Shorthand for a [`StrongboxError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`StrongboxError::NotFound`] error.
    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Stable machine-readable code, used in audit data and structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::AccessDenied(_) => "access_denied",
            Self::NotFound { .. } => "not_found",
            Self::Decryption(_) => "decryption_error",
            Self::WeakSecret { .. } => "weak_secret",
            Self::RotationExhausted { .. } => "rotation_exhausted",
            Self::Probe(_) => "probe_failed",
            Self::Config(_) => "config_error",
            Self::Storage { .. } => "storage_error",
            Self::Timeout { .. } => "timeout",
            Self::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_renders_kind_and_id() {
        let err = StrongboxError::not_found(ResourceKind::Secret, "abc");
        assert_eq!(err.to_string(), "secret not found: abc");
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn validation_renders_field() {
        let err = StrongboxError::validation("apiKey", "does not match the expected format");
        assert_eq!(
            err.to_string(),
            "validation error on `apiKey`: does not match the expected format"
        );
    }

    #[test]
    fn weak_secret_reports_scores() {
        let err = StrongboxError::WeakSecret {
            score: 12,
            minimum: 40,
        };
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains("40"));
        assert_eq!(err.code(), "weak_secret");
    }
}
