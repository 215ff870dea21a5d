// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as KDF cost floors and non-zero timeouts.

use crate::diagnostic::ConfigError;
use crate::model::StrongboxConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of stopping at the first one.
pub fn validate_config(config: &StrongboxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "logging.level `{}` must be one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        )));
    }

    let vault = &config.vault;
    if vault.kdf_memory_cost < 32768 {
        errors.push(ConfigError::validation(format!(
            "vault.kdf_memory_cost must be at least 32768 (32 MiB), got {}",
            vault.kdf_memory_cost
        )));
    }
    if vault.kdf_iterations < 2 {
        errors.push(ConfigError::validation(format!(
            "vault.kdf_iterations must be at least 2, got {}",
            vault.kdf_iterations
        )));
    }
    if vault.kdf_parallelism < 1 {
        errors.push(ConfigError::validation(format!(
            "vault.kdf_parallelism must be at least 1, got {}",
            vault.kdf_parallelism
        )));
    }

    if config.session.timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "session.timeout_secs must be greater than 0",
        ));
    }
    if let Some(max) = config.session.max_lifetime_secs
        && max < config.session.timeout_secs
    {
        errors.push(ConfigError::validation(format!(
            "session.max_lifetime_secs ({max}) must not be shorter than session.timeout_secs ({})",
            config.session.timeout_secs
        )));
    }

    if config.rotation.failure_threshold == 0 {
        errors.push(ConfigError::validation(
            "rotation.failure_threshold must be at least 1",
        ));
    }

    if config.audit.max_entries < 2 {
        errors.push(ConfigError::validation(format!(
            "audit.max_entries must be at least 2, got {}",
            config.audit.max_entries
        )));
    }
    if config.audit.default_query_limit == 0 {
        errors.push(ConfigError::validation(
            "audit.default_query_limit must be greater than 0",
        ));
    }

    if config.store.probe_timeout_ms == 0 {
        errors.push(ConfigError::validation(
            "store.probe_timeout_ms must be greater than 0",
        ));
    }
    if config.store.min_credential_strength > 100 {
        errors.push(ConfigError::validation(format!(
            "store.min_credential_strength must be between 0 and 100, got {}",
            config.store.min_credential_strength
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&StrongboxConfig::default()).is_ok());
    }

    #[test]
    fn weak_kdf_parameters_fail_validation() {
        let mut config = StrongboxConfig::default();
        config.vault.kdf_memory_cost = 1024;
        config.vault.kdf_iterations = 1;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "kdf_memory_cost"));
        assert!(has_message(&errors, "kdf_iterations"));
    }

    #[test]
    fn lifetime_shorter_than_timeout_fails() {
        let mut config = StrongboxConfig::default();
        config.session.timeout_secs = 600;
        config.session.max_lifetime_secs = Some(300);
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "max_lifetime_secs"));
    }

    #[test]
    fn zero_failure_threshold_fails() {
        let mut config = StrongboxConfig::default();
        config.rotation.failure_threshold = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "failure_threshold"));
    }

    #[test]
    fn unknown_log_level_fails() {
        let mut config = StrongboxConfig::default();
        config.logging.level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "logging.level"));
    }

    #[test]
    fn collects_every_violation() {
        let mut config = StrongboxConfig::default();
        config.session.timeout_secs = 0;
        config.store.probe_timeout_ms = 0;
        config.audit.default_query_limit = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn parsed_toml_is_validated() {
        let config: StrongboxConfig = toml::from_str(
            r#"
            [vault]
            kdf_memory_cost = 1024

            [rotation]
            failure_threshold = 0
            "#,
        )
        .unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn unknown_toml_key_is_rejected() {
        let parsed: Result<StrongboxConfig, _> = toml::from_str("[vault]\nkdf_memroy_cost = 65536\n");
        assert!(parsed.is_err());
    }
}
