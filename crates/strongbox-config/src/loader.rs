// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./strongbox.toml` > `~/.config/strongbox/strongbox.toml` >
//! `/etc/strongbox/strongbox.toml` with environment variable overrides via `STRONGBOX_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::StrongboxConfig;

/// Environment variable prefix for config overrides.
pub const ENV_PREFIX: &str = "STRONGBOX_";

/// Config sections that env keys are split on, in match order.
const SECTIONS: &[&str] = &["logging", "vault", "session", "rotation", "audit", "store"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/strongbox/strongbox.toml` (system-wide)
/// 3. `~/.config/strongbox/strongbox.toml` (user XDG config)
/// 4. `./strongbox.toml` (local directory)
/// 5. `STRONGBOX_*` environment variables
pub fn load_config() -> Result<StrongboxConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<StrongboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StrongboxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StrongboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StrongboxConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(StrongboxConfig::default()))
        .merge(Toml::file("/etc/strongbox/strongbox.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("strongbox/strongbox.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("strongbox.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `STRONGBOX_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `STRONGBOX_VAULT_KDF_MEMORY_COST` maps to `vault.kdf_memory_cost`.
/// `STRONGBOX_MASTER_KEY` is the passphrase variable and never a config key.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
        .ignore(&["master_key"])
        .map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
