// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Strongbox secrets core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use strongbox_core::RotationStrategy;

/// Top-level Strongbox configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StrongboxConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Key derivation and field decryption settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Vault session lifetime settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Key rotation engine settings.
    #[serde(default)]
    pub rotation: RotationConfig,

    /// Audit ledger settings.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Secret store policy settings.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// How bulk field decryption reacts to a single undecryptable field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadMode {
    /// Failed fields come back as an unreadable marker; the rest still decrypt.
    #[default]
    Tolerant,
    /// The first failed field fails the whole read.
    Strict,
}

/// Vault key derivation and read configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_kdf_memory_cost")]
    pub kdf_memory_cost: u32,

    /// Argon2id iteration count (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Argon2id parallelism lanes (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,

    /// Default read mode for multi-field secrets.
    #[serde(default)]
    pub read_mode: ReadMode,

    /// Characters left visible by `mask` previews (default: 4).
    #[serde(default = "default_mask_visible_suffix")]
    pub mask_visible_suffix: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_memory_cost: default_kdf_memory_cost(),
            kdf_iterations: default_kdf_iterations(),
            kdf_parallelism: default_kdf_parallelism(),
            read_mode: ReadMode::default(),
            mask_visible_suffix: default_mask_visible_suffix(),
        }
    }
}

fn default_kdf_memory_cost() -> u32 {
    65536 // 64 MiB per OWASP recommendation
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_parallelism() -> u32 {
    4
}

fn default_mask_visible_suffix() -> usize {
    4
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Idle timeout in seconds; each successful verify slides expiry by this much (default: 900).
    #[serde(default = "default_session_timeout_secs")]
    pub timeout_secs: u64,

    /// Absolute lifetime ceiling in seconds regardless of activity (default: none).
    #[serde(default)]
    pub max_lifetime_secs: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_session_timeout_secs(),
            max_lifetime_secs: None,
        }
    }
}

fn default_session_timeout_secs() -> u64 {
    15 * 60
}

/// Key rotation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RotationConfig {
    /// Consecutive failures before a key is marked unhealthy (default: 3).
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Strategy used when a pool is created without an explicit one.
    #[serde(default)]
    pub default_strategy: RotationStrategy,

    /// Idle time after which a key regains full weighted-selection weight (default: 60).
    #[serde(default = "default_recency_window_secs")]
    pub recency_window_secs: u64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            default_strategy: RotationStrategy::default(),
            recency_window_secs: default_recency_window_secs(),
        }
    }
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_recency_window_secs() -> u64 {
    60
}

/// How audit entries are linked into a chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainMode {
    /// Only the ledger tracks the running previous hash; verification replays in order.
    #[default]
    Replay,
    /// Every entry also stores the hash it was chained onto.
    Linked,
}

/// Audit ledger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Chain linkage mode (default: replay).
    #[serde(default)]
    pub chain_mode: ChainMode,

    /// Retention cap; oldest entries are dropped beyond it (default: 10000).
    #[serde(default = "default_audit_max_entries")]
    pub max_entries: usize,

    /// Limit applied to queries that do not set one (default: 100).
    #[serde(default = "default_query_limit")]
    pub default_query_limit: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            chain_mode: ChainMode::default(),
            max_entries: default_audit_max_entries(),
            default_query_limit: default_query_limit(),
        }
    }
}

fn default_audit_max_entries() -> usize {
    10_000
}

fn default_query_limit() -> usize {
    100
}

/// Secret store policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Upper bound on a connectivity probe in milliseconds (default: 5000).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Minimum strength score for credential passwords, 0 disables (default: 40).
    #[serde(default = "default_min_credential_strength")]
    pub min_credential_strength: u8,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: default_probe_timeout_ms(),
            min_credential_strength: default_min_credential_strength(),
        }
    }
}

fn default_probe_timeout_ms() -> u64 {
    5000
}

fn default_min_credential_strength() -> u8 {
    40
}
