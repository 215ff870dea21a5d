// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Strongbox secrets core.
//!
//! Reads `strongbox.toml` from `/etc/strongbox`, the XDG config directory and the working
//! directory, applies `STRONGBOX_*` environment overrides, and rejects unknown
//! keys. Errors render as miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use strongbox_config::load_and_validate;
//!
//! let config = load_and_validate().expect("invalid strongbox configuration");
//! println!("session timeout: {}s", config.session.timeout_secs);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{ChainMode, ReadMode, StrongboxConfig};

/// Load `strongbox.toml` plus environment overrides, then validate.
pub fn load_and_validate() -> Result<StrongboxConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<StrongboxConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read every config file in the hierarchy so diagnostics can show source spans.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = vec![std::path::PathBuf::from("/etc/strongbox/strongbox.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("strongbox/strongbox.toml"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("strongbox.toml"));
    }

    candidates
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            Some((path.display().to_string(), content))
        })
        .collect()
}
