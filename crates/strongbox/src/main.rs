// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strongbox - operator CLI for the secrets core.
//!
//! This is the binary entry point. Results go to stdout; logs and prompts go
//! to stderr.

mod seal;
mod secret;

use clap::{Args, Parser, Subcommand};
use strongbox_core::StrongboxError;

/// Strongbox - encrypted API key and credential vault.
#[derive(Parser, Debug)]
#[command(name = "strongbox", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a random secret.
    Generate(GenerateArgs),
    /// Score a secret's strength. Reads from a prompt or stdin when no value is given.
    Strength {
        value: Option<String>,
    },
    /// Encrypt a value under the master passphrase.
    Seal {
        /// Hex salt from a previous seal; a fresh one is generated and printed otherwise.
        #[arg(long)]
        salt: Option<String>,
        value: Option<String>,
    },
    /// Decrypt a sealed blob.
    Open {
        #[arg(long)]
        salt: String,
        blob: String,
        /// Print the full plaintext instead of a masked preview.
        #[arg(long)]
        reveal: bool,
    },
    /// Manage Strongbox configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Load and validate configuration, reporting every error.
    Check,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(long, default_value_t = 32)]
    length: usize,
    #[arg(long)]
    no_uppercase: bool,
    #[arg(long)]
    no_lowercase: bool,
    #[arg(long)]
    no_numbers: bool,
    #[arg(long)]
    no_symbols: bool,
    /// Leave out look-alike characters such as `l`, `1` and `O`.
    #[arg(long)]
    exclude_similar: bool,
}

fn main() {
    let cli = Cli::parse();

    let config = match strongbox_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            strongbox_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging.level);

    let result = match cli.command {
        Commands::Generate(args) => secret::run_generate(&args.into()),
        Commands::Strength { value } => secret::run_strength(value),
        Commands::Seal { salt, value } => seal::run_seal(&config, salt.as_deref(), value),
        Commands::Open { salt, blob, reveal } => seal::run_open(&config, &salt, &blob, reveal),
        Commands::Config {
            action: ConfigCommands::Check,
        } => {
            println!("config: valid");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("strongbox: {e}");
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(err: &StrongboxError) -> i32 {
    match err {
        StrongboxError::Validation { .. } | StrongboxError::Config(_) => 2,
        _ => 1,
    }
}

impl From<GenerateArgs> for strongbox_store::GeneratorOptions {
    fn from(args: GenerateArgs) -> Self {
        Self {
            length: args.length,
            include_uppercase: !args.no_uppercase,
            include_lowercase: !args.no_lowercase,
            include_numbers: !args.no_numbers,
            include_symbols: !args.no_symbols,
            exclude_similar: args.exclude_similar,
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let directives = [
        "strongbox",
        "strongbox_store",
        "strongbox_vault",
        "strongbox_rotation",
        "strongbox_session",
        "strongbox_audit",
    ]
    .iter()
    .map(|target| format!("{target}={log_level}"))
    .collect::<Vec<_>>()
    .join(",");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{directives},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = strongbox_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn generate_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "strongbox",
            "generate",
            "--length",
            "16",
            "--no-symbols",
            "--exclude-similar",
        ])
        .unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let options: strongbox_store::GeneratorOptions = args.into();
        assert_eq!(options.length, 16);
        assert!(!options.include_symbols);
        assert!(options.include_uppercase);
        assert!(options.exclude_similar);
    }

    #[test]
    fn open_requires_salt() {
        assert!(Cli::try_parse_from(["strongbox", "open", "blob"]).is_err());
        assert!(Cli::try_parse_from(["strongbox", "open", "--salt", "00", "blob"]).is_ok());
    }

    #[test]
    fn config_check_parses() {
        let cli = Cli::try_parse_from(["strongbox", "config", "check"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigCommands::Check
            }
        ));
    }

    #[test]
    fn validation_errors_exit_with_usage_code() {
        assert_eq!(exit_code(&StrongboxError::validation("length", "bad")), 2);
        assert_eq!(exit_code(&StrongboxError::Decryption("tag".into())), 1);
    }
}
