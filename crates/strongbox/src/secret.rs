// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `strongbox generate` and `strongbox strength` command implementations.

use std::io::{BufRead, IsTerminal};

use secrecy::{ExposeSecret, SecretString};
use strongbox_core::StrongboxError;
use strongbox_store::{GeneratorOptions, StrengthReport, analyze_strength, generate_secret};
use zeroize::Zeroizing;

/// Print a freshly generated secret.
pub fn run_generate(options: &GeneratorOptions) -> Result<(), StrongboxError> {
    let secret = generate_secret(options)?;
    println!("{}", secret.expose_secret());
    Ok(())
}

/// Print the strength report for `value`, or for a secret read interactively.
pub fn run_strength(value: Option<String>) -> Result<(), StrongboxError> {
    let secret = match value {
        Some(v) => SecretString::from(v),
        None => read_secret("Secret: ")?,
    };
    let report = analyze_strength(secret.expose_secret());
    println!("{}", render_report(&report)?);
    Ok(())
}

pub fn render_report(report: &StrengthReport) -> Result<String, StrongboxError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| StrongboxError::Internal(format!("failed to render report: {e}")))
}

/// Read a secret without echo on a TTY, or one line from piped stdin.
pub fn read_secret(prompt: &str) -> Result<SecretString, StrongboxError> {
    let stdin = std::io::stdin();
    let line = if stdin.is_terminal() {
        Zeroizing::new(
            rpassword::prompt_password(prompt)
                .map_err(|e| StrongboxError::Config(format!("failed to read secret: {e}")))?,
        )
    } else {
        let mut line = Zeroizing::new(String::new());
        stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| StrongboxError::Config(format!("failed to read secret: {e}")))?;
        line
    };
    Ok(SecretString::from(line.trim_end_matches(['\r', '\n']).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_renders_as_json() {
        let rendered = render_report(&analyze_strength("abc")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert!(value["score"].is_u64());
        assert_eq!(value["label"], "very_weak");
    }

    #[test]
    fn rendered_report_omits_the_secret() {
        let rendered = render_report(&analyze_strength("Zq7#unique-value")).unwrap();
        assert!(!rendered.contains("unique-value"));
    }
}
