// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master passphrase acquisition via TTY prompt or `STRONGBOX_MASTER_KEY`.

use secrecy::SecretString;
use strongbox_core::StrongboxError;

/// Environment variable carrying the master passphrase.
pub const MASTER_KEY_ENV_VAR: &str = "STRONGBOX_MASTER_KEY";

const NO_SOURCE: &str =
    "no master passphrase provided; set STRONGBOX_MASTER_KEY or run interactively";

fn from_env() -> Option<SecretString> {
    match std::env::var(MASTER_KEY_ENV_VAR) {
        Ok(key) if !key.is_empty() => Some(SecretString::from(key)),
        _ => None,
    }
}

fn read_line(prompt: &str) -> Result<String, StrongboxError> {
    eprint!("{prompt}");
    rpassword::read_password()
        .map_err(|e| StrongboxError::Config(format!("failed to read passphrase: {e}")))
}

/// Get the master passphrase from the environment, falling back to a TTY prompt.
pub fn get_master_passphrase() -> Result<SecretString, StrongboxError> {
    if let Some(key) = from_env() {
        return Ok(key);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let passphrase = read_line("Master passphrase: ")?;
        if passphrase.is_empty() {
            return Err(StrongboxError::Config("empty passphrase not allowed".to_string()));
        }
        return Ok(SecretString::from(passphrase));
    }

    Err(StrongboxError::Config(NO_SOURCE.to_string()))
}

/// Like [`get_master_passphrase`] but prompts twice on a TTY.
pub fn get_master_passphrase_with_confirm() -> Result<SecretString, StrongboxError> {
    if let Some(key) = from_env() {
        return Ok(key);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let first = zeroize::Zeroizing::new(read_line("New master passphrase: ")?);
        let second = zeroize::Zeroizing::new(read_line("Confirm master passphrase: ")?);
        if *first != *second {
            return Err(StrongboxError::Config("passphrases do not match".to_string()));
        }
        if first.is_empty() {
            return Err(StrongboxError::Config("empty passphrase not allowed".to_string()));
        }
        return Ok(SecretString::from(first.to_string()));
    }

    Err(StrongboxError::Config(NO_SOURCE.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    #[test]
    #[serial]
    fn passphrase_from_env_var() {
        // SAFETY: env mutation is serialized across tests.
        unsafe { std::env::set_var(MASTER_KEY_ENV_VAR, "test-passphrase") };
        let result = get_master_passphrase();
        unsafe { std::env::remove_var(MASTER_KEY_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "test-passphrase");
    }

    #[test]
    #[serial]
    fn confirm_variant_accepts_env_var() {
        unsafe { std::env::set_var(MASTER_KEY_ENV_VAR, "test-passphrase") };
        let result = get_master_passphrase_with_confirm();
        unsafe { std::env::remove_var(MASTER_KEY_ENV_VAR) };

        assert!(result.is_ok());
    }

    #[test]
    #[serial]
    fn empty_env_var_is_ignored() {
        unsafe { std::env::set_var(MASTER_KEY_ENV_VAR, "") };
        let from_env = from_env();
        unsafe { std::env::remove_var(MASTER_KEY_ENV_VAR) };

        assert!(from_env.is_none());
    }
}
