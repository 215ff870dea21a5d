// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `strongbox seal` and `strongbox open` command implementations.
//!
//! Both derive the field key from the master passphrase (environment or
//! prompt) and a 16-byte salt passed as hex.

use secrecy::{ExposeSecret, SecretString};
use strongbox_config::StrongboxConfig;
use strongbox_core::StrongboxError;
use strongbox_vault::kdf::{self, SALT_LEN};
use strongbox_vault::{EncryptionCore, get_master_passphrase, get_master_passphrase_with_confirm};
use tracing::info;

use crate::secret::read_secret;

pub fn parse_salt(hex_salt: &str) -> Result<[u8; SALT_LEN], StrongboxError> {
    let bytes = hex::decode(hex_salt.trim())
        .map_err(|e| StrongboxError::validation("salt", format!("not valid hex: {e}")))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        StrongboxError::validation(
            "salt",
            format!("expected {SALT_LEN} bytes, got {}", b.len()),
        )
    })
}

/// Encrypt one value and print the blob. With no salt, a new one is
/// generated, the passphrase is confirmed, and the salt is printed to stderr.
pub fn run_seal(
    config: &StrongboxConfig,
    salt: Option<&str>,
    value: Option<String>,
) -> Result<(), StrongboxError> {
    let (salt, passphrase) = match salt {
        Some(hex_salt) => (parse_salt(hex_salt)?, get_master_passphrase()?),
        None => {
            let salt = kdf::generate_salt()?;
            eprintln!("salt: {}", hex::encode(salt));
            (salt, get_master_passphrase_with_confirm()?)
        }
    };
    let value = match value {
        Some(v) => SecretString::from(v),
        None => read_secret("Value to seal: ")?,
    };
    let blob = seal_value(config, &passphrase, &salt, &value)?;
    info!("value sealed");
    println!("{blob}");
    Ok(())
}

/// Decrypt a blob and print it, masked unless `reveal` is set.
pub fn run_open(
    config: &StrongboxConfig,
    salt: &str,
    blob: &str,
    reveal: bool,
) -> Result<(), StrongboxError> {
    let salt = parse_salt(salt)?;
    let passphrase = get_master_passphrase()?;
    let plaintext = open_blob(config, &passphrase, &salt, blob)?;
    if reveal {
        println!("{}", plaintext.expose_secret());
    } else {
        println!(
            "{}",
            strongbox_vault::mask(plaintext.expose_secret(), config.vault.mask_visible_suffix)
        );
    }
    Ok(())
}

pub fn seal_value(
    config: &StrongboxConfig,
    passphrase: &SecretString,
    salt: &[u8; SALT_LEN],
    value: &SecretString,
) -> Result<String, StrongboxError> {
    EncryptionCore::from_passphrase(passphrase, salt, &config.vault)?.encrypt(value.expose_secret())
}

pub fn open_blob(
    config: &StrongboxConfig,
    passphrase: &SecretString,
    salt: &[u8; SALT_LEN],
    blob: &str,
) -> Result<SecretString, StrongboxError> {
    EncryptionCore::from_passphrase(passphrase, salt, &config.vault)?.decrypt(blob.trim())
}
