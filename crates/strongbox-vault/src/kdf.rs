// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from the master passphrase.
//!
//! Cost parameters come from `[vault]` config (OWASP-recommended defaults).
//! The derived key is deliberately expensive to compute and is derived once
//! per process.

use strongbox_config::model::VaultConfig;
use strongbox_core::StrongboxError;
use zeroize::Zeroizing;

use crate::crypto::{self, KEY_LEN};

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derive a 256-bit key from `passphrase` and `salt` using Argon2id v1.3.
///
/// The key is wrapped in [`Zeroizing`] so it is wiped on drop.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8; SALT_LEN],
    config: &VaultConfig,
) -> Result<Zeroizing<[u8; KEY_LEN]>, StrongboxError> {
    let params = argon2::Params::new(
        config.kdf_memory_cost,
        config.kdf_iterations,
        config.kdf_parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| StrongboxError::Config(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 = argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(passphrase, salt, output.as_mut())
        .map_err(|e| StrongboxError::Internal(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a fresh random salt. Persist it out-of-band next to the vault data.
pub fn generate_salt() -> Result<[u8; SALT_LEN], StrongboxError> {
    crypto::random_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lowest cost the config validator accepts, to keep tests fast.
    fn cheap() -> VaultConfig {
        VaultConfig {
            kdf_memory_cost: 32768,
            kdf_iterations: 2,
            kdf_parallelism: 1,
            ..VaultConfig::default()
        }
    }

    #[test]
    fn same_inputs_derive_same_key() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key(b"master passphrase", &salt, &cheap()).unwrap();
        let b = derive_key(b"master passphrase", &salt, &cheap()).unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn passphrase_and_salt_both_matter() {
        let base = derive_key(b"one", &[1u8; SALT_LEN], &cheap()).unwrap();
        let other_pass = derive_key(b"two", &[1u8; SALT_LEN], &cheap()).unwrap();
        let other_salt = derive_key(b"one", &[2u8; SALT_LEN], &cheap()).unwrap();
        assert_ne!(*base, *other_pass);
        assert_ne!(*base, *other_salt);
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let config = VaultConfig {
            kdf_parallelism: 0,
            ..cheap()
        };
        let err = derive_key(b"x", &[0u8; SALT_LEN], &config).unwrap_err();
        assert!(matches!(err, StrongboxError::Config(_)));
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }
}
