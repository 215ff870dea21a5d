// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field-level encryption core.
//!
//! Each field value is sealed independently into the wire format
//! `base64(IV[16] || ciphertext || tag[16])`, so one field can be rewritten
//! without touching the rest of the record.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use strongbox_config::ReadMode;
use strongbox_config::model::VaultConfig;
use strongbox_core::StrongboxError;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::crypto::{self, KEY_LEN};
use crate::kdf::{self, SALT_LEN};

/// Result of decrypting one field during a bulk read.
#[derive(Debug)]
pub enum DecryptedField {
    Value(SecretString),
    /// The field failed authentication or was malformed. Callers must treat
    /// this as a failed read, never as an empty value.
    Unreadable,
}

impl DecryptedField {
    pub fn expose(&self) -> Option<&str> {
        match self {
            Self::Value(v) => Some(v.expose_secret()),
            Self::Unreadable => None,
        }
    }

    pub fn is_unreadable(&self) -> bool {
        matches!(self, Self::Unreadable)
    }
}

/// AES-256-GCM encryption keyed once per process.
pub struct EncryptionCore {
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl std::fmt::Debug for EncryptionCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionCore")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl EncryptionCore {
    /// Wrap an existing 256-bit key.
    pub fn from_key(key: [u8; KEY_LEN]) -> Self {
        Self {
            key: Zeroizing::new(key),
        }
    }

    /// Derive the key from the master passphrase and its persisted salt.
    pub fn from_passphrase(
        passphrase: &SecretString,
        salt: &[u8; SALT_LEN],
        config: &VaultConfig,
    ) -> Result<Self, StrongboxError> {
        let key = kdf::derive_key(passphrase.expose_secret().as_bytes(), salt, config)?;
        debug!("encryption key derived");
        Ok(Self { key })
    }

    /// Encrypt one value into a base64 blob.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, StrongboxError> {
        let sealed = crypto::seal(&self.key, plaintext.as_bytes())?;
        Ok(STANDARD.encode(sealed))
    }

    /// Verify and decrypt one base64 blob.
    pub fn decrypt(&self, blob: &str) -> Result<SecretString, StrongboxError> {
        let sealed = Zeroizing::new(
            STANDARD
                .decode(blob.trim())
                .map_err(|_| StrongboxError::Decryption("blob is not valid base64".to_string()))?,
        );
        let plaintext = crypto::open(&self.key, &sealed)?;
        let value = String::from_utf8(plaintext).map_err(|e| {
            let mut bytes = e.into_bytes();
            zeroize::Zeroize::zeroize(&mut bytes);
            StrongboxError::Decryption("decrypted value is not valid UTF-8".to_string())
        })?;
        Ok(SecretString::from(value))
    }

    /// Encrypt every field independently.
    pub fn encrypt_fields(
        &self,
        fields: &BTreeMap<String, SecretString>,
    ) -> Result<BTreeMap<String, String>, StrongboxError> {
        fields
            .iter()
            .map(|(name, value)| Ok((name.clone(), self.encrypt(value.expose_secret())?)))
            .collect()
    }

    /// Decrypt every field according to `mode`.
    ///
    /// Tolerant mode maps each failing field to [`DecryptedField::Unreadable`];
    /// strict mode returns the first failure, naming the field.
    pub fn decrypt_fields(
        &self,
        blobs: &BTreeMap<String, String>,
        mode: ReadMode,
    ) -> Result<BTreeMap<String, DecryptedField>, StrongboxError> {
        let mut out = BTreeMap::new();
        for (name, blob) in blobs {
            let field = match self.decrypt(blob) {
                Ok(value) => DecryptedField::Value(value),
                Err(e) => match mode {
                    ReadMode::Strict => {
                        return Err(StrongboxError::Decryption(format!("field `{name}`: {e}")));
                    }
                    ReadMode::Tolerant => {
                        warn!(field = %name, "field failed to decrypt");
                        DecryptedField::Unreadable
                    }
                },
            };
            out.insert(name.clone(), field);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn core() -> EncryptionCore {
        EncryptionCore::from_key(crypto::generate_random_key().unwrap())
    }

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, SecretString> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), SecretString::from(v.to_string())))
            .collect()
    }

    #[test]
    fn blob_decodes_to_iv_ciphertext_tag() {
        let blob = core().encrypt("abc").unwrap();
        let raw = STANDARD.decode(&blob).unwrap();
        assert_eq!(raw.len(), crypto::IV_LEN + 3 + crypto::TAG_LEN);
    }

    #[test]
    fn same_plaintext_gives_different_blobs() {
        let core = core();
        assert_ne!(core.encrypt("repeat").unwrap(), core.encrypt("repeat").unwrap());
    }

    #[test]
    fn flipping_any_byte_fails_decryption() {
        let core = core();
        let blob = core.encrypt("sk-important").unwrap();
        let raw = STANDARD.decode(&blob).unwrap();
        for i in 0..raw.len() {
            let mut tampered = raw.clone();
            tampered[i] ^= 0x01;
            let result = core.decrypt(&STANDARD.encode(&tampered));
            assert!(
                matches!(result, Err(StrongboxError::Decryption(_))),
                "byte {i} flip was not detected"
            );
        }
    }

    #[test]
    fn malformed_base64_is_decryption_error() {
        assert!(matches!(
            core().decrypt("not base64 !!!"),
            Err(StrongboxError::Decryption(_))
        ));
    }

    #[test]
    fn passphrase_core_is_deterministic_per_salt() {
        let config = VaultConfig {
            kdf_memory_cost: 32768,
            kdf_iterations: 2,
            kdf_parallelism: 1,
            ..VaultConfig::default()
        };
        let pass = SecretString::from("correct horse".to_string());
        let salt = [9u8; SALT_LEN];
        let a = EncryptionCore::from_passphrase(&pass, &salt, &config).unwrap();
        let b = EncryptionCore::from_passphrase(&pass, &salt, &config).unwrap();
        let blob = a.encrypt("shared").unwrap();
        assert_eq!(b.decrypt(&blob).unwrap().expose_secret(), "shared");
    }

    #[test]
    fn fields_roundtrip_independently() {
        let core = core();
        let blobs = core
            .encrypt_fields(&fields(&[("apiKey", "sk-1"), ("orgId", "org-9")]))
            .unwrap();
        assert_eq!(blobs.len(), 2);
        let plain = core.decrypt_fields(&blobs, ReadMode::Strict).unwrap();
        assert_eq!(plain["apiKey"].expose(), Some("sk-1"));
        assert_eq!(plain["orgId"].expose(), Some("org-9"));
    }

    #[test]
    fn tolerant_mode_isolates_bad_field() {
        let core = core();
        let mut blobs = core
            .encrypt_fields(&fields(&[("apiKey", "sk-1"), ("orgId", "org-9")]))
            .unwrap();
        blobs.insert("orgId".to_string(), "garbage".to_string());

        let plain = core.decrypt_fields(&blobs, ReadMode::Tolerant).unwrap();
        assert_eq!(plain["apiKey"].expose(), Some("sk-1"));
        assert!(plain["orgId"].is_unreadable());
    }

    #[test]
    fn strict_mode_fails_fast_naming_field() {
        let core = core();
        let mut blobs = core.encrypt_fields(&fields(&[("apiKey", "sk-1")])).unwrap();
        blobs.insert("orgId".to_string(), "garbage".to_string());

        let err = core.decrypt_fields(&blobs, ReadMode::Strict).unwrap_err();
        assert!(matches!(&err, StrongboxError::Decryption(m) if m.contains("orgId")));
    }

    #[test]
    fn debug_never_shows_key() {
        assert!(format!("{:?}", core()).contains("[REDACTED]"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn decrypt_inverts_encrypt(plaintext in ".*") {
            let core = core();
            let blob = core.encrypt(&plaintext).unwrap();
            let decrypted = core.decrypt(&blob).unwrap();
            prop_assert_eq!(decrypted.expose_secret(), plaintext.as_str());
        }
    }
}
