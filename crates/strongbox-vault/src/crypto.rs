// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Sealed output is laid out as `IV[16] || ciphertext || tag[16]`. Every call
//! to [`seal`] draws a fresh 128-bit IV from the system CSPRNG; IV reuse under
//! one key breaks GCM confidentiality and authenticity.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce};
use ring::rand::{SecureRandom, SystemRandom};
use strongbox_core::StrongboxError;

/// IV length in bytes.
pub const IV_LEN: usize = 16;
/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;
/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// AES-256-GCM with a 128-bit IV.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Encrypt `plaintext` under `key` with a random IV.
///
/// Returns `IV || ciphertext || tag`.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, StrongboxError> {
    let cipher = Aes256Gcm16::new_from_slice(key)
        .map_err(|_| StrongboxError::Internal("failed to create AES-256-GCM key".to_string()))?;

    let iv: [u8; IV_LEN] = random_bytes()?;
    let ciphertext = cipher
        .encrypt(Nonce::<U16>::from_slice(&iv), plaintext)
        .map_err(|_| StrongboxError::Internal("AES-256-GCM encryption failed".to_string()))?;

    let mut sealed = Vec::with_capacity(IV_LEN + ciphertext.len());
    sealed.extend_from_slice(&iv);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Verify and decrypt `IV || ciphertext || tag`.
///
/// Nothing is returned unless the tag verifies.
pub fn open(key: &[u8; KEY_LEN], sealed: &[u8]) -> Result<Vec<u8>, StrongboxError> {
    if sealed.len() < IV_LEN + TAG_LEN {
        return Err(StrongboxError::Decryption(format!(
            "blob too short: {} bytes, need at least {}",
            sealed.len(),
            IV_LEN + TAG_LEN
        )));
    }
    let (iv, ciphertext) = sealed.split_at(IV_LEN);

    let cipher = Aes256Gcm16::new_from_slice(key)
        .map_err(|_| StrongboxError::Internal("failed to create AES-256-GCM key".to_string()))?;

    cipher
        .decrypt(Nonce::<U16>::from_slice(iv), ciphertext)
        .map_err(|_| {
            StrongboxError::Decryption(
                "authentication failed -- wrong key or corrupted data".to_string(),
            )
        })
}

/// Fill an `N`-byte array from the system CSPRNG.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], StrongboxError> {
    let mut buf = [0u8; N];
    SystemRandom::new()
        .fill(&mut buf)
        .map_err(|_| StrongboxError::Internal("system random source unavailable".to_string()))?;
    Ok(buf)
}

/// Generate a random 32-byte key suitable for AES-256-GCM.
pub fn generate_random_key() -> Result<[u8; KEY_LEN], StrongboxError> {
    random_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let key = generate_random_key().unwrap();
        let sealed = seal(&key, b"sk-live-value").unwrap();
        assert_eq!(open(&key, &sealed).unwrap(), b"sk-live-value");
    }

    #[test]
    fn sealed_layout_is_iv_ciphertext_tag() {
        let key = generate_random_key().unwrap();
        let sealed = seal(&key, b"hello").unwrap();
        assert_eq!(sealed.len(), IV_LEN + 5 + TAG_LEN);
    }

    #[test]
    fn empty_plaintext_still_carries_iv_and_tag() {
        let key = generate_random_key().unwrap();
        let sealed = seal(&key, b"").unwrap();
        assert_eq!(sealed.len(), IV_LEN + TAG_LEN);
        assert!(open(&key, &sealed).unwrap().is_empty());
    }

    #[test]
    fn each_seal_uses_a_fresh_iv() {
        let key = generate_random_key().unwrap();
        let a = seal(&key, b"same input").unwrap();
        let b = seal(&key, b"same input").unwrap();
        assert_ne!(&a[..IV_LEN], &b[..IV_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = seal(&generate_random_key().unwrap(), b"data").unwrap();
        let result = open(&generate_random_key().unwrap(), &sealed);
        assert!(matches!(result, Err(StrongboxError::Decryption(_))));
    }

    #[test]
    fn tampered_tag_fails() {
        let key = generate_random_key().unwrap();
        let mut sealed = seal(&key, b"do not tamper").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x80;
        assert!(matches!(open(&key, &sealed), Err(StrongboxError::Decryption(_))));
    }

    #[test]
    fn truncated_blob_fails() {
        let key = generate_random_key().unwrap();
        assert!(matches!(
            open(&key, &[0u8; IV_LEN + TAG_LEN - 1]),
            Err(StrongboxError::Decryption(_))
        ));
    }
}
