// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM field encryption for Strongbox.
//!
//! A single process-wide key, derived from the master passphrase via
//! Argon2id, seals every secret field independently. Blobs are base64 text
//! so they can be stored in any string column.

pub mod cipher;
pub mod crypto;
pub mod kdf;
pub mod mask;
pub mod prompt;

pub use cipher::{DecryptedField, EncryptionCore};
pub use mask::{mask, mask_secret};
pub use prompt::{get_master_passphrase, get_master_passphrase_with_confirm};
