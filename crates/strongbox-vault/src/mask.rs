// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display masking for UI previews.
//!
//! Masking is one-way and non-cryptographic. Masked strings are never stored
//! and never compared against secrets.

const MASK_CHAR: char = '•';

/// Replace all but the last `visible_suffix_len` characters with `•`.
///
/// Values no longer than the visible suffix are masked entirely so a short
/// secret is never shown whole.
pub fn mask(value: &str, visible_suffix_len: usize) -> String {
    let count = value.chars().count();
    if count <= visible_suffix_len {
        return MASK_CHAR.to_string().repeat(count);
    }
    let hidden = count - visible_suffix_len;
    let mut out: String = std::iter::repeat_n(MASK_CHAR, hidden).collect();
    out.extend(value.chars().skip(hidden));
    out
}

/// Compact preview in the form `sk-a...mnop`.
///
/// Shows up to four leading and four trailing characters. Values under ten
/// characters are shown as `****`.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}
