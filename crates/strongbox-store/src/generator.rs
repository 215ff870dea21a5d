// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random secret generation from the OS CSPRNG.

use rand::Rng;
use rand::rngs::OsRng;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strongbox_core::StrongboxError;

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const NUMBERS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,.<>?/~";
/// Glyphs easily confused with one another when read or retyped.
const SIMILAR: &str = "il1Lo0O|";

/// Upper bound on generated length.
pub const MAX_LENGTH: usize = 1024;

/// Character classes and length for [`generate_secret`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    pub length: usize,
    pub include_uppercase: bool,
    pub include_lowercase: bool,
    pub include_numbers: bool,
    pub include_symbols: bool,
    pub exclude_similar: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: 32,
            include_uppercase: true,
            include_lowercase: true,
            include_numbers: true,
            include_symbols: true,
            exclude_similar: false,
        }
    }
}

impl GeneratorOptions {
    pub fn with_length(length: usize) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    /// The enabled classes, each already filtered for similar glyphs.
    fn classes(&self) -> Vec<Vec<char>> {
        [
            (self.include_uppercase, UPPERCASE),
            (self.include_lowercase, LOWERCASE),
            (self.include_numbers, NUMBERS),
            (self.include_symbols, SYMBOLS),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, set)| {
            set.chars()
                .filter(|c| !self.exclude_similar || !SIMILAR.contains(*c))
                .collect::<Vec<char>>()
        })
        .filter(|class| !class.is_empty())
        .collect()
    }
}

/// Generate a random secret.
///
/// Indices come from `OsRng` through `gen_range`, which rejection-samples, so
/// there is no modulo bias. When the length allows, every enabled class
/// appears at least once.
pub fn generate_secret(options: &GeneratorOptions) -> Result<SecretString, StrongboxError> {
    if options.length == 0 || options.length > MAX_LENGTH {
        return Err(StrongboxError::validation(
            "length",
            format!("must be between 1 and {MAX_LENGTH}"),
        ));
    }
    let classes = options.classes();
    if classes.is_empty() {
        return Err(StrongboxError::validation(
            "charset",
            "at least one character class must be enabled",
        ));
    }
    let charset: Vec<char> = classes.iter().flatten().copied().collect();

    let mut rng = OsRng;
    let mut out: Vec<char> = Vec::with_capacity(options.length);
    if options.length >= classes.len() {
        for class in &classes {
            out.push(class[rng.gen_range(0..class.len())]);
        }
    }
    while out.len() < options.length {
        out.push(charset[rng.gen_range(0..charset.len())]);
    }
    // Fisher-Yates so the guaranteed characters are not always in front.
    for i in (1..out.len()).rev() {
        let j = rng.gen_range(0..=i);
        out.swap(i, j);
    }

    let secret: String = out.iter().collect();
    zeroize::Zeroize::zeroize(&mut out);
    Ok(SecretString::from(secret))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use secrecy::ExposeSecret;

    fn generate(options: &GeneratorOptions) -> String {
        generate_secret(options).unwrap().expose_secret().to_string()
    }

    #[test]
    fn length_16_is_exact() {
        for _ in 0..100 {
            assert_eq!(generate(&GeneratorOptions::with_length(16)).chars().count(), 16);
        }
    }

    #[test]
    fn digits_only() {
        let options = GeneratorOptions {
            length: 40,
            include_uppercase: false,
            include_lowercase: false,
            include_numbers: true,
            include_symbols: false,
            exclude_similar: false,
        };
        assert!(generate(&options).chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn every_class_is_represented() {
        let value = generate(&GeneratorOptions::with_length(4));
        assert!(value.chars().any(|c| c.is_ascii_uppercase()));
        assert!(value.chars().any(|c| c.is_ascii_lowercase()));
        assert!(value.chars().any(|c| c.is_ascii_digit()));
        assert!(value.chars().any(|c| SYMBOLS.contains(c)));
    }

    #[test]
    fn exclude_similar_drops_ambiguous_glyphs() {
        let options = GeneratorOptions {
            length: 500,
            exclude_similar: true,
            ..GeneratorOptions::default()
        };
        assert!(!generate(&options).chars().any(|c| SIMILAR.contains(c)));
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(matches!(
            generate_secret(&GeneratorOptions::with_length(0)),
            Err(StrongboxError::Validation { .. })
        ));
    }

    #[test]
    fn empty_charset_is_rejected() {
        let options = GeneratorOptions {
            include_uppercase: false,
            include_lowercase: false,
            include_numbers: false,
            include_symbols: false,
            ..GeneratorOptions::default()
        };
        assert!(matches!(
            generate_secret(&options),
            Err(StrongboxError::Validation { field, .. }) if field == "charset"
        ));
    }

    #[test]
    fn outputs_differ() {
        let options = GeneratorOptions::default();
        assert_ne!(generate(&options), generate(&options));
    }

    proptest! {
        #[test]
        fn length_and_charset_hold(
            length in 1usize..128,
            upper: bool,
            lower: bool,
            numbers: bool,
            symbols: bool,
            exclude_similar: bool,
        ) {
            prop_assume!(upper || lower || numbers || symbols);
            let options = GeneratorOptions {
                length,
                include_uppercase: upper,
                include_lowercase: lower,
                include_numbers: numbers,
                include_symbols: symbols,
                exclude_similar,
            };
            let value = generate(&options);
            prop_assert_eq!(value.chars().count(), length);
            for c in value.chars() {
                let allowed = (upper && c.is_ascii_uppercase())
                    || (lower && c.is_ascii_lowercase())
                    || (numbers && c.is_ascii_digit())
                    || (symbols && SYMBOLS.contains(c));
                prop_assert!(allowed, "unexpected {c}");
                prop_assert!(!exclude_similar || !SIMILAR.contains(c));
            }
        }
    }
}
