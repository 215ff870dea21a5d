// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic secret strength scoring.

use serde::Serialize;

/// Lowercased substrings that make a secret trivially guessable.
const COMMON_PASSWORDS: &[&str] = &[
    "password", "123456", "12345678", "qwerty", "abc123", "letmein", "welcome", "admin",
    "monkey", "dragon", "iloveyou", "111111", "sunshine", "football", "baseball", "master",
    "trustno1", "passw0rd",
];

/// Minimum length the requirements checklist asks for.
pub const MIN_RECOMMENDED_LENGTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLabel {
    VeryWeak,
    Weak,
    Fair,
    Strong,
    VeryStrong,
}

impl StrengthLabel {
    fn from_score(score: u8) -> Self {
        match score {
            0..20 => Self::VeryWeak,
            20..40 => Self::Weak,
            40..60 => Self::Fair,
            60..80 => Self::Strong,
            _ => Self::VeryStrong,
        }
    }
}

/// Which baseline requirements a secret meets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Requirements {
    pub min_length: bool,
    pub has_uppercase: bool,
    pub has_lowercase: bool,
    pub has_numbers: bool,
    pub has_symbols: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrengthReport {
    /// 0 to 100.
    pub score: u8,
    pub label: StrengthLabel,
    pub feedback: Vec<String>,
    pub requirements: Requirements,
}

/// Score `secret` from length, character variety, and known weak patterns.
///
/// Pure: the same input always yields the same report.
pub fn analyze_strength(secret: &str) -> StrengthReport {
    let length = secret.chars().count();
    let requirements = Requirements {
        min_length: length >= MIN_RECOMMENDED_LENGTH,
        has_uppercase: secret.chars().any(|c| c.is_uppercase()),
        has_lowercase: secret.chars().any(|c| c.is_lowercase()),
        has_numbers: secret.chars().any(|c| c.is_ascii_digit()),
        has_symbols: secret.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
    };
    let mut feedback = Vec::new();
    let mut score: i32 = 0;

    score += match length {
        0..8 => {
            feedback.push("use at least 8 characters".to_string());
            0
        }
        8..12 => 20,
        12..16 => 30,
        16..20 => 40,
        _ => 50,
    };
    if (8..MIN_RECOMMENDED_LENGTH).contains(&length) {
        feedback.push(format!("use {MIN_RECOMMENDED_LENGTH} or more characters"));
    }

    let classes = [
        (requirements.has_lowercase, "add lowercase letters"),
        (requirements.has_uppercase, "add uppercase letters"),
        (requirements.has_numbers, "add numbers"),
        (requirements.has_symbols, "add symbols"),
    ];
    for (present, hint) in classes {
        if present {
            score += 10;
        } else {
            feedback.push(hint.to_string());
        }
    }
    if classes.iter().all(|(present, _)| *present) {
        score += 10;
    }

    if has_repeated_run(secret, 3) {
        score -= 10;
        feedback.push("avoid repeating the same character".to_string());
    }
    if length > 0 && secret.chars().all(|c| c.is_ascii_digit()) {
        score -= 20;
        feedback.push("avoid digits only".to_string());
    }
    if length > 0 && secret.chars().all(char::is_alphabetic) {
        score -= 10;
        feedback.push("avoid letters only".to_string());
    }
    let lowered = secret.to_lowercase();
    if COMMON_PASSWORDS.iter().any(|p| lowered.contains(p)) {
        score -= 30;
        feedback.push("avoid common passwords".to_string());
    }

    let score = score.clamp(0, 100) as u8;
    StrengthReport {
        score,
        label: StrengthLabel::from_score(score),
        feedback,
        requirements,
    }
}

/// Whether any character repeats `run` or more times consecutively.
fn has_repeated_run(secret: &str, run: usize) -> bool {
    let mut previous = None;
    let mut count = 0;
    for c in secret.chars() {
        if Some(c) == previous {
            count += 1;
        } else {
            previous = Some(c);
            count = 1;
        }
        if count >= run {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_is_very_weak() {
        let report = analyze_strength("");
        assert_eq!(report.score, 0);
        assert_eq!(report.label, StrengthLabel::VeryWeak);
    }

    #[test]
    fn common_password_scores_low() {
        let report = analyze_strength("password");
        assert!(report.score < 20, "score {}", report.score);
        assert!(report.feedback.iter().any(|f| f.contains("common")));
    }

    #[test]
    fn digits_only_is_penalized() {
        let digits = analyze_strength("83920174");
        let mixed = analyze_strength("83920a74");
        assert!(digits.score < mixed.score);
    }

    #[test]
    fn repeated_run_is_penalized() {
        let run = analyze_strength("Xq7!aaab9Zk2");
        let no_run = analyze_strength("Xq7!abcb9Zk2");
        assert_eq!(no_run.score - run.score, 10);
    }

    #[test]
    fn long_varied_secret_is_very_strong() {
        let report = analyze_strength("T7#kq9!Vz2@Lm4$Rw8&x");
        assert_eq!(report.score, 100);
        assert_eq!(report.label, StrengthLabel::VeryStrong);
        assert!(report.feedback.is_empty());
        assert!(report.requirements.min_length);
    }

    #[test]
    fn requirements_reflect_classes() {
        let r = analyze_strength("abcDEF").requirements;
        assert!(r.has_lowercase && r.has_uppercase);
        assert!(!r.has_numbers && !r.has_symbols && !r.min_length);
    }

    #[test]
    fn length_tiers_increase_score() {
        let short = analyze_strength("aB3!xY7?");
        let longer = analyze_strength("aB3!xY7?aB3!xY7?");
        assert!(longer.score > short.score);
    }

    proptest! {
        #[test]
        fn analysis_is_pure(secret in ".{0,64}") {
            let first = analyze_strength(&secret);
            let second = analyze_strength(&secret);
            prop_assert_eq!(&first, &second);
            prop_assert!(first.score <= 100);
        }
    }
}
