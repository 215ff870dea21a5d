// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-key health and usage tracking.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Floor for the recency factor so a just-used key stays selectable.
const MIN_RECENCY_FACTOR: f64 = 0.1;

/// Usage and failure state for one pooled key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyHealth {
    pub id: String,
    pub usage_count: u64,
    pub last_used: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub healthy: bool,
}

impl KeyHealth {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            usage_count: 0,
            last_used: None,
            consecutive_failures: 0,
            healthy: true,
        }
    }

    pub(crate) fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.healthy = true;
    }

    /// Returns true when this failure flipped the key to unhealthy.
    pub(crate) fn record_failure(&mut self, threshold: u32) -> bool {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let was_healthy = self.healthy;
        if self.consecutive_failures >= threshold {
            self.healthy = false;
        }
        was_healthy && !self.healthy
    }

    pub(crate) fn record_usage(&mut self, at: DateTime<Utc>) {
        self.usage_count = self.usage_count.saturating_add(1);
        self.last_used = Some(at);
    }

    pub(crate) fn reset(&mut self) {
        self.consecutive_failures = 0;
        self.healthy = true;
    }

    /// Selection weight: `1/(usage+1) * health_factor * recency_factor`.
    pub fn weight(&self, now: DateTime<Utc>, recency_window: Duration) -> f64 {
        let usage_factor = 1.0 / (self.usage_count as f64 + 1.0);
        let health_factor = 1.0 / (1.0 + f64::from(self.consecutive_failures));
        usage_factor * health_factor * self.recency_factor(now, recency_window)
    }

    fn recency_factor(&self, now: DateTime<Utc>, window: Duration) -> f64 {
        let Some(last) = self.last_used else {
            return 1.0;
        };
        if window.is_zero() {
            return 1.0;
        }
        let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
        (elapsed.as_secs_f64() / window.as_secs_f64()).clamp(MIN_RECENCY_FACTOR, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn fresh_key_is_healthy_with_full_weight() {
        let h = KeyHealth::new("k1");
        assert!(h.healthy);
        assert!((h.weight(Utc::now(), WINDOW) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn failures_flip_at_threshold_only() {
        let mut h = KeyHealth::new("k1");
        assert!(!h.record_failure(3));
        assert!(!h.record_failure(3));
        assert!(h.healthy);
        assert!(h.record_failure(3));
        assert!(!h.healthy);
        assert!(!h.record_failure(3), "already unhealthy");
    }

    #[test]
    fn success_restores_immediately() {
        let mut h = KeyHealth::new("k1");
        for _ in 0..5 {
            h.record_failure(3);
        }
        h.record_success();
        assert!(h.healthy);
        assert_eq!(h.consecutive_failures, 0);
    }

    #[test]
    fn usage_lowers_weight() {
        let now = Utc::now();
        let mut h = KeyHealth::new("k1");
        h.usage_count = 99;
        assert!((h.weight(now, WINDOW) - 0.01).abs() < 1e-9);
    }

    #[test]
    fn recent_use_is_down_weighted_then_recovers() {
        let now = Utc::now();
        let mut h = KeyHealth::new("k1");
        h.record_usage(now);
        let just_used = h.weight(now, WINDOW);
        let later = h.weight(now + chrono::Duration::seconds(120), WINDOW);
        assert!((just_used - 0.5 * MIN_RECENCY_FACTOR).abs() < 1e-9);
        assert!((later - 0.5).abs() < 1e-9);
    }

    #[test]
    fn failures_lower_weight() {
        let now = Utc::now();
        let mut h = KeyHealth::new("k1");
        h.record_failure(3);
        assert!((h.weight(now, WINDOW) - 0.5).abs() < 1e-9);
    }
}
