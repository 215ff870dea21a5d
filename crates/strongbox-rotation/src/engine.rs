// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rotation pools and strategy dispatch.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::Rng;
use serde::Serialize;
use strongbox_config::model::RotationConfig;
use strongbox_core::{ResourceKind, RotationStrategy, StrongboxError};
use tracing::{debug, info, warn};

use crate::health::KeyHealth;

/// Caller-supplied view of one secret at selection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationCandidate {
    pub id: String,
    pub active: bool,
}

impl RotationCandidate {
    pub fn new(id: impl Into<String>, active: bool) -> Self {
        Self {
            id: id.into(),
            active,
        }
    }
}

#[derive(Debug)]
struct RotationPool {
    members: Vec<String>,
    strategy: RotationStrategy,
    cursor: usize,
}

/// Snapshot of one pool for status reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolStats {
    pub provider_id: String,
    pub strategy: RotationStrategy,
    pub size: usize,
    pub healthy: usize,
    pub total_usage: u64,
    pub cursor: usize,
}

/// Maintains one pool per provider and selects the next key from it.
///
/// Selection holds the pool's map entry for the cursor read and advance, so
/// two concurrent selections never consume the same round-robin slot.
pub struct KeyRotationEngine {
    pools: DashMap<String, RotationPool>,
    health: DashMap<String, KeyHealth>,
    failure_threshold: u32,
    recency_window: Duration,
}

impl std::fmt::Debug for KeyRotationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRotationEngine")
            .field("pools", &self.pools.len())
            .field("failure_threshold", &self.failure_threshold)
            .finish()
    }
}

impl Default for KeyRotationEngine {
    fn default() -> Self {
        Self::new(&RotationConfig::default())
    }
}

impl KeyRotationEngine {
    pub fn new(config: &RotationConfig) -> Self {
        Self {
            pools: DashMap::new(),
            health: DashMap::new(),
            failure_threshold: config.failure_threshold.max(1),
            recency_window: Duration::from_secs(config.recency_window_secs),
        }
    }

    /// Create (or replace) the pool for `provider_id`.
    ///
    /// Duplicate ids are collapsed, keeping first occurrence order.
    pub fn create_pool(
        &self,
        provider_id: &str,
        secret_ids: Vec<String>,
        strategy: RotationStrategy,
    ) -> Result<(), StrongboxError> {
        if provider_id.trim().is_empty() {
            return Err(StrongboxError::validation("provider_id", "must not be empty"));
        }
        let mut seen = HashSet::new();
        let members: Vec<String> = secret_ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        if let Some((_, old)) = self.pools.remove(provider_id) {
            for id in old.members.iter().filter(|id| !seen.contains(*id)) {
                self.health.remove(id);
            }
        }
        for id in &members {
            self.health
                .entry(id.clone())
                .or_insert_with(|| KeyHealth::new(id.clone()));
        }

        info!(provider_id, size = members.len(), %strategy, "rotation pool created");
        self.pools.insert(
            provider_id.to_string(),
            RotationPool {
                members,
                strategy,
                cursor: 0,
            },
        );
        Ok(())
    }

    /// Pick the next key for `provider_id`.
    ///
    /// Only candidates that are active, pooled, and healthy are eligible. When
    /// none are, every key in the pool is reset to healthy and the first
    /// active pool member is returned for this call.
    pub fn select_next(
        &self,
        provider_id: &str,
        candidates: &[RotationCandidate],
    ) -> Result<String, StrongboxError> {
        let mut pool = self
            .pools
            .get_mut(provider_id)
            .ok_or_else(|| StrongboxError::not_found(ResourceKind::Pool, provider_id))?;
        if pool.members.is_empty() {
            return Err(StrongboxError::RotationExhausted {
                provider: provider_id.to_string(),
            });
        }

        let active: HashSet<&str> = candidates
            .iter()
            .filter(|c| c.active)
            .map(|c| c.id.as_str())
            .collect();
        let eligible: Vec<String> = pool
            .members
            .iter()
            .filter(|id| active.contains(id.as_str()) && self.is_healthy(id))
            .cloned()
            .collect();

        // Round-robin consumes a slot on every call, healthy or not.
        let slot = if pool.strategy == RotationStrategy::RoundRobin {
            let len = pool.members.len();
            let current = pool.members[pool.cursor % len].clone();
            pool.cursor = (pool.cursor + 1) % len;
            Some(current)
        } else {
            None
        };

        if eligible.is_empty() {
            for id in &pool.members {
                if let Some(mut h) = self.health.get_mut(id) {
                    h.reset();
                }
            }
            let fallback = pool
                .members
                .iter()
                .find(|id| active.contains(id.as_str()))
                .cloned();
            return match fallback {
                Some(id) => {
                    warn!(provider_id, key_id = %id, "no healthy keys, pool health reset");
                    Ok(id)
                }
                None => Err(StrongboxError::RotationExhausted {
                    provider: provider_id.to_string(),
                }),
            };
        }

        let strategy = pool.strategy;
        let chosen = match strategy {
            RotationStrategy::RoundRobin => match slot {
                Some(id) if eligible.contains(&id) => id,
                _ => eligible[0].clone(),
            },
            RotationStrategy::LeastUsed => self.least_used(&eligible),
            RotationStrategy::Random => {
                eligible[rand::thread_rng().gen_range(0..eligible.len())].clone()
            }
            RotationStrategy::Weighted => self.weighted(&eligible, Utc::now()),
        };
        drop(pool);

        metrics::counter!("strongbox_rotation_selections_total", "strategy" => strategy.to_string())
            .increment(1);
        debug!(provider_id, key_id = %chosen, %strategy, "rotation key selected");
        Ok(chosen)
    }

    fn usage_of(&self, id: &str) -> u64 {
        self.health.get(id).map_or(0, |h| h.usage_count)
    }

    /// Minimum usage; `eligible` is in pool order so ties go to the earlier key.
    fn least_used(&self, eligible: &[String]) -> String {
        let mut best = &eligible[0];
        let mut best_usage = self.usage_of(best);
        for id in &eligible[1..] {
            let usage = self.usage_of(id);
            if usage < best_usage {
                best = id;
                best_usage = usage;
            }
        }
        best.clone()
    }

    /// Cumulative-weight threshold draw.
    fn weighted(&self, eligible: &[String], now: DateTime<Utc>) -> String {
        let weights: Vec<f64> = eligible
            .iter()
            .map(|id| {
                self.health
                    .get(id)
                    .map_or(1.0, |h| h.weight(now, self.recency_window))
            })
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return eligible[0].clone();
        }

        let threshold = rand::thread_rng().gen_range(0.0..total);
        let mut cumulative = 0.0;
        for (id, weight) in eligible.iter().zip(&weights) {
            cumulative += weight;
            if threshold < cumulative {
                return id.clone();
            }
        }
        eligible[eligible.len() - 1].clone()
    }

    fn with_health<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut KeyHealth) -> T,
    ) -> Result<T, StrongboxError> {
        let mut health = self
            .health
            .get_mut(id)
            .ok_or_else(|| StrongboxError::not_found(ResourceKind::Secret, id))?;
        Ok(f(health.value_mut()))
    }

    /// Reset failures and mark the key healthy.
    pub fn record_success(&self, id: &str) -> Result<(), StrongboxError> {
        self.with_health(id, KeyHealth::record_success)
    }

    /// Count a failure; the key turns unhealthy once the threshold is reached.
    pub fn record_failure(&self, id: &str) -> Result<(), StrongboxError> {
        let threshold = self.failure_threshold;
        let flipped = self.with_health(id, |h| h.record_failure(threshold))?;
        if flipped {
            warn!(key_id = id, threshold, "key marked unhealthy");
        }
        Ok(())
    }

    /// Count one use of the key. Unpooled ids are ignored.
    pub fn record_usage(&self, id: &str) {
        if let Some(mut h) = self.health.get_mut(id) {
            h.record_usage(Utc::now());
        }
    }

    /// Copy persisted usage stats into the key's health record.
    pub fn seed_usage(&self, id: &str, usage_count: u64, last_used: Option<DateTime<Utc>>) {
        if let Some(mut h) = self.health.get_mut(id) {
            h.usage_count = usage_count;
            h.last_used = last_used;
        }
    }

    /// Add `id` to an existing pool. Returns false if it was already pooled.
    pub fn add_to_pool(&self, provider_id: &str, id: &str) -> Result<bool, StrongboxError> {
        let mut pool = self
            .pools
            .get_mut(provider_id)
            .ok_or_else(|| StrongboxError::not_found(ResourceKind::Pool, provider_id))?;
        if pool.members.iter().any(|m| m == id) {
            return Ok(false);
        }
        pool.members.push(id.to_string());
        self.health
            .entry(id.to_string())
            .or_insert_with(|| KeyHealth::new(id));
        debug!(provider_id, key_id = id, "key added to pool");
        Ok(true)
    }

    /// Remove `id` from the pool and drop its health state.
    ///
    /// Returns false when the pool or the member does not exist.
    pub fn remove_from_pool(&self, provider_id: &str, id: &str) -> bool {
        let Some(mut pool) = self.pools.get_mut(provider_id) else {
            return false;
        };
        let Some(index) = pool.members.iter().position(|m| m == id) else {
            return false;
        };
        pool.members.remove(index);
        if index < pool.cursor {
            pool.cursor -= 1;
        }
        let len = pool.members.len();
        pool.cursor = if len == 0 { 0 } else { pool.cursor % len };
        self.health.remove(id);
        debug!(provider_id, key_id = id, "key removed from pool");
        true
    }

    /// Unknown ids are reported unhealthy.
    pub fn is_healthy(&self, id: &str) -> bool {
        self.health.get(id).is_some_and(|h| h.healthy)
    }

    pub fn health(&self, id: &str) -> Option<KeyHealth> {
        self.health.get(id).map(|h| h.value().clone())
    }

    pub fn set_strategy(
        &self,
        provider_id: &str,
        strategy: RotationStrategy,
    ) -> Result<(), StrongboxError> {
        let mut pool = self
            .pools
            .get_mut(provider_id)
            .ok_or_else(|| StrongboxError::not_found(ResourceKind::Pool, provider_id))?;
        pool.strategy = strategy;
        pool.cursor = 0;
        Ok(())
    }

    pub fn delete_pool(&self, provider_id: &str) -> bool {
        match self.pools.remove(provider_id) {
            Some((_, pool)) => {
                for id in &pool.members {
                    self.health.remove(id);
                }
                true
            }
            None => false,
        }
    }

    pub fn pools(&self) -> Vec<String> {
        let mut providers: Vec<String> = self.pools.iter().map(|p| p.key().clone()).collect();
        providers.sort();
        providers
    }

    /// Pool members in rotation order.
    pub fn members(&self, provider_id: &str) -> Option<Vec<String>> {
        self.pools.get(provider_id).map(|p| p.members.clone())
    }

    pub fn pool_stats(&self, provider_id: &str) -> Result<PoolStats, StrongboxError> {
        let pool = self
            .pools
            .get(provider_id)
            .ok_or_else(|| StrongboxError::not_found(ResourceKind::Pool, provider_id))?;
        let (healthy, total_usage) = pool.members.iter().fold((0, 0u64), |(ok, usage), id| {
            match self.health.get(id) {
                Some(h) => (ok + usize::from(h.healthy), usage + h.usage_count),
                None => (ok, usage),
            }
        });
        Ok(PoolStats {
            provider_id: provider_id.to_string(),
            strategy: pool.strategy,
            size: pool.members.len(),
            healthy,
            total_usage,
            cursor: pool.cursor,
        })
    }
}
