// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connectivity probe with scripted outcomes for deterministic tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use strongbox_core::{ConnectivityProbe, ProviderSchema, StrongboxError};
use tokio::sync::Mutex;

/// A probe that pops scripted outcomes from a FIFO queue.
///
/// When the queue is empty every probe succeeds. An optional delay is slept
/// before answering, which lets tests exercise the store's probe timeout.
pub struct MockProbe {
    outcomes: Arc<Mutex<VecDeque<bool>>>,
    calls: Arc<Mutex<Vec<String>>>,
    delay: Duration,
}

impl MockProbe {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: Duration::ZERO,
        }
    }

    /// Probe pre-loaded with outcomes, `true` meaning the provider accepted.
    pub fn with_outcomes(outcomes: Vec<bool>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::from(outcomes))),
            ..Self::new()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn push_outcome(&self, ok: bool) {
        self.outcomes.lock().await.push_back(ok);
    }

    /// Provider ids probed so far, in call order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

impl Default for MockProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectivityProbe for MockProbe {
    async fn probe(
        &self,
        schema: &ProviderSchema,
        _fields: &BTreeMap<String, SecretString>,
    ) -> Result<(), StrongboxError> {
        self.calls.lock().await.push(schema.id.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let ok = self.outcomes.lock().await.pop_front().unwrap_or(true);
        if ok {
            Ok(())
        } else {
            Err(StrongboxError::Probe(format!("{} rejected the credential", schema.id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ProviderSchema {
        ProviderSchema::login("example.com")
    }

    #[tokio::test]
    async fn empty_queue_succeeds() {
        let probe = MockProbe::new();
        assert!(probe.probe(&schema(), &BTreeMap::new()).await.is_ok());
        assert_eq!(probe.calls().await, ["example.com"]);
    }

    #[tokio::test]
    async fn scripted_outcomes_in_order() {
        let probe = MockProbe::with_outcomes(vec![false, true]);
        assert!(probe.probe(&schema(), &BTreeMap::new()).await.is_err());
        assert!(probe.probe(&schema(), &BTreeMap::new()).await.is_ok());
    }
}
