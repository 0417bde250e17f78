// Copyright 2026 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::types::Endpoint;

/// Health of one endpoint as observed by the dispatcher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointHealth {
    pub healthy: bool,
    pub last_error: Option<String>,
    pub error_count: u32,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl Default for EndpointHealth {
    fn default() -> Self {
        Self {
            healthy: true,
            last_error: None,
            error_count: 0,
            last_used_at: None,
        }
    }
}

impl EndpointHealth {
    fn mark_failed(&mut self, error: &str) {
        self.healthy = false;
        self.error_count = self.error_count.saturating_add(1);
        self.last_error = Some(error.to_string());
        self.last_used_at = Some(Utc::now());
    }

    fn mark_succeeded(&mut self) {
        self.healthy = true;
        self.error_count = 0;
        self.last_used_at = Some(Utc::now());
    }

    fn reset(&mut self) {
        self.healthy = true;
        self.error_count = 0;
        self.last_error = None;
    }
}

/// Health records for every configured endpoint.
///
/// Entries are created once from the endpoint list and never added or
/// removed afterwards. All mutation goes through the write lock so the
/// dispatcher and the periodic reset task never interleave on an entry.
#[derive(Debug)]
pub struct HealthRegistry {
    order: Vec<String>,
    entries: RwLock<HashMap<String, EndpointHealth>>,
}

impl HealthRegistry {
    pub fn new(endpoints: &[Endpoint]) -> Self {
        let order: Vec<String> = endpoints.iter().map(|e| e.name.clone()).collect();
        let entries = order
            .iter()
            .map(|name| (name.clone(), EndpointHealth::default()))
            .collect();

        Self {
            order,
            entries: RwLock::new(entries),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.order.iter().any(|n| n == name)
    }

    #[cfg(test)]
    pub async fn get(&self, name: &str) -> Option<EndpointHealth> {
        self.entries.read().await.get(name).cloned()
    }

    pub async fn is_healthy(&self, name: &str) -> bool {
        self.entries
            .read()
            .await
            .get(name)
            .map(|h| h.healthy)
            .unwrap_or(false)
    }

    pub async fn record_failure(&self, name: &str, error: &str) {
        let mut entries = self.entries.write().await;
        if let Some(health) = entries.get_mut(name) {
            health.mark_failed(error);
            debug!(
                endpoint = name,
                error_count = health.error_count,
                "Endpoint marked unhealthy"
            );
        }
    }

    pub async fn record_success(&self, name: &str) {
        let mut entries = self.entries.write().await;
        if let Some(health) = entries.get_mut(name) {
            health.mark_succeeded();
        }
    }

    /// Mark every endpoint healthy again
    pub async fn reset(&self) {
        let mut entries = self.entries.write().await;
        for health in entries.values_mut() {
            health.reset();
        }
    }

    /// Health of all endpoints in configured order
    pub async fn snapshot(&self) -> Vec<(String, EndpointHealth)> {
        let entries = self.entries.read().await;
        self.order
            .iter()
            .filter_map(|name| entries.get(name).map(|h| (name.clone(), h.clone())))
            .collect()
    }
}

/// Background task resetting endpoint health on a fixed period.
/// The task stops when this handle is dropped.
pub struct HealthResetTask {
    handle: JoinHandle<()>,
}

impl HealthResetTask {
    pub fn spawn(registry: Arc<HealthRegistry>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                registry.reset().await;
                info!(
                    period_secs = period.as_secs(),
                    "Periodic endpoint health reset"
                );
            }
        });

        Self { handle }
    }
}

impl Drop for HealthResetTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
