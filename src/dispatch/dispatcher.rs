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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::DispatchError;
use super::health::HealthRegistry;
use super::normalize::normalize;
use super::payload::build_payload;
use super::transport::{HttpTransport, Transport};
use super::types::{Endpoint, NormalizedResponse, Query};
use crate::config::Config;
use crate::constants::{ALL_UNAVAILABLE_MESSAGE, UNKNOWN_ERROR_MESSAGE};

/// How recorded health influences the order endpoints are tried in
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthPolicy {
    /// Health is recorded only; endpoints are always tried in configured order
    #[default]
    Advisory,
    /// Healthy endpoints are tried first, unhealthy ones after them.
    /// Configured order is kept within each group and every endpoint is
    /// still attempted before giving up.
    HealthyFirst,
}

/// Sends a query to the configured endpoints in priority order until one answers
pub struct Dispatcher {
    endpoints: Vec<Endpoint>,
    health: Arc<HealthRegistry>,
    transport: Arc<dyn Transport>,
    timeout: Duration,
    policy: HealthPolicy,
}

impl Dispatcher {
    pub fn new(
        endpoints: Vec<Endpoint>,
        transport: Arc<dyn Transport>,
        timeout: Duration,
        policy: HealthPolicy,
    ) -> Self {
        let health = Arc::new(HealthRegistry::new(&endpoints));
        Self {
            endpoints,
            health,
            transport,
            timeout,
            policy,
        }
    }

    /// Build a dispatcher talking HTTP to the endpoints in `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.dispatcher.request_timeout_secs);
        let transport = HttpTransport::new(timeout)?;
        Ok(Self::new(
            config.endpoints.clone(),
            Arc::new(transport),
            timeout,
            config.dispatcher.health_policy,
        ))
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Shared handle to the health records, for status displays and the reset task
    pub fn health(&self) -> Arc<HealthRegistry> {
        self.health.clone()
    }

    pub async fn reset_health(&self) {
        self.health.reset().await;
        info!("Endpoint health reset");
    }

    /// Turn one query into one response. Never fails: when every endpoint
    /// fails, the returned response carries the last error seen.
    pub async fn dispatch(&self, query: &Query) -> NormalizedResponse {
        let mut last_error: Option<DispatchError> = None;

        for endpoint in self.try_order().await {
            if !self.health.contains(&endpoint.name) {
                warn!(endpoint = %endpoint.name, "Skipping endpoint without health record");
                continue;
            }

            match self.attempt(endpoint, query).await {
                Ok(raw) => {
                    self.health.record_success(&endpoint.name).await;
                    let normalized = normalize(&raw, endpoint.role);
                    info!(endpoint = %endpoint.name, role = %endpoint.role, "Query answered");
                    return NormalizedResponse::success(
                        normalized.content,
                        normalized.resources,
                        &endpoint.name,
                    );
                }
                Err(e) => {
                    warn!(endpoint = %endpoint.name, error = %e, "Endpoint attempt failed");
                    self.health.record_failure(&endpoint.name, &e.to_string()).await;
                    last_error = Some(e);
                }
            }
        }

        let exhausted = DispatchError::AllEndpointsExhausted(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| ALL_UNAVAILABLE_MESSAGE.to_string()),
        );
        warn!(error = %exhausted, "All endpoints failed");
        NormalizedResponse::failure(exhausted.to_string())
    }

    /// Attempt every endpoint once, recording health for each.
    /// Unlike `dispatch`, this does not stop at the first success.
    pub async fn probe_all(&self, query: &Query) -> Vec<(String, Result<(), DispatchError>)> {
        let mut results = Vec::with_capacity(self.endpoints.len());

        for endpoint in &self.endpoints {
            let outcome = match self.attempt(endpoint, query).await {
                Ok(_) => {
                    self.health.record_success(&endpoint.name).await;
                    Ok(())
                }
                Err(e) => {
                    self.health.record_failure(&endpoint.name, &e.to_string()).await;
                    Err(e)
                }
            };
            results.push((endpoint.name.clone(), outcome));
        }

        results
    }

    async fn try_order(&self) -> Vec<&Endpoint> {
        match self.policy {
            HealthPolicy::Advisory => self.endpoints.iter().collect(),
            HealthPolicy::HealthyFirst => {
                let mut healthy = Vec::new();
                let mut unhealthy = Vec::new();
                for endpoint in &self.endpoints {
                    if self.health.is_healthy(&endpoint.name).await {
                        healthy.push(endpoint);
                    } else {
                        unhealthy.push(endpoint);
                    }
                }
                healthy.extend(unhealthy);
                healthy
            }
        }
    }

    async fn attempt(&self, endpoint: &Endpoint, query: &Query) -> Result<Value, DispatchError> {
        let payload = build_payload(endpoint.role, query);
        debug!(endpoint = %endpoint.name, url = %endpoint.url, "Dispatching query");

        let raw = tokio::time::timeout(self.timeout, self.transport.post_json(endpoint, &payload))
            .await
            .map_err(|_| DispatchError::Timeout)??;

        if raw.get("success").and_then(Value::as_bool) == Some(false) {
            let message = raw
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_ERROR_MESSAGE);
            return Err(DispatchError::Application(message.to_string()));
        }

        Ok(raw)
    }
}
