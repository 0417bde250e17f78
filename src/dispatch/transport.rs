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
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::error::DispatchError;
use super::types::Endpoint;
use crate::constants::USER_AGENT;

/// Sends one JSON request to one endpoint and hands back the decoded body.
///
/// Implementations report network and decoding problems as
/// `DispatchError::Transport`, and non-success HTTP statuses as
/// `DispatchError::Application`. Structured `success: false` bodies are
/// returned as-is; the dispatcher classifies them.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, endpoint: &Endpoint, body: &Value) -> Result<Value, DispatchError>;
}

/// reqwest-backed transport used against real endpoints
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, endpoint: &Endpoint, body: &Value) -> Result<Value, DispatchError> {
        let payload = serde_json::to_vec(body)?;

        let response = self
            .client
            .post(&endpoint.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(
            endpoint = %endpoint.name,
            status = status.as_u16(),
            bytes = bytes.len(),
            "Endpoint responded"
        );

        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(DispatchError::Application(message));
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}
