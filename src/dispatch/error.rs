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

use thiserror::Error;

use crate::constants::TIMEOUT_MESSAGE;

/// Failures seen while dispatching a query.
///
/// The first three are local to a single endpoint and are recovered by
/// moving on to the next one. Only `AllEndpointsExhausted` reaches callers,
/// and then only as the `error` text of a `NormalizedResponse`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No response within the per-attempt wait
    #[error("{message}", message = TIMEOUT_MESSAGE)]
    Timeout,

    /// Network, DNS or body parse failure
    #[error("{0}")]
    Transport(String),

    /// Endpoint answered with a structured failure
    #[error("{0}")]
    Application(String),

    /// Every configured endpoint failed
    #[error("{0}")]
    AllEndpointsExhausted(String),
}

impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DispatchError::Timeout
        } else {
            DispatchError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(e: serde_json::Error) -> Self {
        DispatchError::Transport(format!("Invalid response body: {}", e))
    }
}
