// Copyright 2025 Muvon Un Limited
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

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::constants::{
    DEFAULT_HEALTH_RESET_SECS, DEFAULT_MAX_CONVERSATIONS, DEFAULT_MAX_MESSAGES,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_URGENCY, MAX_RECENT_TURNS,
};
use crate::dispatch::{Endpoint, HealthPolicy};

const DEFAULT_TEMPLATE: &str = include_str!("../config-templates/default.toml");

/// Dispatcher behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub request_timeout_secs: u64,
    pub health_reset_secs: u64,
    pub health_policy: HealthPolicy,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            health_reset_secs: DEFAULT_HEALTH_RESET_SECS,
            health_policy: HealthPolicy::Advisory,
        }
    }
}

/// Chat history limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_messages: usize,
    pub max_conversations: usize,
    /// Prior turns sent with each query (capped at 5)
    pub context_turns: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            max_conversations: DEFAULT_MAX_CONVERSATIONS,
            context_turns: MAX_RECENT_TURNS,
        }
    }
}

/// Fixed context attached to every query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub urgency: String,
    pub family_context: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            urgency: DEFAULT_URGENCY.to_string(),
            family_context: true,
        }
    }
}

/// Main configuration for assistdesk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub query: QueryConfig,
    /// Backends in priority order
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

impl Config {
    /// Load configuration from config.toml file
    /// First tries to load from system config directory, falls back to embedded template
    pub fn load() -> Result<Self> {
        let config_path = crate::storage::get_system_config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::parse(DEFAULT_TEMPLATE)?;

            if let Some(parent) = config_path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&config_path, DEFAULT_TEMPLATE)?;

            Ok(config)
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            anyhow::bail!("At least one [[endpoints]] entry is required");
        }

        let mut names = HashSet::new();
        for endpoint in &self.endpoints {
            if !names.insert(endpoint.name.as_str()) {
                anyhow::bail!("Duplicate endpoint name: {}", endpoint.name);
            }
            let url = endpoint.url.trim();
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!(
                    "Invalid URL for endpoint {}: must start with http:// or https://, got: {}",
                    endpoint.name,
                    url
                );
            }
        }

        if self.dispatcher.request_timeout_secs == 0 {
            anyhow::bail!("dispatcher.request_timeout_secs must be greater than zero");
        }
        if self.dispatcher.health_reset_secs == 0 {
            anyhow::bail!("dispatcher.health_reset_secs must be greater than zero");
        }
        if self.history.max_messages == 0 || self.history.max_conversations == 0 {
            anyhow::bail!("history limits must be greater than zero");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::EndpointRole;

    #[test]
    fn test_default_template_parses() {
        let config = Config::parse(DEFAULT_TEMPLATE).unwrap();

        assert_eq!(config.dispatcher.request_timeout_secs, 30);
        assert_eq!(config.dispatcher.health_reset_secs, 300);
        assert_eq!(config.dispatcher.health_policy, HealthPolicy::Advisory);
        assert_eq!(config.endpoints.len(), 3);
        assert_eq!(config.endpoints[0].role, EndpointRole::Conversational);
        assert_eq!(config.endpoints[1].role, EndpointRole::Enhancement);
        assert_eq!(config.endpoints[2].role, EndpointRole::Generic);
        assert_eq!(config.history.context_turns, 5);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::parse(
            r#"
[[endpoints]]
name = "only"
url = "https://api.example.org/chat"
role = "generic"
"#,
        )
        .unwrap();

        assert_eq!(config.dispatcher.request_timeout_secs, 30);
        assert_eq!(config.history.max_messages, 50);
        assert_eq!(config.query.urgency, "normal");
        assert!(config.query.family_context);
    }

    #[test]
    fn test_healthy_first_policy() {
        let config = Config::parse(
            r#"
[dispatcher]
health_policy = "healthy_first"

[[endpoints]]
name = "only"
url = "https://api.example.org/chat"
role = "conversational"
"#,
        )
        .unwrap();

        assert_eq!(config.dispatcher.health_policy, HealthPolicy::HealthyFirst);
    }

    #[test]
    fn test_rejects_missing_endpoints() {
        assert!(Config::parse("[dispatcher]\nrequest_timeout_secs = 10\n").is_err());
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let result = Config::parse(
            r#"
[[endpoints]]
name = "a"
url = "https://one.example.org"
role = "generic"

[[endpoints]]
name = "a"
url = "https://two.example.org"
role = "generic"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_bad_url() {
        let result = Config::parse(
            r#"
[[endpoints]]
name = "a"
url = "ftp://one.example.org"
role = "generic"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let result = Config::parse(
            r#"
[dispatcher]
request_timeout_secs = 0

[[endpoints]]
name = "a"
url = "https://one.example.org"
role = "generic"
"#,
        );
        assert!(result.is_err());
    }
}
