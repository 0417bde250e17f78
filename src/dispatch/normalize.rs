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

//! Collapsing backend answers into one content/resources pair.
//!
//! Backends answer in one of three known shapes. They are tried in a fixed
//! order and the first one carrying content wins:
//!
//! 1. `{"mega_response": "..."}` or `{"mega_response": {"content": "...", "resources": [...]}}`
//! 2. `{"data": {"content": "...", "resources": [...]}}`
//! 3. `{"content": "..."}` or `{"response": "..."}`, with optional top-level `resources`
//!
//! Anything else yields the placeholder text. Supporting a new backend means
//! adding a variant to `ResponseShape` and a branch to `ResponseShape::detect`.

use serde_json::Value;
use tracing::debug;

use super::types::{EndpointRole, Resource};
use crate::constants::PLACEHOLDER_CONTENT;

/// The closed set of answer shapes the backends are known to produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    /// Aggregated answer under `mega_response`
    Mega {
        content: String,
        resources: Vec<Resource>,
    },
    /// Wrapped answer under `data.content`
    Data {
        content: String,
        resources: Vec<Resource>,
    },
    /// Top-level `content` or `response`
    Flat {
        content: String,
        resources: Vec<Resource>,
    },
    /// Nothing recognisable
    Unknown,
}

/// Content and resources extracted from a backend answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub content: String,
    pub resources: Vec<Resource>,
}

impl ResponseShape {
    pub fn detect(raw: &Value) -> Self {
        if let Some(shape) = Self::mega(raw) {
            return shape;
        }

        if let Some(content) = populated_str(&raw["data"]["content"]) {
            return ResponseShape::Data {
                content,
                resources: parse_resources(&raw["data"]["resources"]),
            };
        }

        if let Some(content) =
            populated_str(&raw["content"]).or_else(|| populated_str(&raw["response"]))
        {
            return ResponseShape::Flat {
                content,
                resources: parse_resources(&raw["resources"]),
            };
        }

        ResponseShape::Unknown
    }

    fn mega(raw: &Value) -> Option<Self> {
        let mega = raw.get("mega_response")?;

        if let Some(content) = populated_str(mega) {
            return Some(ResponseShape::Mega {
                content,
                resources: parse_resources(&raw["resources"]),
            });
        }

        let content =
            populated_str(&mega["content"]).or_else(|| populated_str(&mega["response"]))?;
        Some(ResponseShape::Mega {
            content,
            resources: parse_resources(&mega["resources"]),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResponseShape::Mega { .. } => "mega_response",
            ResponseShape::Data { .. } => "data",
            ResponseShape::Flat { .. } => "flat",
            ResponseShape::Unknown => "unknown",
        }
    }

    pub fn into_normalized(self) -> Normalized {
        match self {
            ResponseShape::Mega { content, resources }
            | ResponseShape::Data { content, resources }
            | ResponseShape::Flat { content, resources } => Normalized { content, resources },
            ResponseShape::Unknown => Normalized {
                content: PLACEHOLDER_CONTENT.to_string(),
                resources: Vec::new(),
            },
        }
    }
}

/// Collapse a raw backend answer into content and resources
pub fn normalize(raw: &Value, role: EndpointRole) -> Normalized {
    let shape = ResponseShape::detect(raw);
    debug!(role = %role, shape = shape.name(), "Normalized endpoint response");
    shape.into_normalized()
}

fn populated_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Lenient resource list parsing: entries that are not objects are skipped
fn parse_resources(value: &Value) -> Vec<Resource> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .filter_map(|item| serde_json::from_value::<Resource>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
