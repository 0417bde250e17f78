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

use serde::{Deserialize, Serialize};

use crate::history::types::{ChatHistoryEntry, Role};

/// Request/response shape an endpoint expects
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EndpointRole {
    /// Primary conversational backend, receives the running conversation
    Conversational,
    /// Enhancement/lookup backend, answers with curated resources
    Enhancement,
    /// Generic fallback backend, accepts a flat prompt
    Generic,
}

impl std::fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointRole::Conversational => write!(f, "conversational"),
            EndpointRole::Enhancement => write!(f, "enhancement"),
            EndpointRole::Generic => write!(f, "generic"),
        }
    }
}

/// One configured backend. Order in the configuration is priority order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
    pub role: EndpointRole,
}

impl Endpoint {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, url: impl Into<String>, role: EndpointRole) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            role,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// A prior turn handed to the backends as conversational context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl From<&ChatHistoryEntry> for Turn {
    fn from(entry: &ChatHistoryEntry) -> Self {
        Self {
            role: entry.role,
            content: entry.content.clone(),
        }
    }
}

/// One user question plus the context it is asked in.
///
/// Built once per submission by the chat session and never mutated after.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Query {
    pub text: String,
    /// BCP 47 language tag, e.g. "en" or "es-MX"
    pub language: String,
    pub location: Option<GeoLocation>,
    pub urgency: String,
    /// Frame the answer for a family audience
    pub family_context: bool,
    pub style: String,
    pub voice: Option<String>,
    pub speech_rate: f32,
    /// Most recent prior turns, oldest first, at most `MAX_RECENT_TURNS`
    pub recent_turns: Vec<Turn>,
}

impl Query {
    /// Create a query with default context and no history
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: crate::constants::DEFAULT_LANGUAGE.to_string(),
            location: None,
            urgency: crate::constants::DEFAULT_URGENCY.to_string(),
            family_context: true,
            style: crate::constants::DEFAULT_STYLE.to_string(),
            voice: None,
            speech_rate: 1.0,
            recent_turns: Vec::new(),
        }
    }

    /// Attach prior turns, keeping only the most recent `MAX_RECENT_TURNS`
    pub fn with_recent_turns(mut self, turns: Vec<Turn>) -> Self {
        let skip = turns
            .len()
            .saturating_sub(crate::constants::MAX_RECENT_TURNS);
        self.recent_turns = turns.into_iter().skip(skip).collect();
        self
    }
}

/// A supporting link attached to an answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, alias = "type")]
    pub kind: String,
}

/// The single shape every backend answer is collapsed into
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedResponse {
    pub success: bool,
    pub content: String,
    pub resources: Vec<Resource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Name of the endpoint that produced the answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl NormalizedResponse {
    pub fn success(content: String, resources: Vec<Resource>, endpoint: &str) -> Self {
        Self {
            success: true,
            content,
            resources,
            error: None,
            endpoint: Some(endpoint.to_string()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: String::new(),
            resources: Vec::new(),
            error: Some(message.into()),
            endpoint: None,
        }
    }
}
