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

use crate::constants::{CONVERSATION_FORMAT_VERSION, DEFAULT_LANGUAGE, DEFAULT_STYLE};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message of a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatHistoryEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub conversation_id: String,
}

impl ChatHistoryEntry {
    pub fn new(role: Role, content: impl Into<String>, conversation_id: &str) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            conversation_id: conversation_id.to_string(),
        }
    }
}

/// A persisted conversation with its capped message list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    pub conversation_id: String,
    pub messages: Vec<ChatHistoryEntry>,
    /// When the conversation was started
    pub timestamp: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub version: u32,
}

impl Conversation {
    pub fn new(conversation_id: &str) -> Self {
        let now = Utc::now();
        Self {
            conversation_id: conversation_id.to_string(),
            messages: Vec::new(),
            timestamp: now,
            last_updated: now,
            version: CONVERSATION_FORMAT_VERSION,
        }
    }

    /// Append a message, dropping the oldest ones beyond `max_messages`
    pub fn push(&mut self, entry: ChatHistoryEntry, max_messages: usize) {
        self.last_updated = entry.timestamp.max(self.last_updated);
        self.messages.push(entry);
        if self.messages.len() > max_messages {
            let excess = self.messages.len() - max_messages;
            self.messages.drain(..excess);
        }
    }

    /// The last `n` messages, oldest first
    pub fn recent(&self, n: usize) -> &[ChatHistoryEntry] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}

/// Accessibility and voice preferences owned by the preferences panel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Preferences {
    pub language: String,
    /// Answer style requested from the backends, e.g. "simple" or "detailed"
    pub style: String,
    pub voice: Option<String>,
    pub speech_rate: f32,
    pub high_contrast: bool,
    pub large_text: bool,
    pub dyslexia_font: bool,
    pub reduce_motion: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            style: DEFAULT_STYLE.to_string(),
            voice: None,
            speech_rate: 1.0,
            high_contrast: false,
            large_text: false,
            dyslexia_font: false,
            reduce_motion: false,
        }
    }
}

impl Preferences {
    /// Clamp values into the ranges speech playback accepts
    pub fn sanitized(mut self) -> Self {
        self.speech_rate = if self.speech_rate.is_finite() {
            self.speech_rate.clamp(0.5, 2.0)
        } else {
            1.0
        };
        if self.language.trim().is_empty() {
            self.language = DEFAULT_LANGUAGE.to_string();
        }
        self
    }
}
