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

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

use super::types::{ChatHistoryEntry, Conversation, Preferences};
use crate::config::HistoryConfig;

const PREFERENCES_FILE: &str = "preferences.json";
const CONVERSATIONS_FILE: &str = "conversations.json";

/// Persistence for preferences and chat history.
///
/// Conversations come back most recently updated first.
pub trait ChatStorage: Send + Sync {
    fn load_preferences(&self) -> Result<Preferences>;
    fn save_preferences(&self, preferences: &Preferences) -> Result<()>;
    fn load_history(&self) -> Result<Vec<Conversation>>;
    /// Append one message to its conversation, creating the conversation if needed
    fn append_history(&self, entry: ChatHistoryEntry) -> Result<()>;
    fn clear_history(&self) -> Result<()>;

    fn conversation(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        Ok(self
            .load_history()?
            .into_iter()
            .find(|c| c.conversation_id == conversation_id))
    }
}

/// Add `entry` to the conversation list and enforce both caps.
/// The touched conversation moves to the front, so the list stays ordered
/// from most to least recently updated.
fn append_entry(
    conversations: &mut Vec<Conversation>,
    entry: ChatHistoryEntry,
    limits: &HistoryConfig,
) {
    let mut conversation = match conversations
        .iter()
        .position(|c| c.conversation_id == entry.conversation_id)
    {
        Some(index) => conversations.remove(index),
        None => Conversation::new(&entry.conversation_id),
    };
    conversation.push(entry, limits.max_messages);
    conversations.insert(0, conversation);

    if conversations.len() > limits.max_conversations {
        debug!(
            dropped = conversations.len() - limits.max_conversations,
            "Dropping least recently updated conversations"
        );
        conversations.truncate(limits.max_conversations);
    }
}

/// JSON files in a per-user data directory
pub struct FileStorage {
    dir: PathBuf,
    limits: HistoryConfig,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>, limits: HistoryConfig) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        Ok(Self {
            dir,
            limits,
            write_lock: Mutex::new(()),
        })
    }

    /// Storage under the default per-user data directory
    pub fn open_default(limits: HistoryConfig) -> Result<Self> {
        Self::new(crate::storage::get_history_dir()?, limits)
    }

    fn read_or_default<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(T::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(value)?;

        fs::write(&tmp, content).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

impl ChatStorage for FileStorage {
    fn load_preferences(&self) -> Result<Preferences> {
        self.read_or_default(PREFERENCES_FILE)
    }

    fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Storage lock poisoned"))?;
        self.write(PREFERENCES_FILE, preferences)
    }

    fn load_history(&self) -> Result<Vec<Conversation>> {
        self.read_or_default(CONVERSATIONS_FILE)
    }

    fn append_history(&self, entry: ChatHistoryEntry) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Storage lock poisoned"))?;
        let mut conversations: Vec<Conversation> = self.read_or_default(CONVERSATIONS_FILE)?;
        append_entry(&mut conversations, entry, &self.limits);
        self.write(CONVERSATIONS_FILE, &conversations)
    }

    fn clear_history(&self) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Storage lock poisoned"))?;
        let path = self.dir.join(CONVERSATIONS_FILE);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}

/// Process-local storage, used by tests and when persistence is disabled
pub struct MemoryStorage {
    limits: HistoryConfig,
    preferences: Mutex<Preferences>,
    conversations: Mutex<Vec<Conversation>>,
}

impl MemoryStorage {
    pub fn new(limits: HistoryConfig) -> Self {
        Self {
            limits,
            preferences: Mutex::new(Preferences::default()),
            conversations: Mutex::new(Vec::new()),
        }
    }
}

impl ChatStorage for MemoryStorage {
    fn load_preferences(&self) -> Result<Preferences> {
        let preferences = self
            .preferences
            .lock()
            .map_err(|_| anyhow::anyhow!("Preferences lock poisoned"))?;
        Ok(preferences.clone())
    }

    fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        let mut current = self
            .preferences
            .lock()
            .map_err(|_| anyhow::anyhow!("Preferences lock poisoned"))?;
        *current = preferences.clone();
        Ok(())
    }

    fn load_history(&self) -> Result<Vec<Conversation>> {
        let conversations = self
            .conversations
            .lock()
            .map_err(|_| anyhow::anyhow!("History lock poisoned"))?;
        Ok(conversations.clone())
    }

    fn append_history(&self, entry: ChatHistoryEntry) -> Result<()> {
        let mut conversations = self
            .conversations
            .lock()
            .map_err(|_| anyhow::anyhow!("History lock poisoned"))?;
        append_entry(&mut conversations, entry, &self.limits);
        Ok(())
    }

    fn clear_history(&self) -> Result<()> {
        self.conversations
            .lock()
            .map_err(|_| anyhow::anyhow!("History lock poisoned"))?
            .clear();
        Ok(())
    }
}
