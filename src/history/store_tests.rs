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

#[cfg(test)]
mod tests {
    use super::super::store::{ChatStorage, FileStorage, MemoryStorage};
    use super::super::types::{ChatHistoryEntry, Conversation, Preferences, Role};
    use crate::config::HistoryConfig;
    use tempfile::TempDir;

    fn limits(max_messages: usize, max_conversations: usize) -> HistoryConfig {
        HistoryConfig {
            max_messages,
            max_conversations,
            ..HistoryConfig::default()
        }
    }

    fn say(storage: &dyn ChatStorage, conversation: &str, role: Role, text: &str) {
        storage
            .append_history(ChatHistoryEntry::new(role, text, conversation))
            .unwrap();
    }

    #[test]
    fn test_conversation_push_drops_oldest() {
        let mut conversation = Conversation::new("c1");
        for i in 0..5 {
            conversation.push(ChatHistoryEntry::new(Role::User, format!("m{}", i), "c1"), 3);
        }

        let contents: Vec<&str> = conversation
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["m2", "m3", "m4"]);
        assert_eq!(conversation.recent(2).len(), 2);
        assert_eq!(conversation.recent(2)[0].content, "m3");
        assert_eq!(conversation.recent(10).len(), 3);
    }

    #[test]
    fn test_memory_storage_message_cap() {
        let storage = MemoryStorage::new(limits(4, 10));
        for i in 0..6 {
            say(&storage, "c1", Role::User, &format!("question {}", i));
        }

        let history = storage.load_history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].messages.len(), 4);
        assert_eq!(history[0].messages[0].content, "question 2");
        assert_eq!(history[0].messages[3].content, "question 5");
    }

    #[test]
    fn test_conversation_cap_drops_least_recently_updated() {
        let storage = MemoryStorage::new(limits(10, 2));
        say(&storage, "first", Role::User, "a");
        say(&storage, "second", Role::User, "b");
        say(&storage, "first", Role::Assistant, "c");
        say(&storage, "third", Role::User, "d");

        let ids: Vec<String> = storage
            .load_history()
            .unwrap()
            .into_iter()
            .map(|c| c.conversation_id)
            .collect();
        assert_eq!(ids, vec!["third", "first"]);
    }

    #[test]
    fn test_memory_storage_preferences_round_trip() {
        let storage = MemoryStorage::new(HistoryConfig::default());
        assert_eq!(storage.load_preferences().unwrap(), Preferences::default());

        let preferences = Preferences {
            language: "es".to_string(),
            high_contrast: true,
            ..Preferences::default()
        };
        storage.save_preferences(&preferences).unwrap();
        assert_eq!(storage.load_preferences().unwrap().language, "es");
    }

    #[test]
    fn test_file_storage_missing_files_load_defaults() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("history"), HistoryConfig::default()).unwrap();

        assert!(dir.path().join("history").is_dir());
        assert_eq!(storage.load_preferences().unwrap(), Preferences::default());
        assert!(storage.load_history().unwrap().is_empty());
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        {
            let storage = FileStorage::new(dir.path(), limits(10, 5)).unwrap();
            say(&storage, "c1", Role::User, "Where is the clinic?");
            say(&storage, "c1", Role::Assistant, "On Main Street.");
            storage
                .save_preferences(&Preferences {
                    dyslexia_font: true,
                    speech_rate: 1.5,
                    ..Preferences::default()
                })
                .unwrap();
        }

        let storage = FileStorage::new(dir.path(), limits(10, 5)).unwrap();
        let conversation = storage.conversation("c1").unwrap().unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[1].role, Role::Assistant);
        assert_eq!(conversation.version, 1);
        assert!(conversation.last_updated >= conversation.timestamp);

        let preferences = storage.load_preferences().unwrap();
        assert!(preferences.dyslexia_font);
        assert_eq!(preferences.speech_rate, 1.5);
        assert!(storage.conversation("missing").unwrap().is_none());
    }

    #[test]
    fn test_file_storage_clear_history() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path(), HistoryConfig::default()).unwrap();
        say(&storage, "c1", Role::User, "hello");

        storage.clear_history().unwrap();
        storage.clear_history().unwrap();

        assert!(storage.load_history().unwrap().is_empty());
    }

    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("conversations.json"), "{not json").unwrap();
        let storage = FileStorage::new(dir.path(), HistoryConfig::default()).unwrap();

        assert!(storage.load_history().is_err());
    }

    #[test]
    fn test_partial_preferences_fill_defaults() {
        let preferences: Preferences = serde_json::from_str(r#"{"language":"fr"}"#).unwrap();
        assert_eq!(preferences.language, "fr");
        assert_eq!(preferences.speech_rate, 1.0);
        assert!(!preferences.large_text);
    }

    #[test]
    fn test_preferences_sanitized() {
        let preferences = Preferences {
            language: "  ".to_string(),
            speech_rate: 9.0,
            ..Preferences::default()
        }
        .sanitized();

        assert_eq!(preferences.language, "en");
        assert_eq!(preferences.speech_rate, 2.0);
    }

    #[test]
    fn test_non_finite_speech_rate_survives_save_and_load() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path(), HistoryConfig::default()).unwrap();

        for raw in ["NaN", "inf", "-inf"] {
            let preferences = Preferences {
                speech_rate: raw.parse().unwrap(),
                ..Preferences::default()
            }
            .sanitized();
            assert_eq!(preferences.speech_rate, 1.0);

            storage.save_preferences(&preferences).unwrap();
            assert_eq!(storage.load_preferences().unwrap().speech_rate, 1.0);
        }
    }
}
