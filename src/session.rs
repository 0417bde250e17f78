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

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, HistoryConfig, QueryConfig};
use crate::constants::MAX_RECENT_TURNS;
use crate::dispatch::{Dispatcher, GeoLocation, NormalizedResponse, Query, Turn};
use crate::history::{ChatHistoryEntry, ChatStorage, Role};

#[derive(Error, Debug)]
pub enum SessionError {
    /// Another question from this session is still being answered
    #[error("Still waiting for the previous answer")]
    Busy,

    #[error("Message is empty")]
    EmptyMessage,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Clears the in-flight flag however `submit` exits
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One conversation between the user and the assistant.
///
/// Builds queries from the stored preferences and recent turns, and allows
/// a single dispatch at a time.
pub struct ChatSession {
    dispatcher: Arc<Dispatcher>,
    storage: Arc<dyn ChatStorage>,
    conversation_id: String,
    history: HistoryConfig,
    query_defaults: QueryConfig,
    location: Option<GeoLocation>,
    in_flight: AtomicBool,
}

impl ChatSession {
    /// Start a new conversation
    pub fn new(dispatcher: Arc<Dispatcher>, storage: Arc<dyn ChatStorage>, config: &Config) -> Self {
        Self::resume(
            dispatcher,
            storage,
            config,
            uuid::Uuid::new_v4().to_string(),
        )
    }

    /// Continue an existing conversation
    pub fn resume(
        dispatcher: Arc<Dispatcher>,
        storage: Arc<dyn ChatStorage>,
        config: &Config,
        conversation_id: String,
    ) -> Self {
        Self {
            dispatcher,
            storage,
            conversation_id,
            history: config.history.clone(),
            query_defaults: config.query.clone(),
            location: None,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_location(mut self, location: Option<GeoLocation>) -> Self {
        self.location = location;
        self
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Build the query for `text` from preferences and the prior turns of this conversation
    pub fn build_query(&self, text: &str) -> anyhow::Result<Query> {
        let preferences = self.storage.load_preferences()?.sanitized();
        let turns: Vec<Turn> = self
            .storage
            .conversation(&self.conversation_id)?
            .map(|conversation| {
                conversation
                    .recent(self.history.context_turns.min(MAX_RECENT_TURNS))
                    .iter()
                    .map(Turn::from)
                    .collect()
            })
            .unwrap_or_default();

        let mut query = Query::new(text).with_recent_turns(turns);
        query.language = preferences.language;
        query.style = preferences.style;
        query.voice = preferences.voice;
        query.speech_rate = preferences.speech_rate;
        query.urgency = self.query_defaults.urgency.clone();
        query.family_context = self.query_defaults.family_context;
        query.location = self.location;
        Ok(query)
    }

    /// Ask one question. The user message is always recorded; the answer is
    /// recorded only when an endpoint succeeded.
    pub async fn submit(&self, text: &str) -> Result<NormalizedResponse, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(conversation_id = %self.conversation_id, "Rejected overlapping submission");
            return Err(SessionError::Busy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let query = self.build_query(text)?;
        self.storage.append_history(ChatHistoryEntry::new(
            Role::User,
            text,
            &self.conversation_id,
        ))?;

        let response = self.dispatcher.dispatch(&query).await;

        if response.success {
            self.storage.append_history(ChatHistoryEntry::new(
                Role::Assistant,
                response.content.clone(),
                &self.conversation_id,
            ))?;
        }
        info!(
            conversation_id = %self.conversation_id,
            success = response.success,
            resources = response.resources.len(),
            "Question handled"
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{DispatchError, Endpoint, EndpointRole, HealthPolicy, Transport};
    use crate::history::{MemoryStorage, Preferences};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Answers every request with a canned body, optionally waiting for a gate first
    struct EchoTransport {
        reply: Value,
        gate: Option<Arc<Notify>>,
        bodies: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl Transport for EchoTransport {
        async fn post_json(
            &self,
            _endpoint: &Endpoint,
            body: &Value,
        ) -> Result<Value, DispatchError> {
            self.bodies.lock().unwrap().push(body.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok(self.reply.clone())
        }
    }

    fn test_config() -> Config {
        Config::parse(
            r#"
[[endpoints]]
name = "assistant"
url = "http://localhost:8000/api/chat"
role = "conversational"
"#,
        )
        .unwrap()
    }

    fn session_with(
        reply: Value,
        gate: Option<Arc<Notify>>,
    ) -> (Arc<ChatSession>, Arc<EchoTransport>, Arc<MemoryStorage>) {
        let config = test_config();
        let transport = Arc::new(EchoTransport {
            reply,
            gate,
            bodies: Mutex::new(Vec::new()),
        });
        let dispatcher = Arc::new(Dispatcher::new(
            vec![Endpoint::new(
                "assistant",
                "http://localhost:8000/api/chat",
                EndpointRole::Conversational,
            )],
            transport.clone(),
            Duration::from_secs(30),
            HealthPolicy::Advisory,
        ));
        let storage = Arc::new(MemoryStorage::new(config.history.clone()));
        let session = Arc::new(ChatSession::resume(
            dispatcher,
            storage.clone(),
            &config,
            "conv-1".to_string(),
        ));
        (session, transport, storage)
    }

    #[tokio::test]
    async fn test_submit_records_both_turns() {
        let (session, _, storage) =
            session_with(json!({"success": true, "content": "Try the library."}), None);

        let response = session.submit("  Where can I print?  ").await.unwrap();

        assert!(response.success);
        let conversation = storage.conversation("conv-1").unwrap().unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].content, "Where can I print?");
        assert_eq!(conversation.messages[1].role, Role::Assistant);
        assert_eq!(conversation.messages[1].content, "Try the library.");
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_failed_answer_is_not_recorded() {
        let (session, _, storage) =
            session_with(json!({"success": false, "error": "overloaded"}), None);

        let response = session.submit("Hello").await.unwrap();

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("overloaded"));
        let conversation = storage.conversation("conv-1").unwrap().unwrap();
        assert_eq!(conversation.messages.len(), 1);
        assert_eq!(conversation.messages[0].role, Role::User);
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let (session, transport, _) = session_with(json!({"success": true}), None);

        assert!(matches!(
            session.submit("   ").await,
            Err(SessionError::EmptyMessage)
        ));
        assert!(transport.bodies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_uses_preferences_and_recent_turns() {
        let (session, transport, storage) =
            session_with(json!({"success": true, "content": "ok"}), None);
        storage
            .save_preferences(&Preferences {
                language: "es".to_string(),
                voice: Some("Lucia".to_string()),
                ..Preferences::default()
            })
            .unwrap();

        for i in 0..4 {
            session.submit(&format!("question {}", i)).await.unwrap();
        }

        let query = session.build_query("next").unwrap();
        assert_eq!(query.language, "es");
        assert_eq!(query.voice.as_deref(), Some("Lucia"));
        assert_eq!(query.recent_turns.len(), 5);
        assert_eq!(query.recent_turns[0].content, "ok");
        assert_eq!(query.recent_turns[4].content, "ok");
        assert_eq!(query.recent_turns[3].content, "question 3");

        let bodies = transport.bodies.lock().unwrap();
        assert_eq!(bodies[0]["language"], "es");
        assert_eq!(bodies[0]["conversation_history"].as_array().unwrap().len(), 0);
        assert_eq!(bodies[1]["conversation_history"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_overlapping_submission_is_rejected() {
        let gate = Arc::new(Notify::new());
        let (session, _, _) = session_with(
            json!({"success": true, "content": "done"}),
            Some(gate.clone()),
        );

        let first_session = session.clone();
        let first = tokio::spawn(async move { first_session.submit("first").await });

        while !session.is_busy() {
            tokio::task::yield_now().await;
        }
        assert!(matches!(
            session.submit("second").await,
            Err(SessionError::Busy)
        ));

        gate.notify_one();
        let response = first.await.unwrap().unwrap();
        assert_eq!(response.content, "done");
        assert!(!session.is_busy());
    }
}
