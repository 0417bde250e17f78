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

use serde_json::{json, Map, Value};

use super::types::{EndpointRole, Query};

/// Build the request body an endpoint of the given role expects
pub fn build_payload(role: EndpointRole, query: &Query) -> Value {
    match role {
        EndpointRole::Conversational => conversational_payload(query),
        EndpointRole::Enhancement => enhancement_payload(query),
        EndpointRole::Generic => generic_payload(query),
    }
}

fn conversational_payload(query: &Query) -> Value {
    let mut context = Map::new();
    context.insert("urgency".to_string(), json!(query.urgency));
    context.insert("family_context".to_string(), json!(query.family_context));
    if let Some(location) = &query.location {
        context.insert("location".to_string(), json!(location));
    }

    json!({
        "message": query.text,
        "language": query.language,
        "style": query.style,
        "conversation_history": query.recent_turns,
        "context": context,
        "accessibility": {
            "voice": query.voice,
            "speech_rate": query.speech_rate,
        },
    })
}

fn enhancement_payload(query: &Query) -> Value {
    let mut payload = json!({
        "query": query.text,
        "language": query.language,
        "urgency": query.urgency,
        "family_context": query.family_context,
        "include_resources": true,
    });
    if let (Some(location), Some(obj)) = (&query.location, payload.as_object_mut()) {
        obj.insert("location".to_string(), json!(location));
    }
    payload
}

fn generic_payload(query: &Query) -> Value {
    let context = query
        .recent_turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.content))
        .collect::<Vec<_>>()
        .join("\n");

    json!({
        "prompt": query.text,
        "language": query.language,
        "context": context,
    })
}
