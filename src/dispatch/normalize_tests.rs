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
    use super::super::normalize::{normalize, ResponseShape};
    use super::super::types::{EndpointRole, Resource};
    use serde_json::json;

    #[test]
    fn test_mega_response_wins_over_top_level_content() {
        let raw = json!({
            "success": true,
            "mega_response": "Combined answer",
            "content": "Plain answer"
        });

        let normalized = normalize(&raw, EndpointRole::Generic);
        assert_eq!(normalized.content, "Combined answer");
    }

    #[test]
    fn test_mega_response_object_with_resources() {
        let raw = json!({
            "success": true,
            "mega_response": {
                "content": "Here are some options",
                "resources": [
                    {"title": "Shelter list", "url": "https://example.org/shelters", "type": "directory"},
                    "not-a-resource"
                ]
            },
            "data": {"content": "ignored"}
        });

        let normalized = normalize(&raw, EndpointRole::Enhancement);
        assert_eq!(normalized.content, "Here are some options");
        assert_eq!(
            normalized.resources,
            vec![Resource {
                title: "Shelter list".to_string(),
                url: "https://example.org/shelters".to_string(),
                kind: "directory".to_string(),
            }]
        );
    }

    #[test]
    fn test_data_content_wins_over_flat_fields() {
        let raw = json!({
            "success": true,
            "data": {
                "content": "Wrapped answer",
                "resources": [{"title": "Guide", "url": "https://example.org/guide", "kind": "pdf"}]
            },
            "response": "Flat answer"
        });

        let shape = ResponseShape::detect(&raw);
        assert_eq!(shape.name(), "data");

        let normalized = shape.into_normalized();
        assert_eq!(normalized.content, "Wrapped answer");
        assert_eq!(normalized.resources.len(), 1);
        assert_eq!(normalized.resources[0].kind, "pdf");
    }

    #[test]
    fn test_content_wins_over_response() {
        let raw = json!({"content": "From content", "response": "From response"});
        assert_eq!(
            normalize(&raw, EndpointRole::Conversational).content,
            "From content"
        );
    }

    #[test]
    fn test_response_field_alone() {
        let raw = json!({"success": true, "response": "Here is your answer"});

        let normalized = normalize(&raw, EndpointRole::Generic);
        assert_eq!(normalized.content, "Here is your answer");
        assert!(normalized.resources.is_empty());
    }

    #[test]
    fn test_empty_fields_fall_through() {
        let raw = json!({
            "mega_response": "",
            "data": {"content": "   "},
            "content": null,
            "response": "Fallback text"
        });

        assert_eq!(
            normalize(&raw, EndpointRole::Generic).content,
            "Fallback text"
        );
    }

    #[test]
    fn test_unrecognised_shape_uses_placeholder() {
        let raw = json!({"success": true, "answer": "wrong field"});

        let shape = ResponseShape::detect(&raw);
        assert_eq!(shape, ResponseShape::Unknown);

        let normalized = shape.into_normalized();
        assert_eq!(normalized.content, "Response received");
        assert!(normalized.resources.is_empty());
    }

    #[test]
    fn test_non_object_body_uses_placeholder() {
        let raw = json!(["unexpected", "array"]);
        assert_eq!(
            normalize(&raw, EndpointRole::Enhancement).content,
            "Response received"
        );
    }
}
