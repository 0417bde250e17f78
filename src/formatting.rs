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
use colored::Colorize;

use crate::constants::UNKNOWN_ERROR_MESSAGE;
use crate::dispatch::{DispatchError, Endpoint, EndpointHealth, NormalizedResponse};
use crate::history::{Conversation, Preferences, Role};

pub fn format_response(response: &NormalizedResponse) -> String {
    let mut output = String::new();

    if !response.success {
        let message = response.error.as_deref().unwrap_or(UNKNOWN_ERROR_MESSAGE);
        output.push_str(&format!("{} {}", "Error:".red().bold(), message));
        output.push('\n');
        return output;
    }

    output.push_str(&response.content);
    output.push('\n');

    if !response.resources.is_empty() {
        output.push('\n');
        output.push_str(&"Resources".bold().to_string());
        output.push('\n');
        for resource in &response.resources {
            let title = if resource.title.is_empty() {
                resource.url.as_str()
            } else {
                resource.title.as_str()
            };
            output.push_str(&format!("  • {}", title.blue()));
            if !resource.kind.is_empty() {
                output.push_str(&format!(" [{}]", resource.kind).bright_black().to_string());
            }
            output.push('\n');
            if !resource.url.is_empty() && resource.url != title {
                output.push_str(&format!("    {}", resource.url.bright_black()));
                output.push('\n');
            }
        }
    }

    if let Some(endpoint) = &response.endpoint {
        output.push_str(&format!("via {}", endpoint).bright_black().to_string());
        output.push('\n');
    }

    output
}

pub fn format_health(endpoints: &[Endpoint], snapshot: &[(String, EndpointHealth)]) -> String {
    let mut output = String::new();

    output.push_str(
        &format!(
            "{:<16} {:<16} {:<10} {:<7} {:<14} {}\n",
            "Endpoint", "Role", "Status", "Errors", "Last Used", "Last Error"
        )
        .bold()
        .to_string(),
    );
    output.push_str(&"─".repeat(90));
    output.push('\n');

    for (name, health) in snapshot {
        let role = endpoints
            .iter()
            .find(|e| &e.name == name)
            .map(|e| e.role.to_string())
            .unwrap_or_default();
        // Pad before colouring so escape codes do not break alignment
        let status = if health.healthy {
            format!("{:<10}", "healthy").green().to_string()
        } else {
            format!("{:<10}", "unhealthy").red().to_string()
        };
        let last_used = health
            .last_used_at
            .map(format_relative_time)
            .unwrap_or_else(|| "never".to_string());
        let last_error = health
            .last_error
            .as_deref()
            .map(|e| truncate_chars(e, 40))
            .unwrap_or_default();

        output.push_str(&format!(
            "{:<16} {:<16} {} {:<7} {:<14} {}\n",
            truncate_chars(name, 16),
            role,
            status,
            health.error_count,
            last_used,
            last_error
        ));
    }

    output
}

pub fn format_probe_results(results: &[(String, Result<(), DispatchError>)]) -> String {
    let mut output = String::new();
    for (name, outcome) in results {
        match outcome {
            Ok(()) => output.push_str(&format!("{} {}\n", "✓".green(), name)),
            Err(e) => output.push_str(&format!("{} {}: {}\n", "✗".red(), name, e)),
        }
    }
    output
}

pub fn format_endpoints(endpoints: &[Endpoint]) -> String {
    let mut output = String::new();
    for (index, endpoint) in endpoints.iter().enumerate() {
        output.push_str(&format!(
            "{}. {} ({})\n   {}\n",
            index + 1,
            endpoint.name.bold(),
            endpoint.role,
            endpoint.url.bright_black()
        ));
    }
    output
}

pub fn format_conversation_list(conversations: &[Conversation]) -> String {
    if conversations.is_empty() {
        return "No conversations stored".to_string();
    }

    let mut output = String::new();
    output.push_str(
        &format!(
            "{:<38} {:<9} {:<16} {}\n",
            "Conversation", "Messages", "Updated", "Last Message"
        )
        .bold()
        .to_string(),
    );
    output.push_str(&"─".repeat(100));
    output.push('\n');

    for conversation in conversations {
        let preview = conversation
            .messages
            .last()
            .map(|m| preview_line(&m.content, 30))
            .unwrap_or_default();

        output.push_str(&format!(
            "{:<38} {:<9} {:<16} {}\n",
            conversation.conversation_id,
            conversation.messages.len(),
            format_relative_time(conversation.last_updated),
            preview
        ));
    }

    output
}

pub fn format_conversation(conversation: &Conversation) -> String {
    let mut output = String::new();

    output.push_str(&format!("Conversation {}", conversation.conversation_id).bold().to_string());
    output.push('\n');
    output.push_str(&"━".repeat(60));
    output.push('\n');

    for message in &conversation.messages {
        let speaker = match message.role {
            Role::User => "You".cyan().bold(),
            Role::Assistant => "Assistant".green().bold(),
        };
        output.push_str(&format!(
            "{} {}\n{}\n\n",
            speaker,
            message.timestamp.format("%Y-%m-%d %H:%M").to_string().bright_black(),
            message.content
        ));
    }

    output
}

pub fn format_preferences(preferences: &Preferences) -> String {
    let flag = |on: bool| if on { "on" } else { "off" };
    let mut output = String::new();

    output.push_str(&"Preferences".bold().to_string());
    output.push('\n');
    output.push_str(&format!("Language: {}\n", preferences.language));
    output.push_str(&format!("Style: {}\n", preferences.style));
    output.push_str(&format!(
        "Voice: {}\n",
        preferences.voice.as_deref().unwrap_or("default")
    ));
    output.push_str(&format!("Speech Rate: {:.1}\n", preferences.speech_rate));
    output.push_str(&format!("High Contrast: {}\n", flag(preferences.high_contrast)));
    output.push_str(&format!("Large Text: {}\n", flag(preferences.large_text)));
    output.push_str(&format!("Dyslexia Font: {}\n", flag(preferences.dyslexia_font)));
    output.push_str(&format!("Reduce Motion: {}\n", flag(preferences.reduce_motion)));

    output
}

fn format_relative_time(dt: DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(dt);

    if duration.num_days() > 0 {
        format!("{} days ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{} hours ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{} minutes ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// First line of `text`, cut to `max_chars` with an ellipsis
fn preview_line(text: &str, max_chars: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > max_chars {
        format!("{}...", truncate_chars(line, max_chars - 3))
    } else {
        line.to_string()
    }
}

fn truncate_chars(input: &str, max_chars: usize) -> String {
    input.chars().take(max_chars).collect()
}
