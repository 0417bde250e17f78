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

/// Per-attempt wait before an endpoint is considered timed out
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Interval of the periodic mass health reset
pub const DEFAULT_HEALTH_RESET_SECS: u64 = 300;

/// Upper bound on prior turns sent along with a query
pub const MAX_RECENT_TURNS: usize = 5;

pub const DEFAULT_MAX_MESSAGES: usize = 50;
pub const DEFAULT_MAX_CONVERSATIONS: usize = 10;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_URGENCY: &str = "normal";
pub const DEFAULT_STYLE: &str = "simple";

pub const TIMEOUT_MESSAGE: &str = "Request timed out.";
pub const ALL_UNAVAILABLE_MESSAGE: &str =
    "All services are currently unavailable. Please try again later.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";
pub const PLACEHOLDER_CONTENT: &str = "Response received";

/// Bumped whenever the persisted conversation layout changes
pub const CONVERSATION_FORMAT_VERSION: u32 = 1;

pub const USER_AGENT: &str = concat!("assistdesk/", env!("CARGO_PKG_VERSION"));
