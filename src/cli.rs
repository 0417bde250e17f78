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

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "assistdesk")]
#[command(version)]
#[command(about = "Ask an AI assistant through a prioritized list of fallback endpoints", long_about = None)]
pub struct Cli {
    /// Use this config file instead of the one in the data directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        #[arg(required = true)]
        question: Vec<String>,

        /// Continue an existing conversation
        #[arg(short, long)]
        conversation: Option<String>,

        #[command(flatten)]
        location: LocationArgs,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Interactive chat session (type /help for commands)
    Chat {
        /// Continue an existing conversation
        #[arg(short, long)]
        conversation: Option<String>,

        #[command(flatten)]
        location: LocationArgs,
    },

    /// Show endpoint health
    Health {
        /// Send a short probe to every endpoint first
        #[arg(short, long)]
        probe: bool,
    },

    /// List configured endpoints in priority order
    Endpoints,

    /// Stored conversations
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Accessibility and voice preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct LocationArgs {
    /// Latitude to share with the assistant
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude to share with the assistant
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List stored conversations, most recent first
    List {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show all messages of one conversation
    Show {
        conversation_id: String,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Delete all stored conversations
    Clear {
        /// Confirm deletion without prompting
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum PrefsCommand {
    /// Show current preferences
    Show {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Change one or more preferences
    Set {
        /// Language tag, e.g. en or es
        #[arg(long)]
        language: Option<String>,

        /// Answer style, e.g. simple or detailed
        #[arg(long)]
        style: Option<String>,

        /// Voice name for speech playback
        #[arg(long)]
        voice: Option<String>,

        /// Speech rate from 0.5 to 2.0
        #[arg(long)]
        speech_rate: Option<f32>,

        #[arg(long)]
        high_contrast: Option<bool>,

        #[arg(long)]
        large_text: Option<bool>,

        #[arg(long)]
        dyslexia_font: Option<bool>,

        #[arg(long)]
        reduce_motion: Option<bool>,
    },

    /// Restore default preferences
    Reset,
}
