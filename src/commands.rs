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

use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::cli::{Commands, HistoryCommand, LocationArgs, PrefsCommand};
use crate::config::Config;
use crate::dispatch::{Dispatcher, GeoLocation, HealthResetTask, Query};
use crate::formatting;
use crate::history::{ChatStorage, FileStorage, Preferences};
use crate::session::{ChatSession, SessionError};

const PROBE_TEXT: &str = "ping";

pub async fn execute(config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Ask {
            question,
            conversation,
            location,
            format,
        } => ask(config, question.join(" "), conversation, location, &format).await,
        Commands::Chat {
            conversation,
            location,
        } => chat(config, conversation, location).await,
        Commands::Health { probe } => health(config, probe).await,
        Commands::Endpoints => {
            print!("{}", formatting::format_endpoints(&config.endpoints));
            Ok(())
        }
        Commands::History { command } => history(config, command),
        Commands::Prefs { command } => prefs(config, command),
    }
}

fn open_storage(config: &Config) -> Result<Arc<dyn ChatStorage>> {
    Ok(Arc::new(FileStorage::open_default(config.history.clone())?))
}

fn location(args: LocationArgs) -> Option<GeoLocation> {
    match (args.lat, args.lon) {
        (Some(latitude), Some(longitude)) => Some(GeoLocation {
            latitude,
            longitude,
        }),
        _ => None,
    }
}

fn open_session(
    config: &Config,
    conversation: Option<String>,
    location_args: LocationArgs,
) -> Result<ChatSession> {
    let dispatcher = Arc::new(Dispatcher::from_config(config)?);
    let storage = open_storage(config)?;
    let session = match conversation {
        Some(id) => ChatSession::resume(dispatcher, storage, config, id),
        None => ChatSession::new(dispatcher, storage, config),
    };
    Ok(session.with_location(location(location_args)))
}

async fn ask(
    config: &Config,
    question: String,
    conversation: Option<String>,
    location_args: LocationArgs,
    format: &str,
) -> Result<()> {
    let session = open_session(config, conversation, location_args)?;
    let response = session.submit(&question).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", formatting::format_response(&response));
        eprintln!("conversation: {}", session.conversation_id());
    }

    if !response.success {
        std::process::exit(2);
    }
    Ok(())
}

async fn chat(
    config: &Config,
    conversation: Option<String>,
    location_args: LocationArgs,
) -> Result<()> {
    let session = open_session(config, conversation, location_args)?;
    let _reset_task = HealthResetTask::spawn(
        session.dispatcher().health(),
        Duration::from_secs(config.dispatcher.health_reset_secs),
    );

    println!(
        "Conversation {} (type /help for commands, /quit to leave)",
        session.conversation_id()
    );

    let mut reader = BufReader::new(stdin());
    let mut line = String::new();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            debug!("EOF received, ending chat");
            break;
        }

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => println!("/health  show endpoint health\n/reset   mark all endpoints healthy\n/quit    leave the chat"),
            "/health" => {
                let dispatcher = session.dispatcher();
                let snapshot = dispatcher.health().snapshot().await;
                print!(
                    "{}",
                    formatting::format_health(dispatcher.endpoints(), &snapshot)
                );
            }
            "/reset" => {
                session.dispatcher().reset_health().await;
                println!("All endpoints marked healthy");
            }
            text => match session.submit(text).await {
                Ok(response) => print!("{}", formatting::format_response(&response)),
                Err(SessionError::Busy) | Err(SessionError::EmptyMessage) => {}
                Err(e) => return Err(e.into()),
            },
        }
    }

    Ok(())
}

async fn health(config: &Config, probe: bool) -> Result<()> {
    let dispatcher = Dispatcher::from_config(config)?;

    if probe {
        let results = dispatcher.probe_all(&Query::new(PROBE_TEXT)).await;
        print!("{}", formatting::format_probe_results(&results));
        println!();
    }

    let snapshot = dispatcher.health().snapshot().await;
    print!(
        "{}",
        formatting::format_health(dispatcher.endpoints(), &snapshot)
    );
    Ok(())
}

fn history(config: &Config, command: HistoryCommand) -> Result<()> {
    let storage = open_storage(config)?;

    match command {
        HistoryCommand::List { format } => {
            let conversations = storage.load_history()?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&conversations)?);
            } else {
                println!("{}", formatting::format_conversation_list(&conversations));
            }
        }
        HistoryCommand::Show {
            conversation_id,
            format,
        } => {
            let conversation = storage
                .conversation(&conversation_id)?
                .ok_or_else(|| anyhow::anyhow!("Conversation not found: {}", conversation_id))?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&conversation)?);
            } else {
                print!("{}", formatting::format_conversation(&conversation));
            }
        }
        HistoryCommand::Clear { yes } => {
            if !yes && !confirm("Delete all stored conversations?")? {
                println!("Cancelled");
                return Ok(());
            }
            storage.clear_history()?;
            println!("History cleared");
        }
    }

    Ok(())
}

fn prefs(config: &Config, command: PrefsCommand) -> Result<()> {
    let storage = open_storage(config)?;

    match command {
        PrefsCommand::Show { format } => {
            let preferences = storage.load_preferences()?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&preferences)?);
            } else {
                print!("{}", formatting::format_preferences(&preferences));
            }
        }
        PrefsCommand::Set {
            language,
            style,
            voice,
            speech_rate,
            high_contrast,
            large_text,
            dyslexia_font,
            reduce_motion,
        } => {
            let mut preferences = storage.load_preferences()?;
            if let Some(language) = language {
                preferences.language = language;
            }
            if let Some(style) = style {
                preferences.style = style;
            }
            if let Some(voice) = voice {
                preferences.voice = Some(voice).filter(|v| !v.is_empty());
            }
            if let Some(rate) = speech_rate {
                preferences.speech_rate = rate;
            }
            if let Some(on) = high_contrast {
                preferences.high_contrast = on;
            }
            if let Some(on) = large_text {
                preferences.large_text = on;
            }
            if let Some(on) = dyslexia_font {
                preferences.dyslexia_font = on;
            }
            if let Some(on) = reduce_motion {
                preferences.reduce_motion = on;
            }

            let preferences = preferences.sanitized();
            storage.save_preferences(&preferences)?;
            print!("{}", formatting::format_preferences(&preferences));
        }
        PrefsCommand::Reset => {
            storage.save_preferences(&Preferences::default())?;
            println!("Preferences restored to defaults");
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
