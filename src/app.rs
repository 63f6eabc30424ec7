// ABOUTME: App orchestrator — wires the HTTP service client, session loop, and stdin REPL.
// ABOUTME: The REPL stands in for the mobile screens: text lines plus /voice, /photo, /log commands.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use crate::config::Config;
use crate::media::{self, MediaKind};
use crate::service::client::{HttpLogService, LogService};
use crate::service::types::TurnInput;
use crate::session::runner::{self, SessionEvent, SessionParams, UserEvent};
use crate::session::transcript::Speaker;

/// A parsed REPL command.
#[derive(Debug, PartialEq)]
enum Command {
    /// A plain chat line.
    Text(String),
    /// Capture a media file and send it with an optional caption.
    Media {
        kind: MediaKind,
        path: String,
        caption: Option<String>,
    },
    ForceLog,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Top-level application that owns the session for one run.
pub struct App {
    config: Config,
    base_url: String,
    token: String,
}

impl App {
    pub fn new(config: Config, base_url: String, token: String) -> Self {
        Self {
            config,
            base_url,
            token,
        }
    }

    /// Run the chat REPL until the user quits. The session (and its
    /// transcript) lives exactly as long as this call.
    pub async fn run(self) -> anyhow::Result<()> {
        let service: Arc<dyn LogService> =
            Arc::new(HttpLogService::new(&self.base_url, &self.token));

        let (user_tx, user_rx) = mpsc::channel::<UserEvent>(16);
        let (session_tx, mut session_rx) = mpsc::channel::<SessionEvent>(64);

        let params = SessionParams {
            service: service.clone(),
            greeting: Some(self.config.chat.greeting.clone()),
            confirm_delay: Duration::from_millis(self.config.chat.confirm_delay_ms),
        };
        let session_handle = tokio::spawn(runner::run_session_loop(params, user_rx, session_tx));

        println!("carelog — type how you're feeling, /help for commands");

        let assistant = self.config.chat.assistant_name.clone();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut pending = false;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Ok(Some(line)) = line else { break };
                    match parse_command(&line) {
                        Command::Quit => break,
                        Command::Help => print_help(),
                        Command::Empty => {}
                        Command::Unknown(cmd) => {
                            println!("(unknown command {cmd}; /help for commands)");
                        }
                        command => {
                            // Submission affordances are disabled while a
                            // request is in flight.
                            if pending {
                                println!("(hold on, still working on the last one)");
                                continue;
                            }
                            if let Some(event) = build_user_event(command) {
                                let _ = user_tx.send(event).await;
                            }
                        }
                    }
                }
                event = session_rx.recv() => {
                    let Some(event) = event else { break };
                    match event {
                        SessionEvent::Entry(entry) => {
                            let who = match entry.speaker {
                                Speaker::User => "you",
                                Speaker::Assistant => assistant.as_str(),
                            };
                            println!("{who}: {}", entry.text);
                        }
                        SessionEvent::Pending(value) => pending = value,
                        SessionEvent::Notice(notice) => println!("({notice})"),
                        SessionEvent::ConditionLogged { name, log_id } => {
                            match log_id {
                                Some(id) => println!("(logged \"{name}\", id {id})"),
                                None => println!("(logged \"{name}\")"),
                            }
                        }
                        SessionEvent::Audio { url } => {
                            save_audio(service.as_ref(), &url).await;
                        }
                        SessionEvent::Done => {}
                    }
                }
            }
        }

        // Signal the session loop to quit and wait for it; the transcript
        // is discarded with it.
        let _ = user_tx.send(UserEvent::Quit).await;
        drop(user_tx);
        let _ = session_handle.await;

        Ok(())
    }
}

/// Fetch a synthesized voice reply and cache it locally for playback.
async fn save_audio(service: &dyn LogService, reference: &str) {
    let bytes = match service.fetch_media(reference).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("failed to fetch voice reply: {}", e);
            return;
        }
    };

    let name = reference
        .rsplit('/')
        .next()
        .filter(|n| !n.is_empty())
        .unwrap_or("reply.wav");
    let dir = Config::audio_cache_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        warn!("failed to create audio cache dir: {}", e);
        return;
    }
    let path = dir.join(name);
    match std::fs::write(&path, &bytes) {
        Ok(()) => println!("(voice reply saved to {})", path.display()),
        Err(e) => warn!("failed to write voice reply: {}", e),
    }
}

fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    if !trimmed.starts_with('/') {
        return Command::Text(trimmed.to_string());
    }

    let mut parts = trimmed.splitn(3, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    match command {
        "/quit" | "/exit" => Command::Quit,
        "/help" => Command::Help,
        "/log" => Command::ForceLog,
        "/voice" | "/photo" => {
            let kind = if command == "/voice" {
                MediaKind::Audio
            } else {
                MediaKind::Image
            };
            let Some(path) = parts.next().filter(|p| !p.is_empty()) else {
                return Command::Unknown(format!("{command} (missing file path)"));
            };
            let caption = parts
                .next()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string);
            Command::Media {
                kind,
                path: path.to_string(),
                caption,
            }
        }
        other => Command::Unknown(other.to_string()),
    }
}

/// Turn a submission command into a session event, capturing media from
/// disk for the voice/photo modalities. Capture failures are an inline
/// notice, never a sent turn.
fn build_user_event(command: Command) -> Option<UserEvent> {
    match command {
        Command::Text(text) => Some(UserEvent::Turn(TurnInput::Text(text))),
        Command::Media {
            kind,
            path,
            caption,
        } => match media::capture_from_file(kind, Path::new(&path)) {
            Ok(blob) => Some(UserEvent::Turn(TurnInput::Media { blob, caption })),
            Err(e) => {
                println!("(couldn't capture that: {e:#})");
                None
            }
        },
        Command::ForceLog => Some(UserEvent::ForceLog),
        Command::Quit | Command::Help | Command::Empty | Command::Unknown(_) => None,
    }
}

fn print_help() {
    println!("  <text>                    tell the assistant how you're feeling");
    println!("  /voice <path> [caption]   send a recorded voice note");
    println!("  /photo <path> [caption]   send a photo");
    println!("  /log                      ask it to log what you've described so far");
    println!("  /quit                     leave (the conversation is discarded)");
}
