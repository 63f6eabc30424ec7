// ABOUTME: The conversational log session state machine — optimistic turns, forced summaries,
// ABOUTME: and reconciliation of service outcomes into the append-only transcript.

use thiserror::Error;
use tracing::debug;

use crate::service::error::ServiceError;
use crate::service::types::{Disposition, HistoryRole, HistoryTurn, LogOutcome, TurnInput};
use crate::session::transcript::{AttachmentRef, Speaker, Transcript, TranscriptEntry};

/// Why a submission was rejected before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TurnRejection {
    #[error("nothing to send: the input is empty")]
    Empty,
    #[error("a request is already in flight")]
    Busy,
}

/// Why a forced summarization was rejected. Mirrors the disabled states
/// of the force affordance, so the owner can word its notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ForceRejection {
    #[error("nothing to summarize yet")]
    NothingToSummarize,
    #[error("a request is already in flight")]
    Busy,
    #[error("this conversation already logged a condition")]
    AlreadyLogged,
}

/// What an exchange reconciled to: the assistant entry that was appended,
/// plus the condition that should be confirmed after a short delay (set
/// only when this exchange logged one).
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub entry: TranscriptEntry,
    pub confirm: Option<String>,
    pub media_url: Option<String>,
    pub log_id: Option<String>,
}

/// One user-facing conversation instance. Created when a logging screen
/// mounts, discarded on navigation away; never persisted.
///
/// States are `Idle` and `Sending` (`pending`), with a sticky `resolved`
/// flag that survives further turns once any outcome logs a condition.
pub struct LogSession {
    transcript: Transcript,
    greeting_id: Option<u64>,
    pending: bool,
    resolved: bool,
}

impl LogSession {
    /// Create a session, seeding the transcript with an assistant greeting
    /// when one is given. The greeting never appears in forced history.
    pub fn new(greeting: Option<&str>) -> Self {
        let mut transcript = Transcript::new();
        let greeting_id = greeting
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(|g| transcript.append(Speaker::Assistant, g, None).id);
        Self {
            transcript,
            greeting_id,
            pending: false,
            resolved: false,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn resolved(&self) -> bool {
        self.resolved
    }

    pub fn has_user_contribution(&self) -> bool {
        self.transcript.has_user_contribution()
    }

    /// Start a turn: validate the input, append the user entry
    /// optimistically, and enter `Sending`. The caller then performs the
    /// network exchange and finishes with [`complete_exchange`].
    ///
    /// Rejection is a client-side precondition, not a server round trip:
    /// nothing is appended and no request may be issued.
    ///
    /// [`complete_exchange`]: LogSession::complete_exchange
    pub fn begin_turn(&mut self, input: &TurnInput) -> Result<TranscriptEntry, TurnRejection> {
        if self.pending {
            return Err(TurnRejection::Busy);
        }
        if input.is_empty() {
            return Err(TurnRejection::Empty);
        }

        let attachment = match input {
            TurnInput::Media { blob, .. } => Some(AttachmentRef {
                mime: blob.mime.to_string(),
                file_name: blob.file_name.clone(),
            }),
            TurnInput::Text(_) => None,
        };
        let entry = self
            .transcript
            .append(Speaker::User, input.display_text(), attachment);
        self.pending = true;
        Ok(entry)
    }

    /// Start a forced summarization: returns the full history to submit
    /// (greeting excluded, attachments excluded, roles mapped) and enters
    /// `Sending`. A rejection names the precondition that failed; like
    /// [`begin_turn`] rejections, nothing is appended and no request may
    /// be issued.
    ///
    /// [`begin_turn`]: LogSession::begin_turn
    pub fn begin_force(&mut self) -> Result<Vec<HistoryTurn>, ForceRejection> {
        if self.pending {
            return Err(ForceRejection::Busy);
        }
        if self.resolved {
            return Err(ForceRejection::AlreadyLogged);
        }
        if !self.has_user_contribution() {
            debug!("force summarize ignored: no user contribution yet");
            return Err(ForceRejection::NothingToSummarize);
        }
        self.pending = true;
        Ok(self.history_turns())
    }

    /// The transcript as service history turns: greeting dropped, user
    /// entries as `user`, assistant entries as `model`, text only.
    pub fn history_turns(&self) -> Vec<HistoryTurn> {
        self.transcript
            .entries()
            .iter()
            .filter(|e| Some(e.id) != self.greeting_id)
            .map(|e| HistoryTurn {
                role: match e.speaker {
                    Speaker::User => HistoryRole::User,
                    Speaker::Assistant => HistoryRole::Model,
                },
                text: e.text.clone(),
            })
            .collect()
    }

    /// Reconcile the result of an exchange started by [`begin_turn`] or
    /// [`begin_force`]. Success appends the assistant reply and, when a
    /// condition was logged, sets the sticky `resolved` flag and asks the
    /// caller to confirm after its fixed delay. Failure appends an
    /// in-character error entry; the optimistic user entry is never rolled
    /// back. The session returns to `Idle` either way.
    ///
    /// [`begin_turn`]: LogSession::begin_turn
    /// [`begin_force`]: LogSession::begin_force
    pub fn complete_exchange(&mut self, result: Result<LogOutcome, ServiceError>) -> Reconciled {
        self.pending = false;

        match result {
            Ok(outcome) => {
                let entry =
                    self.transcript
                        .append(Speaker::Assistant, outcome.assistant_reply, None);
                let confirm = if outcome.disposition == Disposition::ConditionLogged {
                    self.resolved = true;
                    Some(
                        outcome
                            .condition_name
                            .unwrap_or_else(|| "your condition".to_string()),
                    )
                } else {
                    None
                };
                Reconciled {
                    entry,
                    confirm,
                    media_url: outcome.media_url,
                    log_id: outcome.log_id,
                }
            }
            Err(err) => {
                let entry = self
                    .transcript
                    .append(Speaker::Assistant, err.user_message(), None);
                Reconciled {
                    entry,
                    confirm: None,
                    media_url: None,
                    log_id: None,
                }
            }
        }
    }

    /// Append the synthetic follow-up entry confirming a condition was
    /// saved. Called by the owner after its fixed pacing delay.
    pub fn append_confirmation(&mut self, condition_name: &str) -> TranscriptEntry {
        self.transcript.append(
            Speaker::Assistant,
            format!("All set! \"{condition_name}\" has been saved to your health log."),
            None,
        )
    }
}
