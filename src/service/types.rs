// ABOUTME: Wire-level types for the remote log service — turn inputs, history turns, outcomes.
// ABOUTME: Mirrors the backend's process endpoint JSON (action / condition_name / mascot_response).

use serde::{Deserialize, Serialize};

use crate::media::MediaBlob;

/// One submission to the service: free text, or one media blob with an
/// optional caption.
#[derive(Debug, Clone)]
pub enum TurnInput {
    Text(String),
    Media {
        blob: MediaBlob,
        caption: Option<String>,
    },
}

impl TurnInput {
    /// Whether this input carries nothing worth sending. Empty submissions
    /// are rejected client-side, before any network call.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Media { blob, .. } => blob.bytes.is_empty(),
        }
    }

    /// The text shown in the transcript for this input — the text itself,
    /// or a placeholder when the real payload is binary.
    pub fn display_text(&self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Media { blob, caption } => match caption.as_deref().map(str::trim) {
                Some(c) if !c.is_empty() => c.to_string(),
                _ => blob.kind.placeholder_text().to_string(),
            },
        }
    }
}

/// Role of a turn in a submitted conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Model,
}

/// One turn of history sent on the force-summarize path. Text only —
/// attachments are never resent once the server has seen them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: HistoryRole,
    pub text: String,
}

/// What the service decided to do with an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    /// A condition was extracted and logged.
    #[serde(rename = "update_condition")]
    ConditionLogged,
    /// The service needs more information before it can log.
    #[serde(rename = "request_clarification")]
    NeedsClarification,
    /// Casual conversation with nothing to log.
    #[serde(rename = "general_chat")]
    ChitChat,
}

/// The reconciled result of one exchange with the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOutcome {
    pub disposition: Disposition,
    /// Present iff the disposition is `ConditionLogged`.
    pub condition_name: Option<String>,
    /// Assistant text to append to the transcript.
    pub assistant_reply: String,
    /// Reference to synthesized speech for the reply, fetchable without auth.
    pub media_url: Option<String>,
    /// Server-side id of the persisted log, when one was created.
    pub log_id: Option<String>,
}

/// Raw response body from the process endpoint.
#[derive(Debug, Deserialize)]
pub struct ProcessResponse {
    pub action: Disposition,
    #[serde(default)]
    pub condition_name: String,
    #[serde(default)]
    pub mascot_response: String,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub log_id: Option<String>,
}

impl From<ProcessResponse> for LogOutcome {
    fn from(raw: ProcessResponse) -> Self {
        // The backend sends condition_name as "" unless a condition was
        // actually logged.
        let condition_name = match raw.action {
            Disposition::ConditionLogged if !raw.condition_name.is_empty() => {
                Some(raw.condition_name)
            }
            _ => None,
        };
        Self {
            disposition: raw.action,
            condition_name,
            assistant_reply: raw.mascot_response,
            media_url: raw.audio_url,
            log_id: raw.log_id,
        }
    }
}
