// ABOUTME: Remote log service client — LogService trait plus the reqwest-backed implementation.
// ABOUTME: Text turns go as JSON, media turns as multipart; forced history posts the full turn list.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use serde_json::json;
use tracing::{debug, info};

use crate::service::error::ServiceError;
use crate::service::types::{HistoryTurn, LogOutcome, ProcessResponse, TurnInput};

/// Path of the multimodal process endpoint, relative to the base URL.
const PROCESS_PATH: &str = "/api/process";

/// The remote log service as the session consumes it.
#[async_trait]
pub trait LogService: Send + Sync {
    /// Submit a single input (no history). The server may or may not keep
    /// its own memory of prior turns; the client assumes nothing.
    async fn submit_turn(&self, input: &TurnInput) -> Result<LogOutcome, ServiceError>;

    /// Submit a full conversation history and demand a summary decision.
    async fn submit_history(&self, turns: &[HistoryTurn]) -> Result<LogOutcome, ServiceError>;

    /// Fetch synthesized audio by the reference string an outcome returned.
    /// Unauthenticated — the reference itself is the capability.
    async fn fetch_media(&self, reference: &str) -> Result<Bytes, ServiceError>;
}

/// HTTP implementation of [`LogService`] against the health-log backend.
pub struct HttpLogService {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpLogService {
    /// Create a client bound to one caller identity. Every process call
    /// carries the token; media fetches do not.
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn process_url(&self) -> String {
        join_url(&self.base_url, PROCESS_PATH)
    }
}

#[async_trait]
impl LogService for HttpLogService {
    async fn submit_turn(&self, input: &TurnInput) -> Result<LogOutcome, ServiceError> {
        let request = self.http.post(self.process_url()).bearer_auth(&self.token);

        let response = match input {
            TurnInput::Text(text) => {
                debug!("submitting text turn ({} chars)", text.len());
                request.json(&json!({ "text": text.trim() })).send().await?
            }
            TurnInput::Media { blob, caption } => {
                debug!(
                    "submitting {} turn ({} bytes, {})",
                    blob.kind.field_name(),
                    blob.bytes.len(),
                    blob.mime
                );
                let part = reqwest::multipart::Part::bytes(blob.bytes.clone())
                    .file_name(blob.file_name.clone())
                    .mime_str(blob.mime)?;
                let mut form =
                    reqwest::multipart::Form::new().part(blob.kind.field_name(), part);
                if let Some(caption) = caption.as_deref().map(str::trim) {
                    if !caption.is_empty() {
                        form = form.text("text", caption.to_string());
                    }
                }
                request.multipart(form).send().await?
            }
        };

        outcome_from_response(response).await
    }

    async fn submit_history(&self, turns: &[HistoryTurn]) -> Result<LogOutcome, ServiceError> {
        info!("forcing summary over {} turns", turns.len());
        let response = self
            .http
            .post(self.process_url())
            .bearer_auth(&self.token)
            .json(&json!({
                "force_log": true,
                "conversation_history": turns,
            }))
            .send()
            .await?;

        outcome_from_response(response).await
    }

    async fn fetch_media(&self, reference: &str) -> Result<Bytes, ServiceError> {
        let url = if reference.starts_with("http://") || reference.starts_with("https://") {
            reference.to_string()
        } else {
            join_url(&self.base_url, reference)
        };
        debug!("fetching synthesized audio from {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: "audio reference not found or expired".to_string(),
            });
        }
        Ok(response.bytes().await?)
    }
}

/// Convert an HTTP response into an outcome or a classified error.
async fn outcome_from_response(response: reqwest::Response) -> Result<LogOutcome, ServiceError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ServiceError::Auth);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::Api {
            status: status.as_u16(),
            message: extract_error_message(&body),
        });
    }

    let body = response.text().await?;
    let raw: ProcessResponse = serde_json::from_str(&body)
        .map_err(|e| ServiceError::InvalidResponse(format!("{} in body: {:.120}", e, body)))?;
    Ok(raw.into())
}

/// Pull the backend's `{"error": "..."}` message out of a failure body,
/// falling back to the (truncated) raw body.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
            return message.to_string();
        }
    }
    let truncated: String = body.chars().take(120).collect();
    if truncated.is_empty() {
        "no response body".to_string()
    } else {
        truncated
    }
}

/// Join a base URL and an absolute-path reference without doubling slashes.
fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(
            join_url("http://localhost:5001/", "/api/process"),
            "http://localhost:5001/api/process"
        );
        assert_eq!(
            join_url("http://localhost:5001", "api/tts/a.wav"),
            "http://localhost:5001/api/tts/a.wav"
        );
    }

    #[test]
    fn extract_error_message_prefers_json_error_field() {
        let body = r#"{"error": "At least one input is required."}"#;
        assert_eq!(extract_error_message(body), "At least one input is required.");
    }

    #[test]
    fn extract_error_message_falls_back_to_raw_body() {
        assert_eq!(extract_error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(extract_error_message(""), "no response body");
    }

    #[test]
    fn extract_error_message_truncates_long_bodies() {
        let body = "x".repeat(500);
        assert_eq!(extract_error_message(&body).len(), 120);
    }

    #[test]
    fn client_trims_trailing_slash_from_base() {
        let client = HttpLogService::new("http://localhost:5001///", "tok");
        assert_eq!(client.process_url(), "http://localhost:5001/api/process");
    }
}
