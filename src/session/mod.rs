// ABOUTME: Session module — transcript, the log-session state machine, and the async loop.
// ABOUTME: Sessions are exclusively owned by the screen that created them and never persisted.

pub mod runner;
pub mod state;
pub mod transcript;

pub use runner::{SessionEvent, SessionParams, UserEvent, run_session_loop};
pub use state::{ForceRejection, LogSession, Reconciled, TurnRejection};
pub use transcript::{AttachmentRef, Speaker, Transcript, TranscriptEntry};
