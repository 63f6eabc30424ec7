// ABOUTME: Service module — the remote log service contract and its HTTP client.
// ABOUTME: Wire types, error taxonomy, and the reqwest implementation.

pub mod client;
pub mod error;
pub mod types;

pub use client::{HttpLogService, LogService};
pub use error::ServiceError;
pub use types::{Disposition, HistoryRole, HistoryTurn, LogOutcome, TurnInput};
