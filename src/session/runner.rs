// ABOUTME: Async session loop — drives one LogSession against the remote service.
// ABOUTME: Receives user events, emits session events, and schedules the delayed confirmation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::service::client::LogService;
use crate::service::error::ServiceError;
use crate::service::types::{LogOutcome, TurnInput};
use crate::session::state::{LogSession, Reconciled};
use crate::session::transcript::TranscriptEntry;

/// Bundled parameters for the session loop.
pub struct SessionParams {
    pub service: Arc<dyn LogService>,
    /// Assistant greeting seeded into the transcript, if any.
    pub greeting: Option<String>,
    /// Pacing delay before the synthetic "saved" confirmation entry.
    pub confirm_delay: Duration,
}

/// Events sent from the frontend to the session loop.
pub enum UserEvent {
    /// Submit one turn (text, or media with optional caption).
    Turn(TurnInput),
    /// Force a summary over the whole transcript.
    ForceLog,
    /// Discard the session.
    Quit,
}

/// Events sent from the session loop to the frontend.
#[derive(Debug)]
pub enum SessionEvent {
    /// A transcript entry was appended (greeting, user, assistant, or
    /// confirmation). Entries arrive in transcript order.
    Entry(TranscriptEntry),
    /// Whether a request is in flight. The frontend must disable all
    /// submission affordances while true.
    Pending(bool),
    /// An inline notice that never touches the transcript (empty input,
    /// busy session, force preconditions unmet).
    Notice(String),
    /// This exchange logged a condition; `resolved` is now sticky.
    ConditionLogged {
        name: String,
        log_id: Option<String>,
    },
    /// The outcome carried a synthesized-speech reference.
    Audio { url: String },
    /// One exchange (success or failure) finished; the session is idle.
    Done,
}

/// Run the session loop until the user quits or the channel closes.
///
/// The network exchange runs in a spawned task feeding an internal
/// channel, so the loop keeps serving user events while a request is in
/// flight. A submission arriving mid-flight hits the session's `Busy`
/// precondition and comes back as an inline notice; it is never queued
/// behind the running exchange. At most one exchange is in flight at a
/// time. A pending confirmation is simply abandoned if the loop exits
/// first.
pub async fn run_session_loop(
    params: SessionParams,
    mut user_rx: mpsc::Receiver<UserEvent>,
    session_tx: mpsc::Sender<SessionEvent>,
) {
    let mut session = LogSession::new(params.greeting.as_deref());

    // Surface the greeting before the first prompt.
    for entry in session.transcript().entries() {
        let _ = session_tx.send(SessionEvent::Entry(entry.clone())).await;
    }

    let (confirm_tx, mut confirm_rx) = mpsc::channel::<String>(4);
    let (exchange_tx, mut exchange_rx) =
        mpsc::channel::<Result<LogOutcome, ServiceError>>(1);

    loop {
        tokio::select! {
            event = user_rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    UserEvent::Quit => break,
                    UserEvent::Turn(input) => {
                        start_turn(&mut session, &params, &session_tx, &exchange_tx, input).await;
                    }
                    UserEvent::ForceLog => {
                        start_force(&mut session, &params, &session_tx, &exchange_tx).await;
                    }
                }
            }
            Some(result) = exchange_rx.recv() => {
                let reconciled = session.complete_exchange(result);
                emit_reconciled(&params, &session_tx, &confirm_tx, reconciled).await;
            }
            Some(name) = confirm_rx.recv() => {
                let entry = session.append_confirmation(&name);
                let _ = session_tx.send(SessionEvent::Entry(entry)).await;
            }
        }
    }

    debug!("session loop ended; transcript discarded");
}

async fn start_turn(
    session: &mut LogSession,
    params: &SessionParams,
    session_tx: &mpsc::Sender<SessionEvent>,
    exchange_tx: &mpsc::Sender<Result<LogOutcome, ServiceError>>,
    input: TurnInput,
) {
    let user_entry = match session.begin_turn(&input) {
        Ok(entry) => entry,
        Err(rejection) => {
            let _ = session_tx
                .send(SessionEvent::Notice(rejection.to_string()))
                .await;
            return;
        }
    };

    // Optimistic: the user entry is visible before the call resolves.
    let _ = session_tx.send(SessionEvent::Entry(user_entry)).await;
    let _ = session_tx.send(SessionEvent::Pending(true)).await;

    let service = params.service.clone();
    let exchange_tx = exchange_tx.clone();
    tokio::spawn(async move {
        let result = service.submit_turn(&input).await;
        let _ = exchange_tx.send(result).await;
    });
}

async fn start_force(
    session: &mut LogSession,
    params: &SessionParams,
    session_tx: &mpsc::Sender<SessionEvent>,
    exchange_tx: &mpsc::Sender<Result<LogOutcome, ServiceError>>,
) {
    let turns = match session.begin_force() {
        Ok(turns) => turns,
        Err(rejection) => {
            let _ = session_tx
                .send(SessionEvent::Notice(rejection.to_string()))
                .await;
            return;
        }
    };

    let _ = session_tx.send(SessionEvent::Pending(true)).await;

    let service = params.service.clone();
    let exchange_tx = exchange_tx.clone();
    tokio::spawn(async move {
        let result = service.submit_history(&turns).await;
        let _ = exchange_tx.send(result).await;
    });
}

/// Emit the events for a reconciled exchange and schedule the delayed
/// confirmation when a condition was logged.
async fn emit_reconciled(
    params: &SessionParams,
    session_tx: &mpsc::Sender<SessionEvent>,
    confirm_tx: &mpsc::Sender<String>,
    reconciled: Reconciled,
) {
    let _ = session_tx
        .send(SessionEvent::Entry(reconciled.entry.clone()))
        .await;
    let _ = session_tx.send(SessionEvent::Pending(false)).await;

    if let Some(url) = reconciled.media_url {
        let _ = session_tx.send(SessionEvent::Audio { url }).await;
    }

    if let Some(name) = reconciled.confirm {
        let _ = session_tx
            .send(SessionEvent::ConditionLogged {
                name: name.clone(),
                log_id: reconciled.log_id,
            })
            .await;

        // The confirmation is appended after a fixed pacing delay so the
        // primary reply renders first. Abandoned if the loop exits.
        let delay = params.confirm_delay;
        let confirm_tx = confirm_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = confirm_tx.send(name).await;
        });
    }

    let _ = session_tx.send(SessionEvent::Done).await;
}
