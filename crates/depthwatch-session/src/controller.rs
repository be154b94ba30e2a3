//! Session lifecycle controller.
//!
//! Wraps one feed connection, runs it on its own task, decodes and filters
//! each frame, and publishes crossings onto the output channel. `start` and
//! `stop` are idempotent and safe to call from any task.

use crate::error::SessionResult;
use crate::filter::filter_update;
use crate::parser::decode_depth_update;
use depthwatch_core::{FilterEvent, SessionConfig};
use depthwatch_ws::{FeedConnector, FeedEvent, FeedTransport};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Lifecycle state of the controller.
///
/// `Closed` is transient: the session task publishes its end notification
/// in `Closed` and immediately resets to `Idle`, so the controller is
/// reusable for a new `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopping,
    Closed,
}

/// Why a session ended. Every terminal condition funnels through exactly
/// one of these, delivered as a [`SessionEnd`] notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// Transport-level connect, handshake, or read failure.
    ConnectionError(String),
    /// Malformed inbound payload; no partial recovery is attempted.
    DecodeError(String),
    /// The feed closed the connection. Informational, not an error.
    RemoteClose { code: u16, reason: String },
    /// Cooperative cancellation via `stop`.
    UserStop,
}

impl EndReason {
    /// Whether the presentation layer should render this as a warning.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::ConnectionError(_) | Self::DecodeError(_))
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "connection error: {e}"),
            Self::DecodeError(e) => write!(f, "decode error: {e}"),
            Self::RemoteClose { code, reason } => {
                write!(f, "closed by remote: code={code}, reason={reason}")
            }
            Self::UserStop => write!(f, "stopped by user"),
        }
    }
}

/// Terminal notification for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEnd {
    pub reason: EndReason,
}

struct Shared {
    state: SessionState,
    cancel: Option<CancellationToken>,
    /// Incremented per started session so a finishing task never clobbers
    /// the state of a session started after it.
    epoch: u64,
}

/// Controller for one depth-monitoring session at a time.
///
/// Filtered output goes to `events_tx` (unbounded: the producing task
/// never blocks on a slow consumer) and terminal notifications to
/// `ended_tx`. Both channels outlive individual sessions, so a restarted
/// controller keeps feeding the same consumers.
pub struct SessionController<C: FeedConnector> {
    connector: Arc<C>,
    shared: Arc<Mutex<Shared>>,
    events_tx: mpsc::UnboundedSender<FilterEvent>,
    ended_tx: mpsc::UnboundedSender<SessionEnd>,
}

impl<C> SessionController<C>
where
    C: FeedConnector + 'static,
    C::Transport: 'static,
{
    pub fn new(
        connector: C,
        events_tx: mpsc::UnboundedSender<FilterEvent>,
        ended_tx: mpsc::UnboundedSender<SessionEnd>,
    ) -> Self {
        Self {
            connector: Arc::new(connector),
            shared: Arc::new(Mutex::new(Shared {
                state: SessionState::Idle,
                cancel: None,
                epoch: 0,
            })),
            events_tx,
            ended_tx,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.shared.lock().state
    }

    /// Start a session with the given config.
    ///
    /// Only effective in `Idle`; while `Running` or `Stopping` this is a
    /// logged no-op, never an error. The check-and-set happens under one
    /// lock, so overlapping calls yield exactly one active connection.
    pub fn start(&self, config: SessionConfig) {
        let (cancel, epoch) = {
            let mut shared = self.shared.lock();
            if shared.state != SessionState::Idle {
                debug!(state = ?shared.state, "start ignored: session already active");
                return;
            }
            shared.state = SessionState::Running;
            shared.epoch += 1;
            let cancel = CancellationToken::new();
            shared.cancel = Some(cancel.clone());
            (cancel, shared.epoch)
        };

        info!(
            symbol = %config.symbol(),
            ask_threshold = %config.ask_threshold,
            bid_threshold = %config.bid_threshold,
            "Starting depth session"
        );

        let connector = Arc::clone(&self.connector);
        let shared = Arc::clone(&self.shared);
        let events_tx = self.events_tx.clone();
        let ended_tx = self.ended_tx.clone();

        tokio::spawn(async move {
            let reason = drive_session(connector.as_ref(), &config, &cancel, &events_tx).await;
            finish_session(&shared, epoch, reason, &ended_tx);
        });
    }

    /// Request cooperative session stop. Non-blocking: sets the
    /// cancellation signal and returns; teardown completes asynchronously,
    /// bounded by the next feed event or the transport's close handshake.
    /// Callers needing confirmation await the [`SessionEnd`] notification.
    /// A `stop` with no active session is a no-op.
    pub fn stop(&self) {
        let mut shared = self.shared.lock();
        match shared.state {
            SessionState::Running => {
                shared.state = SessionState::Stopping;
                if let Some(cancel) = shared.cancel.as_ref() {
                    cancel.cancel();
                }
                info!("Stop requested, session closing");
            }
            _ => debug!(state = ?shared.state, "stop ignored: no active session"),
        }
    }
}

/// Run one session to its terminal condition.
async fn drive_session<C: FeedConnector>(
    connector: &C,
    config: &SessionConfig,
    cancel: &CancellationToken,
    events_tx: &mpsc::UnboundedSender<FilterEvent>,
) -> EndReason {
    let mut feed = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            debug!("Stopped before the connection was established");
            return EndReason::UserStop;
        }
        result = connector.connect(config.symbol()) => match result {
            Ok(feed) => feed,
            Err(e) => {
                warn!(error = %e, "Depth feed connection failed");
                return EndReason::ConnectionError(e.to_string());
            }
        }
    };

    loop {
        tokio::select! {
            // The cancellation signal wins over a ready frame, so no event
            // is published for frames delivered after stop was observed.
            biased;
            () = cancel.cancelled() => {
                feed.close().await;
                return EndReason::UserStop;
            }
            event = feed.next_event() => match event {
                Ok(FeedEvent::Frame(text)) => {
                    if let Err(e) = handle_frame(&text, config, events_tx) {
                        warn!(error = %e, "Fatal decode failure");
                        feed.close().await;
                        return EndReason::DecodeError(e.to_string());
                    }
                }
                Ok(FeedEvent::Closed { code, reason }) => {
                    return EndReason::RemoteClose { code, reason };
                }
                Err(e) => return EndReason::ConnectionError(e.to_string()),
            }
        }
    }
}

/// Decode, filter, publish. One call per inbound frame.
fn handle_frame(
    text: &str,
    config: &SessionConfig,
    events_tx: &mpsc::UnboundedSender<FilterEvent>,
) -> SessionResult<()> {
    let Some(update) = decode_depth_update(text)? else {
        // Non-depth event types are discarded silently by policy.
        return Ok(());
    };

    for event in filter_update(&update, config) {
        debug!(side = %event.side, value = %event.value, "Threshold crossing");
        if events_tx.send(event).is_err() {
            warn!("Filter event receiver dropped");
        }
    }
    Ok(())
}

/// Publish the end notification and reset the controller for reuse.
fn finish_session(
    shared: &Mutex<Shared>,
    epoch: u64,
    reason: EndReason,
    ended_tx: &mpsc::UnboundedSender<SessionEnd>,
) {
    {
        let mut shared = shared.lock();
        if shared.epoch != epoch {
            return;
        }
        shared.state = SessionState::Closed;
        shared.cancel = None;
    }

    if reason.is_error() {
        warn!(%reason, "Depth session ended");
    } else {
        info!(%reason, "Depth session ended");
    }
    let _ = ended_tx.send(SessionEnd {
        reason,
    });

    let mut shared = shared.lock();
    if shared.epoch == epoch && shared.state == SessionState::Closed {
        shared.state = SessionState::Idle;
    }
}
