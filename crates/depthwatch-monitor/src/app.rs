//! Application orchestration: one controller, one console renderer.

use crate::config::MonitorConfig;
use crate::error::AppResult;
use depthwatch_core::FilterEvent;
use depthwatch_session::{SessionController, SessionEnd};
use depthwatch_ws::WsFeedConnector;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Main application.
pub struct Application {
    config: MonitorConfig,
}

impl Application {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    /// Run one monitoring session until it ends or Ctrl-C stops it.
    pub async fn run(&self) -> AppResult<()> {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel::<FilterEvent>();
        let (ended_tx, mut ended_rx) = mpsc::unbounded_channel::<SessionEnd>();

        let connector = WsFeedConnector::new(self.config.feed_config());
        let controller = SessionController::new(connector, events_tx, ended_tx);

        controller.start(self.config.session_config()?);

        loop {
            tokio::select! {
                Some(event) = events_rx.recv() => render_event(&event),
                Some(end) = ended_rx.recv() => {
                    render_end(&end);
                    break;
                }
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        warn!(?e, "Failed to listen for Ctrl-C");
                    }
                    info!("Shutdown requested, stopping session");
                    controller.stop();
                    // Keep draining until the end notification arrives.
                }
            }
        }

        Ok(())
    }
}

fn render_event(event: &FilterEvent) {
    info!(
        side = %event.side,
        price = %event.price,
        quantity = %event.quantity,
        value = %event.value,
        "High {} level", event.side
    );
}

fn render_end(end: &SessionEnd) {
    if end.reason.is_error() {
        warn!(reason = %end.reason, "Session ended");
    } else {
        info!(reason = %end.reason, "Session ended");
    }
}
