//! Console monitor for depthwatch.
//!
//! The presentation layer around the session controller: loads a TOML
//! config, starts one monitoring session, and renders threshold crossings
//! and session-end reasons to the log.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;

pub use app::Application;
pub use config::{FeedSettings, MonitorConfig};
pub use error::{AppError, AppResult};
pub use logging::init_logging;
