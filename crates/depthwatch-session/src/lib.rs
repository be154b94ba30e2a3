//! Streaming session controller for depthwatch.
//!
//! Turns one feed connection's raw frame stream into filtered
//! threshold-crossing events:
//! - `start`/`stop` with idempotent, concurrency-safe state transitions
//! - frame decoding with a silent-discard policy for non-depth events
//! - notional-value filtering with exact decimal arithmetic
//! - a single session-ended notification carrying the terminal reason

pub mod controller;
pub mod error;
pub mod filter;
pub mod parser;

pub use controller::{EndReason, SessionController, SessionEnd, SessionState};
pub use error::{SessionError, SessionResult};
pub use filter::filter_update;
pub use parser::decode_depth_update;
