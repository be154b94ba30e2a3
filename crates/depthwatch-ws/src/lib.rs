//! WebSocket feed connection for depthwatch.
//!
//! Owns the lifecycle of one streaming depth subscription:
//! - single connection attempt, no automatic retry (retry policy, if any,
//!   belongs to the caller)
//! - fire-and-forget subscribe command on the `{symbol}@depth` stream
//! - frame-by-frame receive with transport ping handling
//! - externally requested close with bounded shutdown

pub mod connection;
pub mod error;
pub mod message;
pub mod transport;

pub use connection::{FeedConfig, FeedConnection, WsFeedConnector};
pub use error::{WsError, WsResult};
pub use message::{depth_stream, SubscribeRequest};
pub use transport::{FeedConnector, FeedEvent, FeedTransport};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
