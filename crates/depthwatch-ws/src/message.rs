//! Outbound subscribe command wire types.

use serde::Serialize;

/// Name of the diff-depth stream for a symbol.
pub fn depth_stream(symbol: &str) -> String {
    format!("{symbol}@depth")
}

/// Subscribe command sent once per session, immediately after connect.
///
/// Wire shape: `{"method":"SUBSCRIBE","params":["<symbol>@depth"],"id":1}`.
/// No acknowledgment is awaited before processing frames.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeRequest {
    /// Always "SUBSCRIBE".
    pub method: String,
    /// Stream names, one per session.
    pub params: Vec<String>,
    /// Monotonically assigned request id, starting at 1 per connection.
    pub id: u64,
}

impl SubscribeRequest {
    /// Subscribe to the depth stream for `symbol`.
    pub fn depth(symbol: &str, id: u64) -> Self {
        Self {
            method: "SUBSCRIBE".to_string(),
            params: vec![depth_stream(symbol)],
            id,
        }
    }
}
