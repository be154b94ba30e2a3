//! Abstract feed-transport capability consumed by the session controller.
//!
//! The controller never touches the socket directly; it drives whatever
//! implements [`FeedTransport`], which keeps the session logic testable
//! with an in-memory scripted feed.

use crate::error::WsResult;
use std::future::Future;

/// One observable transport event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// A complete inbound text frame.
    Frame(String),
    /// The remote peer closed the connection (or the stream ended).
    Closed { code: u16, reason: String },
}

/// An established, subscribed feed connection.
pub trait FeedTransport: Send {
    /// Await the next transport event. Transport-level faults are `Err`
    /// and terminate the session.
    fn next_event(&mut self) -> impl Future<Output = WsResult<FeedEvent>> + Send;

    /// Request connection close. Safe to call while a `next_event` future
    /// is pending on another branch of a `select!`; causes the receive
    /// side to wind down within the transport's close handshake.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Factory for one connect-and-subscribe attempt per session.
pub trait FeedConnector: Send + Sync {
    type Transport: FeedTransport;

    /// Establish the transport for `symbol` and send the subscribe
    /// command. One attempt; no retry happens at this layer.
    fn connect(&self, symbol: &str) -> impl Future<Output = WsResult<Self::Transport>> + Send;
}
