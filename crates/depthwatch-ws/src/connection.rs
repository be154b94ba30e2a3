//! WebSocket feed connection.
//!
//! One connection attempt per session; connection failures are reported to
//! the caller, never retried here.

use crate::error::WsResult;
use crate::message::{depth_stream, SubscribeRequest};
use crate::transport::{FeedConnector, FeedEvent, FeedTransport};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{
    connect_async_tls_with_config, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Close code reported when the stream ends without a close frame.
const ABNORMAL_CLOSE_CODE: u16 = 1006;

/// Feed endpoint configuration.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// WebSocket endpoint base, without the stream path.
    pub url: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "wss://stream.binance.com:9443".to_string(),
        }
    }
}

impl FeedConfig {
    /// Full connection URL for a symbol's depth stream.
    pub fn stream_url(&self, symbol: &str) -> String {
        format!("{}/ws/{}", self.url.trim_end_matches('/'), depth_stream(symbol))
    }
}

/// One live depth-stream subscription.
pub struct FeedConnection {
    stream: WsStream,
    next_request_id: u64,
}

impl FeedConnection {
    /// Establish the transport for `symbol`. Fails if the endpoint is
    /// unreachable or the handshake fails.
    pub async fn connect(config: &FeedConfig, symbol: &str) -> WsResult<Self> {
        let url = config.stream_url(symbol);
        info!(%url, "Connecting to depth feed");

        // TCP_NODELAY for lower latency (disable Nagle's algorithm)
        let (stream, _response) = connect_async_tls_with_config(&url, None, true, None).await?;

        info!(%symbol, "Depth feed connected");
        Ok(Self {
            stream,
            next_request_id: 1,
        })
    }

    /// Send the subscribe command for `symbol`. Fire-and-forget: no ack is
    /// required before frames start flowing.
    pub async fn subscribe(&mut self, symbol: &str) -> WsResult<()> {
        let request = SubscribeRequest::depth(symbol, self.next_request_id);
        self.next_request_id += 1;

        let msg = serde_json::to_string(&request)?;
        self.stream.send(Message::Text(msg)).await?;

        debug!(%symbol, id = request.id, "Subscribe command sent");
        Ok(())
    }

    /// Await the next text frame or closure.
    ///
    /// Transport pings are answered inline; pong and binary frames are
    /// skipped. A close frame or stream end yields [`FeedEvent::Closed`].
    pub async fn next_event(&mut self) -> WsResult<FeedEvent> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(FeedEvent::Frame(text)),
                Some(Ok(Message::Ping(data))) => {
                    debug!("Received ping, sending pong");
                    self.stream.send(Message::Pong(data)).await?;
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = frame
                        .map(|f| (f.code.into(), f.reason.to_string()))
                        .unwrap_or((1000, "Normal close".to_string()));
                    warn!(code, %reason, "Depth feed closed by server");
                    return Ok(FeedEvent::Closed { code, reason });
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => {
                    warn!("Depth feed stream ended");
                    return Ok(FeedEvent::Closed {
                        code: ABNORMAL_CLOSE_CODE,
                        reason: "Stream ended".to_string(),
                    });
                }
            }
        }
    }

    /// Request connection termination by sending a Close frame. A send
    /// failure here means the connection is already going away, so it is
    /// logged rather than propagated.
    pub async fn close(&mut self) {
        if let Err(e) = self.stream.send(Message::Close(None)).await {
            debug!(?e, "Failed to send Close frame");
        }
    }
}

impl FeedTransport for FeedConnection {
    async fn next_event(&mut self) -> WsResult<FeedEvent> {
        FeedConnection::next_event(self).await
    }

    async fn close(&mut self) {
        FeedConnection::close(self).await;
    }
}

/// Connector that opens real WebSocket connections.
#[derive(Debug, Clone, Default)]
pub struct WsFeedConnector {
    config: FeedConfig,
}

impl WsFeedConnector {
    pub fn new(config: FeedConfig) -> Self {
        Self { config }
    }
}

impl FeedConnector for WsFeedConnector {
    type Transport = FeedConnection;

    async fn connect(&self, symbol: &str) -> WsResult<FeedConnection> {
        let mut connection = FeedConnection::connect(&self.config, symbol).await?;
        connection.subscribe(symbol).await?;
        Ok(connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_feed_url() {
        let config = FeedConfig::default();
        assert_eq!(config.url, "wss://stream.binance.com:9443");
    }

    #[test]
    fn test_stream_url() {
        let config = FeedConfig::default();
        assert_eq!(
            config.stream_url("btcusdt"),
            "wss://stream.binance.com:9443/ws/btcusdt@depth"
        );
    }

    #[test]
    fn test_stream_url_trims_trailing_slash() {
        let config = FeedConfig {
            url: "ws://localhost:9443/".to_string(),
        };
        assert_eq!(config.stream_url("ethusdt"), "ws://localhost:9443/ws/ethusdt@depth");
    }
}
