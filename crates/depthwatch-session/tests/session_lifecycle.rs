//! Integration tests for the session controller lifecycle.
//!
//! Drives the controller against a scripted in-memory transport so the
//! full path — start, frame handling, filtering, publication, terminal
//! notification, reset — runs without a network. Tests use the default
//! current-thread runtime, which makes task interleaving deterministic:
//! the session task only runs while the test awaits.

use depthwatch_core::{FilterEvent, SessionConfig, Side};
use depthwatch_session::{EndReason, SessionController, SessionEnd, SessionState};
use depthwatch_ws::{FeedConnector, FeedEvent, FeedTransport, WsError, WsResult};
use parking_lot::Mutex;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

/// Transport fed from a test-controlled channel. When the script runs dry
/// it stays quiet, so only cancellation or a scripted closure ends the
/// session.
struct ScriptedFeed {
    events: mpsc::UnboundedReceiver<WsResult<FeedEvent>>,
}

impl FeedTransport for ScriptedFeed {
    async fn next_event(&mut self) -> WsResult<FeedEvent> {
        match self.events.recv().await {
            Some(event) => event,
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) {}
}

/// Connector handing out pre-scripted feeds, counting connect attempts.
struct ScriptedConnector {
    feeds: Mutex<VecDeque<ScriptedFeed>>,
    connects: AtomicUsize,
}

impl ScriptedConnector {
    /// A connector with `n` feeds; returns one frame sender per feed.
    fn with_feeds(n: usize) -> (Arc<Self>, Vec<mpsc::UnboundedSender<WsResult<FeedEvent>>>) {
        let mut feeds = VecDeque::new();
        let mut senders = Vec::new();
        for _ in 0..n {
            let (tx, rx) = mpsc::unbounded_channel();
            feeds.push_back(ScriptedFeed { events: rx });
            senders.push(tx);
        }
        let connector = Arc::new(Self {
            feeds: Mutex::new(feeds),
            connects: AtomicUsize::new(0),
        });
        (connector, senders)
    }

    fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl FeedConnector for ScriptedConnector {
    type Transport = ScriptedFeed;

    async fn connect(&self, _symbol: &str) -> WsResult<ScriptedFeed> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match self.feeds.lock().pop_front() {
            Some(feed) => Ok(feed),
            None => Err(WsError::ConnectionFailed("endpoint unreachable".to_string())),
        }
    }
}

/// Local wrapper: the orphan rule forbids implementing the foreign
/// `FeedConnector` trait for `Arc<ScriptedConnector>` directly.
struct TestConnector(Arc<ScriptedConnector>);

impl FeedConnector for TestConnector {
    type Transport = ScriptedFeed;

    async fn connect(&self, symbol: &str) -> WsResult<ScriptedFeed> {
        self.0.connect(symbol).await
    }
}

type TestController = SessionController<TestConnector>;

fn build_controller(
    connector: Arc<ScriptedConnector>,
) -> (
    TestController,
    mpsc::UnboundedReceiver<FilterEvent>,
    mpsc::UnboundedReceiver<SessionEnd>,
) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (ended_tx, ended_rx) = mpsc::unbounded_channel();
    let controller = SessionController::new(TestConnector(connector), events_tx, ended_tx);
    (controller, events_rx, ended_rx)
}

fn config() -> SessionConfig {
    SessionConfig::new("btcusdt", dec!(10000), dec!(10000)).unwrap()
}

fn frame(text: &str) -> WsResult<FeedEvent> {
    Ok(FeedEvent::Frame(text.to_string()))
}

async fn recv<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for channel")
        .expect("channel closed")
}

async fn wait_idle(controller: &TestController) {
    timeout(WAIT, async {
        while controller.state() != SessionState::Idle {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("controller did not return to idle");
}

#[tokio::test]
async fn ask_crossing_flows_end_to_end() {
    let (connector, feeds) = ScriptedConnector::with_feeds(1);
    let (controller, mut events_rx, mut ended_rx) = build_controller(connector);

    controller.start(config());
    feeds[0]
        .send(frame(r#"{"e":"depthUpdate","a":[["20000.00","1.0"]],"b":[]}"#))
        .unwrap();

    let event = recv(&mut events_rx).await;
    assert_eq!(event.side, Side::Ask);
    assert_eq!(event.price.inner(), dec!(20000.00));
    assert_eq!(event.quantity.inner(), dec!(1.0));
    assert_eq!(event.value, dec!(20000.00));

    controller.stop();
    let end = recv(&mut ended_rx).await;
    assert_eq!(end.reason, EndReason::UserStop);
    wait_idle(&controller).await;
}

#[tokio::test]
async fn bid_crossing_only() {
    let (connector, feeds) = ScriptedConnector::with_feeds(1);
    let (controller, mut events_rx, mut ended_rx) = build_controller(connector);

    controller.start(config());
    feeds[0]
        .send(frame(
            r#"{"e":"depthUpdate","a":[["5000.00","1.0"]],"b":[["50000.00","0.5"]]}"#,
        ))
        .unwrap();

    let event = recv(&mut events_rx).await;
    assert_eq!(event.side, Side::Bid);
    assert_eq!(event.value, dec!(25000.00));
    assert!(events_rx.try_recv().is_err(), "no ask event expected");

    controller.stop();
    recv(&mut ended_rx).await;
}

#[tokio::test]
async fn non_depth_events_ignored() {
    let (connector, feeds) = ScriptedConnector::with_feeds(1);
    let (controller, mut events_rx, mut ended_rx) = build_controller(connector);

    controller.start(config());
    // Subscribe ack, then a trade frame with level values that would
    // qualify: neither may produce output or end the session.
    feeds[0].send(frame(r#"{"result":null,"id":1}"#)).unwrap();
    feeds[0]
        .send(frame(r#"{"e":"trade","p":"50000.00","q":"2.0"}"#))
        .unwrap();
    feeds[0]
        .send(frame(r#"{"e":"depthUpdate","a":[["20000.00","1.0"]],"b":[]}"#))
        .unwrap();

    let event = recv(&mut events_rx).await;
    assert_eq!(event.side, Side::Ask);
    assert!(events_rx.try_recv().is_err());

    controller.stop();
    recv(&mut ended_rx).await;
}

#[tokio::test]
async fn malformed_frame_ends_session() {
    let (connector, feeds) = ScriptedConnector::with_feeds(1);
    let (controller, mut events_rx, mut ended_rx) = build_controller(connector);

    controller.start(config());
    feeds[0].send(frame("not json at all")).unwrap();

    let end = recv(&mut ended_rx).await;
    assert!(matches!(end.reason, EndReason::DecodeError(_)));
    assert!(events_rx.try_recv().is_err());
    wait_idle(&controller).await;
}

#[tokio::test]
async fn remote_close_ends_session() {
    let (connector, feeds) = ScriptedConnector::with_feeds(1);
    let (controller, _events_rx, mut ended_rx) = build_controller(connector);

    controller.start(config());
    feeds[0]
        .send(Ok(FeedEvent::Closed {
            code: 1000,
            reason: "server going away".to_string(),
        }))
        .unwrap();

    let end = recv(&mut ended_rx).await;
    assert_eq!(
        end.reason,
        EndReason::RemoteClose {
            code: 1000,
            reason: "server going away".to_string()
        }
    );
    wait_idle(&controller).await;
}

#[tokio::test]
async fn transport_error_ends_session() {
    let (connector, feeds) = ScriptedConnector::with_feeds(1);
    let (controller, _events_rx, mut ended_rx) = build_controller(connector);

    controller.start(config());
    feeds[0]
        .send(Err(WsError::ConnectionFailed("read failed".to_string())))
        .unwrap();

    let end = recv(&mut ended_rx).await;
    assert!(matches!(end.reason, EndReason::ConnectionError(_)));
    wait_idle(&controller).await;
}

#[tokio::test]
async fn connect_failure_reports_connection_error() {
    // Connector with no scripted feed: every attempt fails.
    let (connector, _feeds) = ScriptedConnector::with_feeds(0);
    let (controller, _events_rx, mut ended_rx) = build_controller(Arc::clone(&connector));

    controller.start(config());

    let end = recv(&mut ended_rx).await;
    assert!(matches!(end.reason, EndReason::ConnectionError(_)));
    assert_eq!(connector.connect_count(), 1);
    wait_idle(&controller).await;
}

#[tokio::test]
async fn start_is_idempotent() {
    let (connector, feeds) = ScriptedConnector::with_feeds(2);
    let (controller, mut events_rx, mut ended_rx) = build_controller(Arc::clone(&connector));

    controller.start(config());
    controller.start(config());

    feeds[0]
        .send(frame(r#"{"e":"depthUpdate","a":[["20000.00","1.0"]],"b":[]}"#))
        .unwrap();
    recv(&mut events_rx).await;

    // Exactly one connection despite two start calls.
    assert_eq!(connector.connect_count(), 1);

    controller.stop();
    recv(&mut ended_rx).await;
}

#[tokio::test]
async fn start_while_stopping_is_ignored() {
    let (connector, _feeds) = ScriptedConnector::with_feeds(2);
    let (controller, _events_rx, mut ended_rx) = build_controller(Arc::clone(&connector));

    controller.start(config());
    // Let the session task reach its frame loop before stopping.
    timeout(WAIT, async {
        while connector.connect_count() == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("session never connected");

    controller.stop();
    // On the current-thread runtime the session task has not observed the
    // cancellation yet, so the controller is still Stopping here.
    assert_eq!(controller.state(), SessionState::Stopping);
    controller.start(config());

    let end = recv(&mut ended_rx).await;
    assert_eq!(end.reason, EndReason::UserStop);
    wait_idle(&controller).await;
    assert_eq!(connector.connect_count(), 1);
}

#[tokio::test]
async fn stop_when_idle_is_noop() {
    let (connector, _feeds) = ScriptedConnector::with_feeds(1);
    let (controller, _events_rx, mut ended_rx) = build_controller(connector);

    controller.stop();

    assert_eq!(controller.state(), SessionState::Idle);
    assert!(ended_rx.try_recv().is_err(), "no end notification expected");
}

#[tokio::test]
async fn no_events_published_after_stop() {
    let (connector, feeds) = ScriptedConnector::with_feeds(1);
    let (controller, mut events_rx, mut ended_rx) = build_controller(connector);

    controller.start(config());
    feeds[0]
        .send(frame(r#"{"e":"depthUpdate","a":[["20000.00","1.0"]],"b":[]}"#))
        .unwrap();
    recv(&mut events_rx).await;

    controller.stop();
    // Qualifying frames delivered after the stop request: the cancellation
    // signal is observed first, so none of them may produce output.
    for _ in 0..3 {
        feeds[0]
            .send(frame(r#"{"e":"depthUpdate","a":[["30000.00","2.0"]],"b":[]}"#))
            .unwrap();
    }

    let end = recv(&mut ended_rx).await;
    assert_eq!(end.reason, EndReason::UserStop);
    assert!(events_rx.try_recv().is_err(), "no events after stop");
}

#[tokio::test]
async fn controller_is_reusable_after_session_end() {
    let (connector, feeds) = ScriptedConnector::with_feeds(2);
    let (controller, mut events_rx, mut ended_rx) = build_controller(Arc::clone(&connector));

    controller.start(config());
    controller.stop();
    recv(&mut ended_rx).await;
    wait_idle(&controller).await;

    // Second session reuses the same controller and output channels.
    controller.start(config());
    feeds[1]
        .send(frame(r#"{"e":"depthUpdate","a":[],"b":[["50000.00","0.5"]]}"#))
        .unwrap();

    let event = recv(&mut events_rx).await;
    assert_eq!(event.side, Side::Bid);
    assert_eq!(connector.connect_count(), 2);

    controller.stop();
    recv(&mut ended_rx).await;
}
