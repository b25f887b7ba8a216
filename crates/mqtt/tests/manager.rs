//! Tests for `ConnectionManager` against a scripted transport.
//!
//! The fake connector hands out a queue of connection results; each fake
//! subscription yields a queue of messages or errors and then idles. This
//! exercises reconnection, ordering and shutdown without a broker.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use aquaalert_mqtt::reconnect::ReconnectConfig;
use aquaalert_mqtt::{
    BusConnector, ConnectionManager, InboundMessage, ListenerState, MessageHandler, StopOutcome,
    Subscription, TransportError,
};
use tokio::sync::{mpsc, watch};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct FakeSubscription {
    items: VecDeque<Result<InboundMessage, TransportError>>,
}

impl Subscription for FakeSubscription {
    async fn next_message(&mut self) -> Result<InboundMessage, TransportError> {
        match self.items.pop_front() {
            Some(item) => item,
            None => std::future::pending().await,
        }
    }
}

struct FakeConnector {
    attempts: Arc<AtomicUsize>,
    script: Mutex<VecDeque<Result<FakeSubscription, TransportError>>>,
}

impl FakeConnector {
    fn new(script: Vec<Result<FakeSubscription, TransportError>>) -> (Self, Arc<AtomicUsize>) {
        let attempts = Arc::new(AtomicUsize::new(0));
        let connector = Self {
            attempts: Arc::clone(&attempts),
            script: Mutex::new(script.into()),
        };
        (connector, attempts)
    }
}

impl BusConnector for FakeConnector {
    type Subscription = FakeSubscription;

    async fn connect(&self) -> Result<FakeSubscription, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}

struct ForwardingHandler {
    tx: mpsc::UnboundedSender<InboundMessage>,
}

impl MessageHandler for ForwardingHandler {
    async fn handle(&self, message: InboundMessage) {
        let _ = self.tx.send(message);
    }
}

/// Handler that never finishes.
struct StuckHandler;

impl MessageHandler for StuckHandler {
    async fn handle(&self, _message: InboundMessage) {
        tokio::time::sleep(Duration::from_secs(3600)).await;
    }
}

fn uplink(topic: &str) -> InboundMessage {
    InboundMessage {
        topic: topic.to_string(),
        payload: vec![0x01, 0xF4, 0x0E, 0xD8],
    }
}

fn session(items: Vec<Result<InboundMessage, TransportError>>) -> Result<FakeSubscription, TransportError> {
    Ok(FakeSubscription {
        items: items.into(),
    })
}

fn fast_retry() -> ReconnectConfig {
    ReconnectConfig::with_delay(Duration::from_millis(20))
}

async fn wait_for_state(rx: &mut watch::Receiver<ListenerState>, target: ListenerState) {
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| *s == target))
        .await
        .expect("state not reached in time")
        .expect("state channel closed");
}

async fn recv(rx: &mut mpsc::UnboundedReceiver<InboundMessage>) -> InboundMessage {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("message not delivered in time")
        .expect("handler channel closed")
}

// ---------------------------------------------------------------------------
// Test: messages are forwarded unmodified and in order
// ---------------------------------------------------------------------------

#[tokio::test]
async fn forwards_messages_in_order() {
    let (connector, _) = FakeConnector::new(vec![session(vec![
        Ok(uplink("application/1/device/a/event/up")),
        Ok(uplink("application/1/device/b/event/up")),
    ])]);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let manager = ConnectionManager::start(
        connector,
        Arc::new(ForwardingHandler { tx }),
        fast_retry(),
    );

    let first = recv(&mut rx).await;
    let second = recv(&mut rx).await;
    assert_eq!(first.topic, "application/1/device/a/event/up");
    assert_eq!(first.payload, vec![0x01, 0xF4, 0x0E, 0xD8]);
    assert_eq!(second.topic, "application/1/device/b/event/up");

    assert_eq!(manager.shutdown().await, StopOutcome::Stopped);
}

// ---------------------------------------------------------------------------
// Test: connect failure and session loss both lead to a retry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reconnects_after_failures() {
    let (connector, attempts) = FakeConnector::new(vec![
        Err(TransportError::Connection("refused".into())),
        session(vec![
            Ok(uplink("application/1/device/a/event/up")),
            Err(TransportError::Lost("reset by peer".into())),
        ]),
        session(vec![Ok(uplink("application/1/device/b/event/up"))]),
    ]);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let manager = ConnectionManager::start(
        connector,
        Arc::new(ForwardingHandler { tx }),
        fast_retry(),
    );

    assert_eq!(recv(&mut rx).await.topic, "application/1/device/a/event/up");
    assert_eq!(recv(&mut rx).await.topic, "application/1/device/b/event/up");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);

    let mut state = manager.subscribe_state();
    wait_for_state(&mut state, ListenerState::Subscribed).await;

    manager.shutdown().await;
}

// ---------------------------------------------------------------------------
// Test: a lost session resumes within one retry interval
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lost_session_resumes_within_one_retry_interval() {
    let delay = Duration::from_millis(200);
    let margin = Duration::from_millis(250);
    let (connector, attempts) = FakeConnector::new(vec![
        session(vec![
            Ok(uplink("application/1/device/a/event/up")),
            Err(TransportError::Lost("keepalive timeout".into())),
        ]),
        session(vec![Ok(uplink("application/1/device/b/event/up"))]),
    ]);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let started = Instant::now();
    let manager = ConnectionManager::start(
        connector,
        Arc::new(ForwardingHandler { tx }),
        ReconnectConfig::with_delay(delay),
    );

    assert_eq!(recv(&mut rx).await.topic, "application/1/device/a/event/up");
    let lost_at = Instant::now();

    assert_eq!(recv(&mut rx).await.topic, "application/1/device/b/event/up");
    let resumed_after = lost_at.elapsed();

    assert!(
        started.elapsed() >= delay,
        "reconnected before the retry delay elapsed"
    );
    assert!(
        resumed_after <= delay + margin,
        "resumed after {resumed_after:?}, expected at most {:?}",
        delay + margin
    );
    assert_eq!(attempts.load(Ordering::SeqCst), 2);

    manager.shutdown().await;
}

// ---------------------------------------------------------------------------
// Test: shutdown during the retry delay stops promptly
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_interrupts_retry_delay() {
    let (connector, attempts) =
        FakeConnector::new(vec![Err(TransportError::Connection("refused".into()))]);
    let (tx, _rx) = mpsc::unbounded_channel();

    let manager = ConnectionManager::start(
        connector,
        Arc::new(ForwardingHandler { tx }),
        ReconnectConfig::with_delay(Duration::from_secs(60)),
    );

    let mut state = manager.subscribe_state();
    wait_for_state(&mut state, ListenerState::Disconnected).await;
    // Let the task reach the sleep.
    tokio::time::sleep(Duration::from_millis(20)).await;

    let outcome = tokio::time::timeout(Duration::from_secs(1), manager.shutdown())
        .await
        .expect("shutdown should not wait for the retry delay");

    assert_eq!(outcome, StopOutcome::Stopped);
    assert_eq!(manager.state(), ListenerState::Stopped);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Test: shutdown while a handler is running does not wait for it
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_abandons_in_flight_message() {
    let (connector, _) = FakeConnector::new(vec![session(vec![Ok(uplink(
        "application/1/device/a/event/up",
    ))])]);

    let manager = ConnectionManager::start(connector, Arc::new(StuckHandler), fast_retry());

    let mut state = manager.subscribe_state();
    wait_for_state(&mut state, ListenerState::Subscribed).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let outcome = tokio::time::timeout(Duration::from_secs(1), manager.shutdown())
        .await
        .expect("shutdown should not wait for the handler");
    assert_eq!(outcome, StopOutcome::Stopped);
}

// ---------------------------------------------------------------------------
// Test: shutdown is idempotent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_twice_is_harmless() {
    let (connector, _) = FakeConnector::new(vec![session(vec![])]);
    let (tx, _rx) = mpsc::unbounded_channel();

    let manager = ConnectionManager::start(
        connector,
        Arc::new(ForwardingHandler { tx }),
        fast_retry(),
    );

    assert_eq!(manager.shutdown().await, StopOutcome::Stopped);
    assert_eq!(manager.shutdown().await, StopOutcome::Stopped);
    assert_eq!(manager.state(), ListenerState::Stopped);
}
