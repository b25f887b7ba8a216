//! Supervised uplink listener.
//!
//! [`ConnectionManager`] owns a single background task that runs the
//! connect -> subscribe -> receive -> reconnect loop against a
//! [`BusConnector`], forwarding every inbound message to a
//! [`MessageHandler`]. The task runs until [`ConnectionManager::shutdown`]
//! is called; transport failures never end it.
//!
//! The current [`ListenerState`] is published on a [`watch`] channel so the
//! health endpoint can report it.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::processor::run_session;
use crate::reconnect::{wait_before_retry, ReconnectConfig};
use crate::transport::{BusConnector, MessageHandler};

/// How long [`ConnectionManager::shutdown`] waits for the task to exit.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle state of the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerState {
    /// Waiting to retry after a failure.
    Disconnected,
    /// Connecting and subscribing.
    Connecting,
    /// Subscribed and receiving.
    Subscribed,
    /// Shut down; no further attempts.
    Stopped,
}

impl ListenerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Subscribed => "subscribed",
            Self::Stopped => "stopped",
        }
    }
}

/// Result of [`ConnectionManager::shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The task exited on its own.
    Stopped,
    /// The task did not exit in time and was aborted.
    TimedOut,
}

/// Owns the listener task and its cancellation token.
pub struct ConnectionManager {
    state: watch::Receiver<ListenerState>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionManager {
    /// Spawn the listener task.
    ///
    /// Returns immediately; the first connection attempt happens in the
    /// background.
    pub fn start<C, H>(connector: C, handler: Arc<H>, reconnect: ReconnectConfig) -> Arc<Self>
    where
        C: BusConnector,
        H: MessageHandler,
    {
        let (state_tx, state_rx) = watch::channel(ListenerState::Disconnected);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            tracing::info!("Starting uplink listener");
            run_listener(&connector, handler.as_ref(), &reconnect, &state_tx, &task_cancel)
                .await;
            state_tx.send_replace(ListenerState::Stopped);
            tracing::info!("Uplink listener stopped");
        });

        Arc::new(Self {
            state: state_rx,
            cancel,
            task: Mutex::new(Some(task)),
        })
    }

    /// Current listener state.
    pub fn state(&self) -> ListenerState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change.
    pub fn subscribe_state(&self) -> watch::Receiver<ListenerState> {
        self.state.clone()
    }

    /// Stop the listener.
    ///
    /// Cancels the token and waits up to 5 seconds for the task to exit,
    /// aborting it after that. Calling this twice is harmless.
    pub async fn shutdown(&self) -> StopOutcome {
        tracing::info!("Shutting down uplink listener");
        self.cancel.cancel();

        let Some(mut handle) = self.task.lock().await.take() else {
            return StopOutcome::Stopped;
        };

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut handle).await {
            Ok(_) => StopOutcome::Stopped,
            Err(_) => {
                tracing::warn!(
                    timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
                    "Uplink listener did not stop in time, aborting",
                );
                handle.abort();
                StopOutcome::TimedOut
            }
        }
    }
}

/// Connection attempt numbering for log fields.
///
/// A run of failures counts up from 1. A subscribed session keeps its
/// number until its loss has been reported; the attempt after that is 1.
#[derive(Debug, Default)]
struct Attempts {
    current: u32,
    subscribed: bool,
}

impl Attempts {
    fn begin(&mut self) -> u32 {
        if std::mem::take(&mut self.subscribed) {
            self.current = 0;
        }
        self.current += 1;
        self.current
    }

    fn subscribed(&mut self) {
        self.subscribed = true;
    }
}

/// Connect -> receive -> wait -> reconnect, until cancelled.
async fn run_listener<C, H>(
    connector: &C,
    handler: &H,
    reconnect: &ReconnectConfig,
    state: &watch::Sender<ListenerState>,
    cancel: &CancellationToken,
) where
    C: BusConnector,
    H: MessageHandler,
{
    let mut attempts = Attempts::default();

    loop {
        let attempt = attempts.begin();
        state.send_replace(ListenerState::Connecting);

        let connected = tokio::select! {
            _ = cancel.cancelled() => return,
            result = connector.connect() => result,
        };

        let error = match connected {
            Ok(mut subscription) => {
                tracing::info!(attempt, "Subscribed to uplink topic");
                attempts.subscribed();
                state.send_replace(ListenerState::Subscribed);

                match run_session(&mut subscription, handler, cancel).await {
                    Ok(()) => return,
                    Err(e) => e,
                }
            }
            Err(e) => e,
        };

        state.send_replace(ListenerState::Disconnected);
        tracing::warn!(
            error = %error,
            attempt,
            retry_in_secs = reconnect.delay.as_secs_f64(),
            "Uplink listener disconnected, retrying",
        );

        if !wait_before_retry(reconnect, cancel).await {
            return;
        }
    }
}
