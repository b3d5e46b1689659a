//! Live Feed Client
//!
//! Keeps a push channel open to the quote service and overwrites the
//! display with every list it receives.
//!
//! # Lifecycle
//!
//! ```text
//!            open ok             close / error
//! Connecting ───────► Open ─────────────────► Closed
//!     ▲   │ open failed                          │
//!     │   └──────────────────────────────────────┤
//!     └────────────── fixed delay ◄──────────────┘
//! ```
//!
//! Each attempt asks the connector for a brand-new channel. The loop only
//! ends when its cancellation token fires; the token is raced against the
//! connect, every receive and the reconnect delay.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::reconnect::{ReconnectConfig, ReconnectPolicy};
use crate::application::ports::{ChannelError, FeedConnector};
use crate::domain::display::{ConnectionState, DisplayStore, UpdateSource};
use crate::domain::quotes::QuoteList;
use crate::infrastructure::metrics;

/// Default capacity of the diagnostic event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

// =============================================================================
// Feed Events
// =============================================================================

/// Diagnostic events emitted by the live feed client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// Opening a channel.
    Connecting {
        /// Consecutive attempt number since the last successful open (0 for the first).
        attempt: u32,
    },
    /// Channel opened.
    Connected,
    /// A push frame replaced the display.
    Updated {
        /// Number of quotes in the frame.
        symbols: usize,
    },
    /// A push frame did not decode; display unchanged.
    DecodeFailed {
        /// Decoder message.
        error: String,
    },
    /// Channel closed or could not be opened.
    Disconnected {
        /// Why the channel went away.
        reason: String,
    },
    /// Waiting before the next attempt.
    Reconnecting {
        /// Attempt about to be made.
        attempt: u32,
        /// Wait before it.
        delay: Duration,
    },
    /// Client torn down; no further attempts.
    Stopped,
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for the live feed client.
#[derive(Debug, Clone, Copy)]
pub struct LiveFeedConfig {
    /// Reconnection configuration.
    pub reconnect: ReconnectConfig,
    /// Capacity of the diagnostic event channel.
    pub event_capacity: usize,
}

impl Default for LiveFeedConfig {
    fn default() -> Self {
        Self {
            reconnect: ReconnectConfig::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// How one open channel ended.
#[derive(Debug)]
enum SessionEnd {
    /// Teardown requested.
    Cancelled,
    /// Peer closed or the transport failed.
    Closed(String),
}

// =============================================================================
// Live Feed Client
// =============================================================================

/// Push channel client with fixed-delay reconnection.
pub struct LiveFeedClient {
    connector: Arc<dyn FeedConnector>,
    store: DisplayStore,
    config: LiveFeedConfig,
    event_tx: broadcast::Sender<FeedEvent>,
    cancel: CancellationToken,
}

impl LiveFeedClient {
    /// Create a new client writing to `store`.
    #[must_use]
    pub fn new(
        connector: Arc<dyn FeedConnector>,
        store: DisplayStore,
        config: LiveFeedConfig,
        cancel: CancellationToken,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            connector,
            store,
            config,
            event_tx,
            cancel,
        }
    }

    /// Subscribe to diagnostic events.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<FeedEvent> {
        self.event_tx.subscribe()
    }

    /// Spawn the connection loop on the current runtime.
    ///
    /// The returned handle owns the loop; shutting it down (or dropping it)
    /// cancels any pending reconnect and closes the live channel.
    #[must_use]
    pub fn spawn(self) -> FeedHandle {
        let cancel = self.cancel.clone();
        let event_tx = self.event_tx.clone();
        let task = tokio::spawn(self.run());
        FeedHandle {
            cancel,
            task: Some(task),
            event_tx,
        }
    }

    /// Run the connection loop until cancelled.
    pub async fn run(self) {
        let mut reconnect_policy = ReconnectPolicy::new(self.config.reconnect);

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let attempt = reconnect_policy.attempt_count();
            self.store.set_connection(ConnectionState::Connecting);
            self.emit(FeedEvent::Connecting { attempt });

            let reason = match self.connect_and_run(&mut reconnect_policy).await {
                Ok(SessionEnd::Cancelled) => break,
                Ok(SessionEnd::Closed(reason)) => reason,
                Err(e) => e.to_string(),
            };

            self.store.set_connection(ConnectionState::Closed);
            metrics::set_feed_connected(false);
            tracing::info!(reason = %reason, "WebSocket closed. Reconnecting...");
            self.emit(FeedEvent::Disconnected { reason });

            let delay = reconnect_policy.next_delay();
            let attempt = reconnect_policy.attempt_count();
            self.emit(FeedEvent::Reconnecting { attempt, delay });

            tokio::select! {
                () = self.cancel.cancelled() => {
                    tracing::debug!("Feed cancelled during reconnect delay");
                    break;
                }
                () = tokio::time::sleep(delay) => {
                    metrics::record_reconnect();
                }
            }
        }

        self.store.set_connection(ConnectionState::Closed);
        metrics::set_feed_connected(false);
        self.emit(FeedEvent::Stopped);
        tracing::info!("Live feed stopped");
    }

    /// Open one channel and pump it until it closes or we are cancelled.
    async fn connect_and_run(
        &self,
        reconnect_policy: &mut ReconnectPolicy,
    ) -> Result<SessionEnd, ChannelError> {
        tracing::debug!(endpoint = self.connector.endpoint(), "Connecting to feed");

        let mut channel = tokio::select! {
            () = self.cancel.cancelled() => return Ok(SessionEnd::Cancelled),
            result = self.connector.connect() => result?,
        };

        reconnect_policy.reset();
        self.store.set_connection(ConnectionState::Open);
        metrics::set_feed_connected(true);
        tracing::info!("WebSocket connected");
        self.emit(FeedEvent::Connected);

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    channel.close().await;
                    return Ok(SessionEnd::Cancelled);
                }
                frame = channel.recv() => {
                    match frame {
                        Ok(Some(text)) => self.apply_frame(&text),
                        Ok(None) => return Ok(SessionEnd::Closed("closed by peer".to_string())),
                        Err(e) => return Err(e),
                    }
                }
            }
        }
    }

    /// Decode one push frame and overwrite the display with it.
    fn apply_frame(&self, text: &str) {
        match QuoteList::from_json(text) {
            Ok(quotes) => {
                let symbols = quotes.len();
                self.store.replace_quotes(quotes, UpdateSource::Feed);
                metrics::record_feed_message();
                metrics::set_quotes_displayed(symbols);
                tracing::trace!(symbols, "Feed update applied");
                self.emit(FeedEvent::Updated { symbols });
            }
            Err(e) => {
                metrics::record_decode_failure();
                tracing::warn!(error = %e, "Dropping malformed feed message");
                self.emit(FeedEvent::DecodeFailed {
                    error: e.to_string(),
                });
            }
        }
    }

    fn emit(&self, event: FeedEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }
}

// =============================================================================
// Feed Handle
// =============================================================================

/// Owner of a running [`LiveFeedClient`] loop.
///
/// Holds the cancellation token and the task handle together so teardown
/// is explicit: cancel first, then wait for the channel to be released.
pub struct FeedHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    event_tx: broadcast::Sender<FeedEvent>,
}

impl FeedHandle {
    /// Subscribe to diagnostic events.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<FeedEvent> {
        self.event_tx.subscribe()
    }

    /// Whether teardown has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel the loop and wait until it has closed its channel.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::error!(error = %e, "Live feed task failed");
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for FeedHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedHandle")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
