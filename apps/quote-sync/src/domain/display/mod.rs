//! Display State
//!
//! The single value rendered to the user: the current quote list, the
//! loading flag and the push channel's connection state. Two writers touch
//! it (the snapshot loader and the live feed); both fully overwrite the
//! quote list and the last write wins.
//!
//! Writes are serialized through a `watch` channel, so any number of
//! renderers can follow changes without polling.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use super::quotes::QuoteList;

// =============================================================================
// Connection State
// =============================================================================

/// Lifecycle of one push channel attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Opening a new channel.
    #[default]
    Connecting,
    /// Channel established and receiving frames.
    Open,
    /// Channel gone; a retry is pending unless torn down.
    Closed,
}

impl ConnectionState {
    /// State name for logs and status output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Which writer produced the current quote list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateSource {
    /// HTTP snapshot pull.
    Snapshot,
    /// WebSocket push frame.
    Feed,
}

// =============================================================================
// Display Snapshot
// =============================================================================

/// Point-in-time copy of everything a renderer needs.
#[derive(Debug, Clone, Default)]
pub struct DisplaySnapshot {
    /// Quotes to show, in upstream order.
    pub quotes: QuoteList,
    /// Whether a snapshot load is in flight.
    pub loading: bool,
    /// Push channel state.
    pub connection: ConnectionState,
    /// Writer of the current quote list (`None` until the first write).
    pub last_source: Option<UpdateSource>,
    /// When the quote list was last replaced.
    pub updated_at: Option<DateTime<Utc>>,
    /// Incremented on every quote list replacement.
    pub revision: u64,
}

// =============================================================================
// Display Store
// =============================================================================

/// Shared, last-write-wins cell holding the [`DisplaySnapshot`].
///
/// Cloning the store is cheap; every clone writes to the same cell.
#[derive(Debug, Clone)]
pub struct DisplayStore {
    tx: Arc<watch::Sender<DisplaySnapshot>>,
}

impl Default for DisplayStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayStore {
    /// Create a store with an empty list and the loading flag cleared.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DisplaySnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    /// Replace the whole quote list.
    pub fn replace_quotes(&self, quotes: QuoteList, source: UpdateSource) {
        self.tx.send_modify(|state| {
            state.quotes = quotes;
            state.last_source = Some(source);
            state.updated_at = Some(Utc::now());
            state.revision += 1;
        });
    }

    /// Set the loading flag.
    pub fn set_loading(&self, loading: bool) {
        self.tx.send_if_modified(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        });
    }

    /// Set the push channel state.
    pub fn set_connection(&self, connection: ConnectionState) {
        self.tx.send_if_modified(|state| {
            let changed = state.connection != connection;
            state.connection = connection;
            changed
        });
    }

    /// Current value.
    #[must_use]
    pub fn snapshot(&self) -> DisplaySnapshot {
        self.tx.borrow().clone()
    }

    /// Current quote list.
    #[must_use]
    pub fn quotes(&self) -> QuoteList {
        self.tx.borrow().quotes.clone()
    }

    /// Current loading flag.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.tx.borrow().loading
    }

    /// Current connection state.
    #[must_use]
    pub fn connection(&self) -> ConnectionState {
        self.tx.borrow().connection
    }

    /// Follow changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DisplaySnapshot> {
        self.tx.subscribe()
    }
}
