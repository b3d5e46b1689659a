//! Quote Board Session
//!
//! The consuming context for the loader and the live feed. Starting a board
//! opens the push channel once; every count change triggers a single
//! snapshot load. Both write the same display store and the last write wins.
//!
//! The push channel is count-agnostic: changing the count never reopens or
//! re-parameterizes it.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::live_feed::{FeedEvent, FeedHandle, LiveFeedClient, LiveFeedConfig};
use super::snapshot_loader::{LoadOutcome, SnapshotLoader};
use crate::application::ports::{FeedConnector, SnapshotSource};
use crate::domain::display::{DisplaySnapshot, DisplayStore};
use crate::domain::quotes::RequestedCount;

/// A running stock list: display store, live feed and snapshot loads.
pub struct QuoteBoard {
    store: DisplayStore,
    loader: Arc<SnapshotLoader>,
    feed: FeedHandle,
    loads: parking_lot::Mutex<JoinSet<LoadOutcome>>,
    count: parking_lot::RwLock<Option<RequestedCount>>,
}

impl QuoteBoard {
    /// Create the display store and start the live feed.
    ///
    /// No snapshot is loaded until [`QuoteBoard::set_count`] is called.
    #[must_use]
    pub fn start(
        source: Arc<dyn SnapshotSource>,
        connector: Arc<dyn FeedConnector>,
        config: LiveFeedConfig,
    ) -> Self {
        let store = DisplayStore::new();
        let loader = Arc::new(SnapshotLoader::new(source, store.clone()));
        let feed =
            LiveFeedClient::new(connector, store.clone(), config, CancellationToken::new()).spawn();

        Self {
            store,
            loader,
            feed,
            loads: parking_lot::Mutex::new(JoinSet::new()),
            count: parking_lot::RwLock::new(None),
        }
    }

    /// Change the requested count and load a fresh snapshot for it.
    ///
    /// The load runs in the background; its outcome only shows up in the
    /// display store.
    pub fn set_count(&self, count: RequestedCount) {
        *self.count.write() = Some(count);
        tracing::info!(count = count.get(), "Requested count changed");

        let loader = Arc::clone(&self.loader);
        let mut loads = self.loads.lock();
        // Reap finished loads so the set does not grow without bound.
        while loads.try_join_next().is_some() {}
        loads.spawn(async move { loader.load(count).await });
    }

    /// Most recently requested count.
    #[must_use]
    pub fn count(&self) -> Option<RequestedCount> {
        *self.count.read()
    }

    /// Current display value.
    #[must_use]
    pub fn snapshot(&self) -> DisplaySnapshot {
        self.store.snapshot()
    }

    /// Follow display changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DisplaySnapshot> {
        self.store.subscribe()
    }

    /// Follow feed diagnostics.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<FeedEvent> {
        self.feed.events()
    }

    /// Shared display store.
    #[must_use]
    pub const fn store(&self) -> &DisplayStore {
        &self.store
    }

    /// Stop the live feed and abort in-flight loads.
    pub async fn shutdown(self) {
        tracing::info!("Shutting down quote board");
        self.feed.shutdown().await;

        let mut loads = self.loads.into_inner();
        loads.shutdown().await;
    }
}
