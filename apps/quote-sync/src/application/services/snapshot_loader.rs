//! Snapshot Loader
//!
//! Pulls the current quote list once for a requested count and writes it
//! to the display store. Failures are logged and swallowed: the display
//! keeps whatever it showed before and no retry is scheduled.

use std::sync::Arc;
use std::time::Instant;

use crate::application::ports::SnapshotSource;
use crate::domain::display::{DisplayStore, UpdateSource};
use crate::domain::quotes::RequestedCount;
use crate::infrastructure::metrics::{self, SnapshotOutcome};

/// Result of one [`SnapshotLoader::load`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The pulled list replaced the display.
    Applied {
        /// Number of quotes now displayed.
        symbols: usize,
    },
    /// The pull failed and the display was left alone.
    Failed,
}

/// One-shot snapshot loader.
pub struct SnapshotLoader {
    source: Arc<dyn SnapshotSource>,
    store: DisplayStore,
}

impl SnapshotLoader {
    /// Create a loader writing to `store`.
    #[must_use]
    pub fn new(source: Arc<dyn SnapshotSource>, store: DisplayStore) -> Self {
        Self { source, store }
    }

    /// Pull `count` quotes and replace the display with them.
    ///
    /// The loading flag is raised for the duration of the call and cleared
    /// exactly once at the end, whatever the outcome.
    #[tracing::instrument(skip_all, fields(count = count.get()))]
    pub async fn load(&self, count: RequestedCount) -> LoadOutcome {
        self.store.set_loading(true);
        let started = Instant::now();

        let outcome = match self.source.fetch(count).await {
            Ok(quotes) => {
                let symbols = quotes.len();
                self.store.replace_quotes(quotes, UpdateSource::Snapshot);
                metrics::record_snapshot(SnapshotOutcome::Success, started.elapsed());
                metrics::set_quotes_displayed(symbols);
                tracing::debug!(symbols, "Snapshot applied");
                LoadOutcome::Applied { symbols }
            }
            Err(e) => {
                metrics::record_snapshot(SnapshotOutcome::Failure, started.elapsed());
                tracing::warn!(error = %e, "Error fetching stocks");
                LoadOutcome::Failed
            }
        };

        self.store.set_loading(false);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{FetchError, MockSnapshotSource};
    use crate::domain::quotes::{QuoteList, QuoteRecord};
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    fn quotes(symbols: &[&str]) -> QuoteList {
        symbols
            .iter()
            .map(|s| QuoteRecord::new(*s, Decimal::new(10, 0), Decimal::new(105, 1), 5))
            .collect::<Vec<_>>()
            .into()
    }

    fn count(n: u8) -> RequestedCount {
        RequestedCount::new(n).unwrap()
    }

    #[tokio::test]
    async fn success_replaces_display() {
        let mut source = MockSnapshotSource::new();
        source
            .expect_fetch()
            .with(eq(count(3)))
            .times(1)
            .returning(|_| Ok(quotes(&["A", "B", "C"])));

        let store = DisplayStore::new();
        let loader = SnapshotLoader::new(Arc::new(source), store.clone());

        let outcome = loader.load(count(3)).await;

        assert_eq!(outcome, LoadOutcome::Applied { symbols: 3 });
        assert_eq!(store.quotes().symbols(), vec!["A", "B", "C"]);
        assert!(!store.is_loading());
        assert_eq!(store.snapshot().last_source, Some(UpdateSource::Snapshot));
    }

    #[tokio::test]
    async fn failure_on_first_load_leaves_display_empty() {
        let mut source = MockSnapshotSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|_| Err(FetchError::Network("connection refused".to_string())));

        let store = DisplayStore::new();
        let loader = SnapshotLoader::new(Arc::new(source), store.clone());

        let outcome = loader.load(count(5)).await;

        assert_eq!(outcome, LoadOutcome::Failed);
        assert!(store.quotes().is_empty());
        assert!(!store.is_loading());
        assert_eq!(store.snapshot().revision, 0);
    }

    #[tokio::test]
    async fn failure_keeps_previous_display() {
        let mut source = MockSnapshotSource::new();
        source
            .expect_fetch()
            .with(eq(count(2)))
            .times(1)
            .returning(|_| Ok(quotes(&["AAPL", "MSFT"])));
        source
            .expect_fetch()
            .with(eq(count(4)))
            .times(1)
            .returning(|_| {
                Err(FetchError::Status {
                    status: 500,
                    body: "boom".to_string(),
                })
            });

        let store = DisplayStore::new();
        let loader = SnapshotLoader::new(Arc::new(source), store.clone());

        loader.load(count(2)).await;
        let outcome = loader.load(count(4)).await;

        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(store.quotes().symbols(), vec!["AAPL", "MSFT"]);
        assert!(!store.is_loading());
    }

    /// Holds every fetch until the test releases it.
    struct GatedSource {
        release: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl SnapshotSource for GatedSource {
        async fn fetch(&self, _count: RequestedCount) -> Result<QuoteList, FetchError> {
            self.release.notified().await;
            Err(FetchError::Decode("expected array".to_string()))
        }
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn loading_flag_raised_then_cleared_once() {
        let source = Arc::new(GatedSource {
            release: tokio::sync::Notify::new(),
        });
        let store = DisplayStore::new();
        let loader = SnapshotLoader::new(
            Arc::clone(&source) as Arc<dyn SnapshotSource>,
            store.clone(),
        );

        let mut rx = store.subscribe();
        rx.mark_unchanged();
        let watcher = tokio::spawn(async move {
            let mut seen = Vec::new();
            while rx.changed().await.is_ok() {
                let loading = rx.borrow_and_update().loading;
                seen.push(loading);
                if !loading {
                    break;
                }
            }
            seen
        });

        let load = tokio::spawn(async move { loader.load(count(1)).await });
        settle().await;

        assert!(store.is_loading());
        assert!(!load.is_finished());

        source.release.notify_one();
        assert_eq!(load.await.unwrap(), LoadOutcome::Failed);
        assert!(!store.is_loading());
        assert_eq!(watcher.await.unwrap(), vec![true, false]);
    }
}
