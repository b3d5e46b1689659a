//! HTTP Snapshot Adapter
//!
//! Implements `SnapshotSource` against the quote service's REST endpoint:
//! `GET <host>/api/stocks?n=<count>` returning a JSON array of quotes.

use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{FetchError, SnapshotSource};
use crate::domain::quotes::{QuoteList, RequestedCount};

/// Path of the snapshot endpoint relative to the host.
pub const SNAPSHOT_PATH: &str = "/api/stocks";

/// Snapshot source backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSnapshotSource {
    /// Create a source for `host` (scheme and authority, e.g. `http://localhost:3001`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(host: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: format!("{}{SNAPSHOT_PATH}", host.trim_end_matches('/')),
        })
    }

    /// Full endpoint URL without the query string.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self, count: RequestedCount) -> Result<QuoteList, FetchError> {
        tracing::debug!(url = %self.url, count = count.get(), "Fetching stock snapshot");

        let response = self
            .client
            .get(&self.url)
            .query(&[("n", count.get())])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        QuoteList::from_json(&text).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
