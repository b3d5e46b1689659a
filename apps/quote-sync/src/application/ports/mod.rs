//! Port Interfaces
//!
//! Contracts the synchronization services need from the outside world.
//! Infrastructure adapters implement them over HTTP and WebSocket; tests
//! implement them with scripted fakes.
//!
//! ## Driven Ports (Outbound)
//!
//! - `SnapshotSource`: one-shot pull of the current quote list
//! - `FeedConnector`: opens a fresh push channel per attempt
//! - `FeedChannel`: one open push channel

use async_trait::async_trait;

use crate::domain::quotes::{QuoteList, RequestedCount};

// =============================================================================
// Snapshot Source
// =============================================================================

/// Errors from a snapshot pull.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Transport failure (DNS, refused connection, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// Upstream answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// Response body was not a quote list.
    #[error("decode error: {0}")]
    Decode(String),
}

/// One-shot pull of the current quote list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch `count` quotes. Exactly one network read per call.
    async fn fetch(&self, count: RequestedCount) -> Result<QuoteList, FetchError>;
}

// =============================================================================
// Push Channel
// =============================================================================

/// Errors from the push channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// Channel could not be opened.
    #[error("connect failed: {0}")]
    Connect(String),

    /// Channel broke while open.
    #[error("transport error: {0}")]
    Transport(String),
}

/// A single open push channel.
///
/// Once [`FeedChannel::recv`] reports the end of the stream or an error
/// the channel is spent; callers open a new one instead of reusing it.
#[async_trait]
pub trait FeedChannel: Send {
    /// Wait for the next text payload.
    ///
    /// Returns `Ok(None)` when the peer closed the channel normally.
    async fn recv(&mut self) -> Result<Option<String>, ChannelError>;

    /// Close the channel from our side.
    async fn close(&mut self);
}

/// Opens push channels to a fixed endpoint.
#[async_trait]
pub trait FeedConnector: Send + Sync {
    /// Open a brand-new channel.
    async fn connect(&self) -> Result<Box<dyn FeedChannel>, ChannelError>;

    /// Endpoint description for logs.
    fn endpoint(&self) -> &str;
}
