//! Application Services
//!
//! Services that drive the synchronization between upstream and the
//! display store.
//!
//! - `SnapshotLoader`: one-shot pull for a requested count
//! - `LiveFeedClient`: push channel with fixed-delay reconnection
//! - `QuoteBoard`: session owning the store, the feed and the loads

pub mod board;
pub mod live_feed;
pub mod reconnect;
pub mod snapshot_loader;

pub use board::QuoteBoard;
pub use live_feed::{DEFAULT_EVENT_CAPACITY, FeedEvent, FeedHandle, LiveFeedClient, LiveFeedConfig};
pub use reconnect::{DEFAULT_RECONNECT_DELAY, ReconnectConfig, ReconnectPolicy};
pub use snapshot_loader::{LoadOutcome, SnapshotLoader};
