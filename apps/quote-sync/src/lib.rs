#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::items_after_statements
    )
)]

//! Quote Sync - Live Stock List Client
//!
//! Keeps a bounded list of stock quotes current: an HTTP snapshot seeds the
//! list for the requested count, then a WebSocket push channel overwrites
//! it with every list upstream sends. The channel reconnects after a fixed
//! delay whenever it closes, until the session is shut down.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Quote types and the shared display state
//!   - `quotes`: Quote records, lists and the requested count
//!   - `display`: Last-write-wins display cell
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Snapshot source and push channel interfaces
//!   - `services`: Snapshot loader, live feed client, quote board session
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `snapshot`: `reqwest` snapshot source
//!   - `websocket`: `tokio-tungstenite` push channel
//!   - `config`: Environment configuration
//!   - `health`: Status endpoint
//!
//! # Data Flow
//!
//! ```text
//! GET /api/stocks?n=N ──► SnapshotLoader ──┐
//!                                          ├──► DisplayStore ──► renderers
//! WS /ws ───────────────► LiveFeedClient ──┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Quote types and display state.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::display::{ConnectionState, DisplaySnapshot, DisplayStore, UpdateSource};
pub use domain::quotes::{DecodeError, QuoteList, QuoteRecord, RequestedCount};

// Ports
pub use application::ports::{ChannelError, FeedChannel, FeedConnector, FetchError, SnapshotSource};

// Services
pub use application::services::{
    FeedEvent, FeedHandle, LiveFeedClient, LiveFeedConfig, LoadOutcome, QuoteBoard,
    ReconnectConfig, ReconnectPolicy, SnapshotLoader,
};

// Adapters
pub use infrastructure::config::{ClientConfig, ConfigError};
pub use infrastructure::health::{StatusServer, StatusServerError, StatusServerState};
pub use infrastructure::snapshot::HttpSnapshotSource;
pub use infrastructure::websocket::WebSocketConnector;

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
