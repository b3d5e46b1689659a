//! Status and Metrics Endpoint
//!
//! Small HTTP server reporting the client's view of the world.
//!
//! # Endpoints
//!
//! - `GET /status` - JSON: connection state, loading flag, quote count
//! - `GET /healthz` - Liveness probe (simple OK)
//! - `GET /readyz` - Readiness probe (OK while the push channel is open)
//! - `GET /metrics` - Prometheus metrics in text format

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::domain::display::{ConnectionState, DisplaySnapshot, DisplayStore, UpdateSource};
use crate::infrastructure::metrics::get_metrics_handle;

// =============================================================================
// Status Response
// =============================================================================

/// Status response.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// Client version.
    pub version: String,
    /// Process uptime in seconds.
    pub uptime_secs: u64,
    /// Push channel state.
    pub connection: ConnectionState,
    /// Whether a snapshot load is in flight.
    pub loading: bool,
    /// Number of quotes displayed.
    pub quotes: usize,
    /// Display revision.
    pub revision: u64,
    /// Writer of the current list.
    pub last_source: Option<UpdateSource>,
    /// When the list was last replaced.
    pub updated_at: Option<DateTime<Utc>>,
}

impl StatusResponse {
    fn build(state: &StatusServerState, snapshot: &DisplaySnapshot) -> Self {
        Self {
            version: state.version.clone(),
            uptime_secs: state.started_at.elapsed().as_secs(),
            connection: snapshot.connection,
            loading: snapshot.loading,
            quotes: snapshot.quotes.len(),
            revision: snapshot.revision,
            last_source: snapshot.last_source,
            updated_at: snapshot.updated_at,
        }
    }
}

// =============================================================================
// Status Server
// =============================================================================

/// Shared state for the status server.
pub struct StatusServerState {
    version: String,
    started_at: Instant,
    store: DisplayStore,
}

impl StatusServerState {
    /// Create new status server state.
    #[must_use]
    pub fn new(version: String, store: DisplayStore) -> Self {
        Self {
            version,
            started_at: Instant::now(),
            store,
        }
    }
}

/// Status HTTP server.
pub struct StatusServer {
    port: u16,
    state: Arc<StatusServerState>,
    cancel: CancellationToken,
}

impl StatusServer {
    /// Create a new status server.
    #[must_use]
    pub const fn new(port: u16, state: Arc<StatusServerState>, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Build the router without binding a port.
    pub fn router(state: Arc<StatusServerState>) -> Router {
        Router::new()
            .route("/status", get(status_handler))
            .route("/healthz", get(liveness_handler))
            .route("/readyz", get(readiness_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(state)
    }

    /// Run the status server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `StatusServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), StatusServerError> {
        let app = Self::router(self.state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| StatusServerError::BindFailed(self.port, e.to_string()))?;

        tracing::info!(port = self.port, "Status server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| StatusServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Status server stopped");
        Ok(())
    }
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn status_handler(State(state): State<Arc<StatusServerState>>) -> impl IntoResponse {
    let snapshot = state.store.snapshot();
    Json(StatusResponse::build(&state, &snapshot))
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness_handler(State(state): State<Arc<StatusServerState>>) -> impl IntoResponse {
    if state.store.connection() == ConnectionState::Open {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
        },
    )
}

// =============================================================================
// Errors
// =============================================================================

/// Status server errors.
#[derive(Debug, thiserror::Error)]
pub enum StatusServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================
