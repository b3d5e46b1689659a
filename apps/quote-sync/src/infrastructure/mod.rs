//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer, plus the process-level plumbing.

/// HTTP snapshot adapter (`reqwest`).
pub mod snapshot;

/// WebSocket push channel adapter (`tokio-tungstenite`).
pub mod websocket;

/// Configuration loaded from the environment.
pub mod config;

/// Status, readiness and metrics HTTP endpoint.
pub mod health;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Terminal rendering of the stock table.
pub mod render;

/// Tracing subscriber and OpenTelemetry integration.
pub mod telemetry;
