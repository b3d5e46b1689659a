//! Prometheus Metrics Module
//!
//! Exposes client metrics via Prometheus format for monitoring.
//!
//! # Metrics Categories
//!
//! - **Snapshots**: Pull requests by outcome and their latency
//! - **Feed**: Push frames applied, decode failures, reconnect attempts
//! - **Display**: Connection state and number of quotes shown
//!
//! # Integration
//!
//! Metrics are rendered at `/metrics` on the status server port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Calling this more than once returns the handle installed first.
///
/// # Errors
///
/// Returns an error if another global recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();

    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "quote_sync_snapshot_requests_total",
        "Snapshot pulls by outcome"
    );
    describe_histogram!(
        "quote_sync_snapshot_duration_seconds",
        "Time spent on a snapshot pull"
    );

    describe_counter!(
        "quote_sync_feed_messages_total",
        "Push frames applied to the display"
    );
    describe_counter!(
        "quote_sync_feed_decode_failures_total",
        "Push frames dropped because they did not decode"
    );
    describe_counter!(
        "quote_sync_feed_reconnects_total",
        "Push channel reconnection attempts"
    );

    describe_gauge!(
        "quote_sync_feed_connected",
        "1 while the push channel is open, 0 otherwise"
    );
    describe_gauge!("quote_sync_quotes_displayed", "Quotes currently displayed");
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Outcome label for snapshot pulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// List applied to the display.
    Success,
    /// Pull failed; display left unchanged.
    Failure,
}

impl SnapshotOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Record a finished snapshot pull.
pub fn record_snapshot(outcome: SnapshotOutcome, duration: Duration) {
    counter!(
        "quote_sync_snapshot_requests_total",
        "outcome" => outcome.as_str()
    )
    .increment(1);
    histogram!("quote_sync_snapshot_duration_seconds").record(duration.as_secs_f64());
}

/// Record a push frame applied to the display.
pub fn record_feed_message() {
    counter!("quote_sync_feed_messages_total").increment(1);
}

/// Record a push frame that failed to decode.
pub fn record_decode_failure() {
    counter!("quote_sync_feed_decode_failures_total").increment(1);
}

/// Record a reconnection attempt.
pub fn record_reconnect() {
    counter!("quote_sync_feed_reconnects_total").increment(1);
}

/// Update the push channel connected gauge.
pub fn set_feed_connected(connected: bool) {
    gauge!("quote_sync_feed_connected").set(if connected { 1.0 } else { 0.0 });
}

/// Update the number of quotes on display.
#[allow(clippy::cast_precision_loss)]
pub fn set_quotes_displayed(count: usize) {
    gauge!("quote_sync_quotes_displayed").set(count as f64);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_outcome_as_str() {
        assert_eq!(SnapshotOutcome::Success.as_str(), "success");
        assert_eq!(SnapshotOutcome::Failure.as_str(), "failure");
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        record_snapshot(SnapshotOutcome::Success, Duration::from_millis(5));
        record_feed_message();
        record_decode_failure();
        record_reconnect();
        set_feed_connected(true);
        set_quotes_displayed(3);
    }
}
