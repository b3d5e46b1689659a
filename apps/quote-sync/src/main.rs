//! Quote Sync Binary
//!
//! Prints the live stock list to the terminal.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin quote-sync
//! ```
//!
//! Type a number and press Enter to change how many stocks are shown
//! (clamped to 1..=20).
//!
//! # Environment Variables
//!
//! - `QUOTE_SYNC_HOST`: Quote service base URL (default: <http://localhost:3001>)
//! - `QUOTE_SYNC_WS_URL`: Push channel URL (default: derived from host, `/ws`)
//! - `QUOTE_SYNC_COUNT`: Initial number of stocks (default: 10)
//! - `QUOTE_SYNC_RECONNECT_DELAY_MS`: Wait before reopening the channel (default: 1000)
//! - `QUOTE_SYNC_HTTP_TIMEOUT_SECS`: Snapshot request timeout (default: 10)
//! - `QUOTE_SYNC_STATUS_PORT`: Status HTTP port, 0 disables it (default: 0)
//! - `QUOTE_SYNC_EVENT_CAPACITY`: Feed event channel capacity (default: 64)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: quote-sync)
//! - `RUST_LOG`: Log level (default: info)

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use quote_sync::infrastructure::render::render_table;
use quote_sync::infrastructure::telemetry;
use quote_sync::{
    ClientConfig, DisplaySnapshot, FeedEvent, HttpSnapshotSource, LiveFeedConfig, QuoteBoard,
    RequestedCount, StatusServer, StatusServerState, WebSocketConnector, init_metrics,
};
use tokio::signal;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    load_dotenv();

    // Initialize telemetry (OpenTelemetry + tracing)
    let telemetry_guard = telemetry::init();

    tracing::info!(
        span_export = telemetry_guard.is_exporting(),
        "Starting Quote Sync"
    );

    if let Err(e) = init_metrics() {
        tracing::warn!(error = %e, "Prometheus recorder not installed");
    }

    let config = ClientConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let source = HttpSnapshotSource::new(&config.upstream.host, config.upstream.http_timeout)
        .context("failed to build HTTP client")?;
    let connector = WebSocketConnector::new(config.upstream.feed_url.clone());

    let board = QuoteBoard::start(
        Arc::new(source),
        Arc::new(connector),
        LiveFeedConfig::from(&config.feed),
    );
    board.set_count(config.initial_count);

    // Spawn table renderer
    let display_rx = board.subscribe();
    tokio::spawn(render_display(display_rx, shutdown_token.clone()));

    // Spawn feed event logger
    let events_rx = board.events();
    tokio::spawn(log_feed_events(events_rx));

    // Spawn status server
    if config.status_port != 0 {
        let state = Arc::new(StatusServerState::new(
            env!("CARGO_PKG_VERSION").to_string(),
            board.store().clone(),
        ));
        let server = StatusServer::new(config.status_port, state, shutdown_token.clone());
        tokio::spawn(async move {
            if let Err(e) = server.run().await {
                tracing::error!(error = %e, "Status server error");
            }
        });
    }

    // Count changes typed on stdin. Tokio's stdin blocks runtime shutdown
    // until the next line arrives, so a plain thread owns it instead.
    let (count_tx, mut count_rx) = mpsc::channel::<RequestedCount>(8);
    std::thread::spawn(move || read_counts(&count_tx));

    tokio::spawn(await_shutdown(shutdown_token.clone()));

    loop {
        tokio::select! {
            () = shutdown_token.cancelled() => break,
            Some(count) = count_rx.recv() => board.set_count(count),
        }
    }

    if tokio::time::timeout(SHUTDOWN_TIMEOUT, board.shutdown())
        .await
        .is_err()
    {
        tracing::warn!("Quote board did not stop within the shutdown timeout");
    }

    tracing::info!("Quote Sync stopped");
    Ok(())
}

/// Print the table every time the display changes.
async fn render_display(mut rx: watch::Receiver<DisplaySnapshot>, cancel: CancellationToken) {
    loop {
        let rendered = render_table(&rx.borrow_and_update());
        {
            let mut stdout = std::io::stdout().lock();
            let _ = write!(stdout, "\n{rendered}");
            let _ = stdout.flush();
        }

        tokio::select! {
            () = cancel.cancelled() => return,
            changed = rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}

/// Log feed diagnostics.
async fn log_feed_events(mut rx: broadcast::Receiver<FeedEvent>) {
    loop {
        match rx.recv().await {
            Ok(FeedEvent::Connecting { attempt }) => {
                tracing::debug!(attempt, "Opening push channel");
            }
            Ok(FeedEvent::Connected) => tracing::info!("WebSocket connection opened"),
            Ok(FeedEvent::Updated { symbols }) => {
                tracing::debug!(symbols, "Push update applied");
            }
            Ok(FeedEvent::DecodeFailed { error }) => {
                tracing::warn!(error = %error, "Push frame dropped");
            }
            Ok(FeedEvent::Disconnected { reason }) => {
                tracing::warn!(reason = %reason, "WebSocket connection closed");
            }
            Ok(FeedEvent::Reconnecting { attempt, delay }) => {
                tracing::info!(attempt, delay_ms = delay.as_millis(), "Reconnecting");
            }
            Ok(FeedEvent::Stopped) | Err(broadcast::error::RecvError::Closed) => return,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Feed event logger lagged");
            }
        }
    }
}

/// Forward counts typed on stdin until input ends or the receiver is gone.
fn read_counts(tx: &mpsc::Sender<RequestedCount>) {
    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else { return };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match RequestedCount::parse_clamped(line) {
            Some(count) => {
                if tx.blocking_send(count).is_err() {
                    return;
                }
            }
            None => tracing::warn!(input = %line, "Ignoring non-numeric count"),
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &ClientConfig) {
    tracing::info!(
        host = %config.upstream.host,
        count = config.initial_count.get(),
        reconnect_delay_ms = config.feed.reconnect_delay.as_millis(),
        status_port = config.status_port,
        "Configuration loaded"
    );
    tracing::debug!(
        snapshot_url = %config.upstream.snapshot_url(),
        feed_url = %config.upstream.feed_url,
        "Upstream endpoints"
    );
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        for dir in cwd.ancestors().skip(1) {
            let env_path = dir.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// A handler that cannot be installed is logged and never fires.
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
