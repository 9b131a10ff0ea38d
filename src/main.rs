//! ticket-monitor entry point.
//!
//! Opens a dashboard view against the configured ticketing service, tails
//! the activity log, and logs snapshot metrics and notifications until
//! interrupted.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use ticket_sync::app_state::AppState;
use ticket_sync::config::{LogFormat, SyncConfig};
use ticket_sync::domain::{DashboardMetrics, Severity};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = SyncConfig::from_env()
        .map_err(|err| anyhow::anyhow!("{err}"))
        .context("invalid configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(
        api = %config.api_base_url,
        log_stream = %config.log_stream_url,
        view = %config.view_kind,
        "starting ticket-monitor"
    );

    let state = AppState::from_config(config).context("failed to build client state")?;

    // Activity log
    state.log_stream.subscribe(|record| {
        tracing::info!(target: "ticket_monitor::activity", at = %record.received_at, "{}", record.message);
    });

    // Notifications
    let mut notifications = state.notifier.subscribe();
    tokio::spawn(async move {
        while let Ok(notification) = notifications.recv().await {
            match notification.severity {
                Severity::Success => tracing::info!(message = %notification.message, "notification"),
                Severity::Error => {
                    tracing::warn!(message = %notification.message, kind = ?notification.kind, "notification");
                }
            }
        }
    });

    // Snapshot metrics
    let mut snapshots = state.store.subscribe();
    tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = std::sync::Arc::clone(&snapshots.borrow_and_update());
            let metrics = DashboardMetrics::from_snapshot(&snapshot);
            tracing::info!(
                version = snapshot.version(),
                events = metrics.total_events,
                tickets = metrics.total_tickets,
                sold = metrics.tickets_sold,
                revenue = metrics.revenue,
                yet_to_start = metrics.yet_to_start,
                in_progress = metrics.in_progress,
                completed = metrics.completed,
                "snapshot updated"
            );
        }
    });

    let mut session = state.open_view(state.config.view_kind);
    if let Err(err) = session.tail_logs(state.log_stream.clone()).await {
        tracing::warn!(error = %err, "activity log unavailable, continuing with polling only");
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutting down");
    session.close().await;

    Ok(())
}
