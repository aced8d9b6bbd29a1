// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use anyhow::Context;
use axum::{routing::{get, post}, Router};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

use crate::application::label_formatter::format_labels_in;
use crate::application::refresh_controller::RefreshController;
use crate::application::scheduler::{self, SchedulerDeps};
use crate::application::service_gateway::ServiceGateway;
use crate::application::status_aggregator::StatusMonitor;
use crate::infrastructure::config::{load_app_config, LabelTimezone};
use crate::infrastructure::dashboard_registry::DashboardRegistry;
use crate::infrastructure::http_backend::HttpMetricsBackend;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    control_service, get_dashboard, health_check, list_notifications, list_services,
    select_range, stream_dashboard,
};

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

fn utc_labels(raw: &[String]) -> Vec<String> {
    format_labels_in(raw, &chrono::Utc)
}

// Single logical thread: timers and handlers interleave only at await points.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    // Load configuration
    let config = load_app_config()?;
    tracing::info!(backend = %config.backend.base_url, "loaded configuration");

    // Backend adapter and view registry (infrastructure layer)
    let backend = Arc::new(HttpMetricsBackend::new(config.backend.base_url.clone()));
    let registry = Arc::new(DashboardRegistry::new(
        config.display.event_capacity,
        config.display.notification_capacity,
    ));

    // Use cases (application layer)
    let mut controller = RefreshController::new(
        backend.clone(),
        registry.clone(),
        registry.clone(),
        config.refresh.default_range.clone(),
    );
    if config.display.label_timezone == LabelTimezone::Utc {
        controller = controller.with_label_formatter(utc_labels);
    }
    let controller = Arc::new(controller);
    let status = Arc::new(StatusMonitor::new(backend.clone(), registry.clone()));
    let gateway = ServiceGateway::new(backend, registry.clone(), registry.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let timers = scheduler::spawn(
        SchedulerDeps {
            controller: controller.clone(),
            status,
            services: gateway.clone(),
        },
        config.cadence(),
        shutdown_rx.clone(),
    );

    let state = Arc::new(AppState {
        controller,
        gateway,
        registry,
        shutdown: shutdown_rx,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/stream", get(stream_dashboard))
        .route("/cards/:target/range", post(select_range))
        .route("/services", get(list_services))
        .route("/services/:name/:action", post(control_service))
        .route("/notifications", get(list_notifications))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen_addr))?;
    tracing::info!("Starting host-dashboard on {}", config.server.listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received shutdown signal");
            // Ends open dashboard streams and the refresh timers.
            let _ = shutdown_tx.send(true);
        })
        .await?;

    for timer in timers {
        let _ = timer.await;
    }

    Ok(())
}
