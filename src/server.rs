//! HTTP Server and Metrics Collection
//!
//! This module implements the Prometheus exporter HTTP server.
//!
//! # Architecture
//!
//! - **HTTP Server**: Axum-based server exposing `/metrics`, `/health`, and `/` endpoints
//! - **Scrape-driven collection**: every `/metrics` request fetches the current
//!   service states from the controller before the registry is rendered
//! - **State Management**: Shared state (config, metrics, client, directory) using Arc for thread-safety
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page with links to metrics and health
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /health` - Health check (200 if the last services fetch succeeded, 503 otherwise)
//!
//! # Error Handling
//!
//! A failed fetch never changes the `/metrics` response status. The scrape
//! returns whatever the registry holds, which may be the values of an
//! earlier scrape.

use crate::bshc::HubClient;
use crate::collectors::{self, CollectionContext, CollectionStatus};
use crate::config::{Config, ServicesConfig};
use crate::directory::{Directory, DirectoryHandle};
use crate::error::ExporterError;
use crate::metrics::MetricsCollector;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    services: Arc<ServicesConfig>,
    metrics: MetricsCollector,
    client: Arc<HubClient>,
    directory: DirectoryHandle,
    hub_reachable: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(
        services: ServicesConfig,
        metrics: MetricsCollector,
        client: HubClient,
        directory: Directory,
    ) -> Self {
        Self {
            services: Arc::new(services),
            metrics,
            client: Arc::new(client),
            directory: DirectoryHandle::new(directory),
            hub_reachable: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn directory(&self) -> &DirectoryHandle {
        &self.directory
    }

    /// Fetch the service snapshot and project it onto the gauges.
    pub async fn scrape(&self) -> CollectionStatus {
        let directory = self.directory.current();
        let ctx = CollectionContext {
            client: &self.client,
            metrics: &self.metrics,
            directory: &directory,
            config: &self.services,
        };

        let status = match collectors::collect_service_metrics(&ctx).await {
            Ok(status) => status,
            Err(e) => {
                error!("Failed to collect metrics: {}", e);
                CollectionStatus::Failed
            }
        };

        self.hub_reachable
            .store(status == CollectionStatus::Success, Ordering::Relaxed);
        status
    }
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    let metrics = MetricsCollector::new()?;
    let client = HubClient::new(&config.bshc)?;

    // Names are resolved once, before the listener accepts scrapes
    let directory = Directory::resolve(&client).await;

    let state = AppState::new(config.services.clone(), metrics, client, directory);
    let app = router(state);

    // Start the server
    let addr = format!("{}:{}", config.http.bind, config.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ExporterError::Server(format!("failed to bind {}: {}", addr, e)))?;

    info!("Metrics server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ExporterError::Io)?;

    info!("Metrics server stopped");
    Ok(())
}

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Resolves on CTRL+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for CTRL+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to register SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received CTRL+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

async fn root_handler() -> impl IntoResponse {
    axum::response::Html(
        r#"<html>
<head><title>BSHC Exporter</title></head>
<body>
<h1>BSHC Prometheus Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    state.scrape().await;

    match state.metrics.render() {
        Ok(metrics) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            metrics,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.hub_reachable.load(Ordering::Relaxed) {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Smart Home Controller unreachable")
    }
}
