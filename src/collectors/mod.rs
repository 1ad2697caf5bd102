//! Metrics Collectors
//!
//! Turns controller state into gauge values. Collection is driven by the
//! scrape: every `/metrics` request fetches one service snapshot and projects
//! it onto the gauge families.
//!
//! # Architecture
//!
//! - Accept a `CollectionContext` containing shared state
//! - Query the controller
//! - Project the answer onto the Prometheus gauges (see [`projection`])
//! - Return `CollectionResult` (`Success` or `Failed`)
//!
//! # Error Handling
//!
//! Fetch failures are non-fatal: they are logged as warnings and reported as
//! `CollectionStatus::Failed`. Gauges that were not touched keep the value
//! of the last successful scrape.

use crate::bshc::HubClient;
use crate::config::ServicesConfig;
use crate::directory::Directory;
use crate::metrics::MetricsCollector;
use tracing::{debug, info, warn};

pub mod projection;

pub use projection::{project_metrics, ProjectionSummary};

/// Shared context passed to all collectors
///
/// All fields are immutable references borrowed for one scrape.
#[derive(Clone, Copy)]
pub struct CollectionContext<'a> {
    /// Controller API client
    pub client: &'a HubClient,
    /// Metrics collector for updating Prometheus metrics
    pub metrics: &'a MetricsCollector,
    /// Name snapshot used to label series
    pub directory: &'a Directory,
    /// Which gauge families are enabled
    pub config: &'a ServicesConfig,
}

/// Status of a metrics collection operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Metrics were successfully collected and updated
    Success,
    /// Collection failed but is non-fatal (already logged as warning)
    Failed,
}

/// Result type for collector functions
///
/// - `Ok(CollectionStatus::Success)` = Collection succeeded
/// - `Ok(CollectionStatus::Failed)` = Collection failed but non-fatal (logged as warning)
/// - `Err(_)` = Fatal error (should propagate)
pub type CollectionResult = Result<CollectionStatus, anyhow::Error>;

/// Helper to reduce boilerplate in collectors
///
/// Wraps API queries with consistent error handling:
/// - On success: processes data, logs success, returns `CollectionStatus::Success`
/// - On error: logs warning, returns `CollectionStatus::Failed` (non-fatal)
///
/// # Arguments
///
/// * `name` - Name of the resource being collected (for logging)
/// * `query_future` - Async API call that returns data
/// * `process` - Function to process the data and update metrics
pub async fn collect_with_handler<T, F, P, E>(
    name: &str,
    query_future: F,
    process: P,
) -> CollectionResult
where
    F: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: FnOnce(T),
{
    match query_future.await {
        Ok(data) => {
            process(data);
            debug!("Updated {} metrics", name);
            Ok(CollectionStatus::Success)
        }
        Err(e) => {
            warn!("Failed to query {}: {}", name, e);
            Ok(CollectionStatus::Failed)
        }
    }
}

/// Fetches the service snapshot and projects it onto the gauges
///
/// # Returns
///
/// * `Ok(CollectionStatus::Success)` - Snapshot fetched and projected
/// * `Ok(CollectionStatus::Failed)` - Fetch or decode failed; no gauge was touched
pub async fn collect_service_metrics(ctx: &CollectionContext<'_>) -> CollectionResult {
    collect_with_handler("services", ctx.client.query_services(), |snapshot| {
        let summary = project_metrics(&snapshot.records, ctx.directory, ctx.config, ctx.metrics);
        info!(
            "Projected {} service readings ({} skipped, {} undecodable)",
            summary.updated, summary.skipped, snapshot.rejected
        );
    })
    .await
}
