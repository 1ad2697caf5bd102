//! Service Reading Projection
//!
//! Maps decoded service records onto the gauge families.
//!
//! # Metrics Produced
//! - `temperature_level` from `TemperatureLevel.state.temperature`
//! - `setpoint_temperature_level` from `RoomClimateControl.state.setpointTemperature`
//! - `humidity_level` from `HumidityLevel.state.humidity`
//! - `valve_tappet` from `ValveTappet.state.position`
//!
//! All labeled by `device_id`, `device_name`, `room_name`.
//!
//! A record is written only when both its device and that device's room are
//! in the directory. Anything else is skipped without touching the registry
//! and the rest of the batch is still processed.

use crate::bshc::types::ServiceRecord;
use crate::config::ServicesConfig;
use crate::directory::Directory;
use crate::metrics::{MetricKind, MetricsCollector};
use tracing::{debug, warn};

/// Outcome counters of one projection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionSummary {
    /// Series written.
    pub updated: usize,
    /// Records of an enabled kind dropped because their names did not resolve.
    pub skipped: usize,
}

/// Project every enabled kind of `services` onto `metrics`.
pub fn project_metrics(
    services: &[ServiceRecord],
    directory: &Directory,
    config: &ServicesConfig,
    metrics: &MetricsCollector,
) -> ProjectionSummary {
    let mut summary = ProjectionSummary::default();

    for kind in config.enabled_kinds() {
        debug!("Processing {} services", kind.service_id());
        let kind_summary = project_kind(kind, services, directory, metrics);
        summary.updated += kind_summary.updated;
        summary.skipped += kind_summary.skipped;
    }

    summary
}

fn project_kind(
    kind: MetricKind,
    services: &[ServiceRecord],
    directory: &Directory,
    metrics: &MetricsCollector,
) -> ProjectionSummary {
    let mut summary = ProjectionSummary::default();

    let readings = services
        .iter()
        .filter_map(ServiceRecord::reading)
        .filter(|reading| reading.kind == kind);

    for reading in readings {
        match directory.labels_for(reading.device_id) {
            Ok(labels) => {
                debug!(
                    "Updating {} for device {} in room {}",
                    kind, labels.device_name, labels.room_name
                );
                metrics.record(kind, &labels, reading.value);
                summary.updated += 1;
            }
            Err(e) => {
                warn!("Skipping {} reading: {}", kind, e);
                summary.skipped += 1;
            }
        }
    }

    summary
}
