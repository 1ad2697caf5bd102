//! Prometheus Metrics Definitions
//!
//! This module defines the gauge families exposed by the BSHC exporter.
//!
//! # Metric Families
//!
//! | Family | Hub service | State field |
//! |--------|-------------|-------------|
//! | `temperature_level` | `TemperatureLevel` | `temperature` |
//! | `setpoint_temperature_level` | `RoomClimateControl` | `setpointTemperature` |
//! | `humidity_level` | `HumidityLevel` | `humidity` |
//! | `valve_tappet` | `ValveTappet` | `position` |
//!
//! Every family is a `GaugeVec` labeled by `device_id`, `device_name` and
//! `room_name`. Series are created on first write and never removed, so a
//! device that stops reporting keeps exposing its last observed value.
//!
//! Families carry no namespace prefix so that existing dashboards built on
//! these names keep working.

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::fmt;
use std::sync::Arc;

/// Label names shared by all families, in `with_label_values` order.
pub const SERIES_LABELS: [&str; 3] = ["device_id", "device_name", "room_name"];

/// The monitored quantities, one per gauge family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Temperature,
    SetpointTemperature,
    Humidity,
    ValveTappet,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Temperature,
        MetricKind::SetpointTemperature,
        MetricKind::Humidity,
        MetricKind::ValveTappet,
    ];

    /// Service id the hub reports for this quantity.
    pub fn service_id(self) -> &'static str {
        match self {
            MetricKind::Temperature => "TemperatureLevel",
            MetricKind::SetpointTemperature => "RoomClimateControl",
            MetricKind::Humidity => "HumidityLevel",
            MetricKind::ValveTappet => "ValveTappet",
        }
    }

    pub fn metric_name(self) -> &'static str {
        match self {
            MetricKind::Temperature => "temperature_level",
            MetricKind::SetpointTemperature => "setpoint_temperature_level",
            MetricKind::Humidity => "humidity_level",
            MetricKind::ValveTappet => "valve_tappet",
        }
    }

    fn help(self) -> &'static str {
        match self {
            MetricKind::Temperature => "Temperature level of the devices",
            MetricKind::SetpointTemperature => "Desired temperature level of the devices",
            MetricKind::Humidity => "Humidity level of the devices",
            MetricKind::ValveTappet => "Valve tappet of the devices",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metric_name())
    }
}

/// Label tuple identifying one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesLabels<'a> {
    pub device_id: &'a str,
    pub device_name: &'a str,
    pub room_name: &'a str,
}

impl<'a> SeriesLabels<'a> {
    pub fn values(&self) -> [&'a str; 3] {
        [self.device_id, self.device_name, self.room_name]
    }
}

/// Metrics collector for the Smart Home Controller
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,

    pub temperature_level: Arc<GaugeVec>,
    pub setpoint_temperature_level: Arc<GaugeVec>,
    pub humidity_level: Arc<GaugeVec>,
    pub valve_tappet: Arc<GaugeVec>,
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let temperature_level = new_family(MetricKind::Temperature)?;
        let setpoint_temperature_level = new_family(MetricKind::SetpointTemperature)?;
        let humidity_level = new_family(MetricKind::Humidity)?;
        let valve_tappet = new_family(MetricKind::ValveTappet)?;

        // Register all metrics
        registry.register(Box::new(temperature_level.clone()))?;
        registry.register(Box::new(setpoint_temperature_level.clone()))?;
        registry.register(Box::new(humidity_level.clone()))?;
        registry.register(Box::new(valve_tappet.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            temperature_level: Arc::new(temperature_level),
            setpoint_temperature_level: Arc::new(setpoint_temperature_level),
            humidity_level: Arc::new(humidity_level),
            valve_tappet: Arc::new(valve_tappet),
        })
    }

    pub fn gauge(&self, kind: MetricKind) -> &GaugeVec {
        match kind {
            MetricKind::Temperature => &self.temperature_level,
            MetricKind::SetpointTemperature => &self.setpoint_temperature_level,
            MetricKind::Humidity => &self.humidity_level,
            MetricKind::ValveTappet => &self.valve_tappet,
        }
    }

    /// Set a gauge value for the given label values
    pub fn set_gauge(&self, gauge: &GaugeVec, labels: &[&str], value: f64) {
        gauge.with_label_values(labels).set(value);
    }

    /// Overwrite the series of `kind` identified by `labels`.
    pub fn record(&self, kind: MetricKind, labels: &SeriesLabels<'_>, value: f64) {
        self.set_gauge(self.gauge(kind), &labels.values(), value);
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn new_family(kind: MetricKind) -> prometheus::Result<GaugeVec> {
    GaugeVec::new(Opts::new(kind.metric_name(), kind.help()), &SERIES_LABELS)
}
