//! Metrics tests
//!
//! Tests for gauge family definitions and rendering.

use bshc_exporter::metrics::{MetricKind, MetricsCollector, SeriesLabels, SERIES_LABELS};

/// Helper to create a test metrics instance
fn create_test_metrics() -> MetricsCollector {
    MetricsCollector::new().expect("Failed to create metrics")
}

fn kitchen_labels() -> SeriesLabels<'static> {
    SeriesLabels {
        device_id: "hdm:HomeMaticIP:3014F711A0000000",
        device_name: "Kitchen Sensor",
        room_name: "Kitchen",
    }
}

#[test]
fn test_metrics_collector_creation() {
    // Given: A new metrics collector
    let metrics = create_test_metrics();

    // When: Rendering without any recorded value
    let rendered = metrics.render().expect("Failed to render");

    // Then: No series exist yet
    assert!(!rendered.contains("device_id="));
}

#[test]
fn test_metrics_collectors_are_independent() {
    // Given: Two collectors, each with its own registry
    let first = create_test_metrics();
    let second = create_test_metrics();

    // When: Recording into the first only
    first.record(MetricKind::Humidity, &kitchen_labels(), 55.0);

    // Then: The second stays empty
    assert!(first.render().unwrap().contains("humidity_level{"));
    assert!(!second.render().unwrap().contains("humidity_level{"));
}

#[test]
fn test_family_names_have_no_namespace() {
    let metrics = create_test_metrics();
    for kind in MetricKind::ALL {
        metrics.record(kind, &kitchen_labels(), 1.0);
    }

    let rendered = metrics.render().unwrap();

    for name in [
        "temperature_level",
        "setpoint_temperature_level",
        "humidity_level",
        "valve_tappet",
    ] {
        assert!(
            rendered.contains(&format!("# TYPE {} gauge", name)),
            "missing family {}",
            name
        );
    }
    assert!(!rendered.contains("bshc_"));
}

#[test]
fn test_series_labels_are_rendered_in_order() {
    // Given: A temperature reading for the kitchen sensor
    let metrics = create_test_metrics();

    // When: Recording and rendering
    metrics.record(MetricKind::Temperature, &kitchen_labels(), 21.5);
    let rendered = metrics.render().unwrap();

    // Then: The sample line carries exactly the three labels
    assert!(rendered.contains(
        "temperature_level{device_id=\"hdm:HomeMaticIP:3014F711A0000000\",device_name=\"Kitchen Sensor\",room_name=\"Kitchen\"} 21.5"
    ));
}

#[test]
fn test_record_overwrites_previous_value() {
    let metrics = create_test_metrics();

    metrics.record(MetricKind::ValveTappet, &kitchen_labels(), 10.0);
    metrics.record(MetricKind::ValveTappet, &kitchen_labels(), 42.0);
    let rendered = metrics.render().unwrap();

    assert!(rendered.contains("room_name=\"Kitchen\"} 42"));
    assert_eq!(rendered.matches("valve_tappet{").count(), 1);
}

#[test]
fn test_gauge_returns_family_for_kind() {
    let metrics = create_test_metrics();

    metrics.set_gauge(
        metrics.gauge(MetricKind::SetpointTemperature),
        &["d1", "Thermostat", "Bedroom"],
        19.0,
    );
    let rendered = metrics.render().unwrap();

    assert!(rendered.contains(
        "setpoint_temperature_level{device_id=\"d1\",device_name=\"Thermostat\",room_name=\"Bedroom\"} 19"
    ));
}

#[test]
fn test_help_text_is_rendered() {
    let metrics = create_test_metrics();
    metrics.record(MetricKind::Temperature, &kitchen_labels(), 20.0);

    let rendered = metrics.render().unwrap();

    assert!(rendered.contains("# HELP temperature_level Temperature level of the devices"));
}

#[test]
fn test_kind_mapping_tables() {
    assert_eq!(MetricKind::Temperature.service_id(), "TemperatureLevel");
    assert_eq!(
        MetricKind::SetpointTemperature.service_id(),
        "RoomClimateControl"
    );
    assert_eq!(MetricKind::Humidity.service_id(), "HumidityLevel");
    assert_eq!(MetricKind::ValveTappet.service_id(), "ValveTappet");
    assert_eq!(MetricKind::ValveTappet.to_string(), "valve_tappet");
    assert_eq!(SERIES_LABELS, ["device_id", "device_name", "room_name"]);
}
