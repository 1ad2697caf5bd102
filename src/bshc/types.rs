//! Smart Home Controller API Type Definitions
//!
//! Rust types for the three `/smarthome` resources the exporter reads.
//!
//! # Design Notes
//!
//! - **Devices and rooms** are decoded one record at a time so a single
//!   malformed entry only drops that entry. Only the fields the directory
//!   needs are declared; everything else the hub sends is ignored.
//! - **Service records** are an internally tagged union keyed on the `id`
//!   field. Each recognised kind declares exactly the numeric state field it
//!   needs, so a missing or mistyped value is rejected while decoding rather
//!   than discovered later. Unrecognised kinds decode as
//!   [`ServiceRecord::Other`].
//!
//! # API Endpoints Covered
//!
//! - `GET /smarthome/devices` → [`Device`]
//! - `GET /smarthome/rooms` → [`Room`]
//! - `GET /smarthome/services` → [`ServiceRecord`]

use crate::metrics::MetricKind;
use serde::Deserialize;

/// Device models that never carry climate readings, matched against the
/// raw `deviceModel` field before a record is decoded.
pub const EXCLUDED_DEVICE_MODELS: [&str; 2] = ["VENTILATION_SERVICE", "HUE_BRIDGE_MANAGER"];

/// Device information from `/smarthome/devices`
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    pub room_id: String,
}

pub fn is_excluded_model(model: &str) -> bool {
    EXCLUDED_DEVICE_MODELS.contains(&model)
}

/// Room information from `/smarthome/rooms`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Room {
    pub id: String,
    pub name: String,
}

/// One entry of `/smarthome/services`
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "id")]
pub enum ServiceRecord {
    TemperatureLevel {
        #[serde(rename = "deviceId")]
        device_id: String,
        state: TemperatureLevelState,
    },
    RoomClimateControl {
        #[serde(rename = "deviceId")]
        device_id: String,
        state: RoomClimateControlState,
    },
    HumidityLevel {
        #[serde(rename = "deviceId")]
        device_id: String,
        state: HumidityLevelState,
    },
    ValveTappet {
        #[serde(rename = "deviceId")]
        device_id: String,
        state: ValveTappetState,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TemperatureLevelState {
    pub temperature: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomClimateControlState {
    pub setpoint_temperature: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct HumidityLevelState {
    pub humidity: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ValveTappetState {
    pub position: f64,
}

/// A numeric observation extracted from a [`ServiceRecord`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading<'a> {
    pub kind: MetricKind,
    pub device_id: &'a str,
    pub value: f64,
}

impl ServiceRecord {
    pub fn kind(&self) -> Option<MetricKind> {
        self.reading().map(|reading| reading.kind)
    }

    pub fn reading(&self) -> Option<Reading<'_>> {
        let (kind, device_id, value) = match self {
            ServiceRecord::TemperatureLevel { device_id, state } => {
                (MetricKind::Temperature, device_id, state.temperature)
            }
            ServiceRecord::RoomClimateControl { device_id, state } => (
                MetricKind::SetpointTemperature,
                device_id,
                state.setpoint_temperature,
            ),
            ServiceRecord::HumidityLevel { device_id, state } => {
                (MetricKind::Humidity, device_id, state.humidity)
            }
            ServiceRecord::ValveTappet { device_id, state } => {
                (MetricKind::ValveTappet, device_id, state.position)
            }
            ServiceRecord::Other => return None,
        };

        Some(Reading {
            kind,
            device_id: device_id.as_str(),
            value,
        })
    }
}

/// Decoded result of one `/smarthome/services` fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceSnapshot {
    pub records: Vec<ServiceRecord>,
    /// Entries dropped because they did not decode: a known kind with a
    /// missing or non-numeric value, or an entry without a string `id`.
    pub rejected: usize,
}
