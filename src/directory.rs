//! Device and Room Directory
//!
//! Maps hub identifiers to the display names used as metric labels. The
//! directory is resolved once at startup and is read-only afterwards; scrape
//! handlers take an `Arc` snapshot from the [`DirectoryHandle`] and read it
//! without further locking.
//!
//! Devices added or renamed on the controller after startup are not picked
//! up until [`DirectoryHandle::refresh`] is called. Nothing in the exporter
//! calls it on its own; a restart re-resolves everything.

use crate::bshc::types::{is_excluded_model, Device, Room};
use crate::bshc::HubClient;
use crate::error::{ExporterError, Result};
use crate::metrics::SeriesLabels;
use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub name: String,
    pub room_id: String,
}

/// Immutable snapshot of device and room names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    devices: HashMap<String, DeviceEntry>,
    rooms: HashMap<String, String>,
}

impl Directory {
    /// Fetch devices and rooms from the controller.
    ///
    /// The two fetches are independent: if one fails it is logged and that
    /// half of the directory stays empty, so every reading that needs it is
    /// skipped until the directory is refreshed.
    pub async fn resolve(client: &HubClient) -> Self {
        info!("Fetching device names");
        let devices = client.query_devices().await.unwrap_or_else(|e| {
            error!("Failed to get devices: {}", e);
            Vec::new()
        });

        info!("Fetching room names");
        let rooms = client.query_rooms().await.unwrap_or_else(|e| {
            error!("Failed to get rooms: {}", e);
            Vec::new()
        });

        let directory = Self::from_records(&devices, &rooms);
        info!(
            "Directory resolved: {} devices, {} rooms",
            directory.device_count(),
            directory.room_count()
        );
        directory
    }

    /// Build the directory from raw `/devices` and `/rooms` records.
    ///
    /// Devices of an excluded model are skipped silently. Devices without a
    /// string `id`, `name` or `roomId`, and rooms without a string `id` or
    /// `name`, are logged and skipped.
    pub fn from_records(devices: &[serde_json::Value], rooms: &[serde_json::Value]) -> Self {
        let mut directory = Self::default();

        for record in devices {
            let model = record
                .get("deviceModel")
                .and_then(serde_json::Value::as_str);
            if model.is_some_and(is_excluded_model) {
                debug!("Skipping device of model {:?}", model);
                continue;
            }

            match decode_record::<Device>(record) {
                Ok(device) => {
                    debug!(
                        "Device added: ID={}, Name={}, RoomID={}",
                        device.id, device.name, device.room_id
                    );
                    directory.insert_device(device);
                }
                Err(e) => warn!("Invalid device record {}: {}", record, e),
            }
        }

        for record in rooms {
            match decode_record::<Room>(record) {
                Ok(room) => {
                    debug!("Room added: ID={}, Name={}", room.id, room.name);
                    directory.insert_room(room);
                }
                Err(e) => warn!("Invalid room record {}: {}", record, e),
            }
        }

        directory
    }

    pub fn insert_device(&mut self, device: Device) {
        self.devices.insert(
            device.id,
            DeviceEntry {
                name: device.name,
                room_id: device.room_id,
            },
        );
    }

    pub fn insert_room(&mut self, room: Room) {
        self.rooms.insert(room.id, room.name);
    }

    pub fn device(&self, id: &str) -> Option<&DeviceEntry> {
        self.devices.get(id)
    }

    pub fn room_name(&self, id: &str) -> Option<&str> {
        self.rooms.get(id).map(String::as_str)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Resolve the label tuple for a device, failing if either the device or
    /// its room is unknown.
    pub fn labels_for<'a>(&'a self, device_id: &'a str) -> Result<SeriesLabels<'a>> {
        let device = self
            .device(device_id)
            .ok_or_else(|| ExporterError::Field(format!("unknown device {}", device_id)))?;
        let room_name = self.room_name(&device.room_id).ok_or_else(|| {
            ExporterError::Field(format!(
                "unknown room {} for device {}",
                device.room_id, device_id
            ))
        })?;

        Ok(SeriesLabels {
            device_id,
            device_name: &device.name,
            room_name,
        })
    }
}

fn decode_record<T: DeserializeOwned>(record: &serde_json::Value) -> Result<T> {
    T::deserialize(record).map_err(|e| ExporterError::Field(e.to_string()))
}

/// Shared, swappable reference to the current [`Directory`].
#[derive(Debug, Clone)]
pub struct DirectoryHandle {
    inner: Arc<ArcSwap<Directory>>,
}

impl DirectoryHandle {
    pub fn new(directory: Directory) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(directory)),
        }
    }

    /// Snapshot used for the duration of one scrape.
    pub fn current(&self) -> Arc<Directory> {
        self.inner.load_full()
    }

    pub fn replace(&self, directory: Directory) {
        self.inner.store(Arc::new(directory));
    }

    /// Re-resolve from the controller and swap the snapshot in.
    pub async fn refresh(&self, client: &HubClient) {
        let directory = Directory::resolve(client).await;
        self.replace(directory);
    }
}

impl Default for DirectoryHandle {
    fn default() -> Self {
        Self::new(Directory::default())
    }
}
