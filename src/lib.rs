//! Bosch Smart Home Controller Prometheus Exporter
//!
//! A Prometheus metrics exporter for the climate readings of a Bosch Smart
//! Home Controller (BSHC).
//!
//! # Overview
//!
//! The exporter talks to the controller's local REST API over HTTPS,
//! authenticating with a client certificate registered on the controller.
//! Device and room names are resolved once at startup; on every scrape the
//! current service states are fetched and projected onto four gauge
//! families labeled with the device id, device name and room name.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   HTTPS + client cert  ┌──────────────┐
//! │    BSHC     │ ◄───────────────────►  │   Exporter   │
//! │ /smarthome  │   devices/rooms/       │              │
//! └─────────────┘   services             │  ┌────────┐  │      HTTP      ┌────────────┐
//!                                        │  │ Client │  │ ◄────────────► │ Prometheus │
//!                                        │  └────────┘  │   /metrics     └────────────┘
//!                                        │  ┌────────┐  │
//!                                        │  │Metrics │  │
//!                                        │  └────────┘  │
//!                                        └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`bshc`] - REST client and API type definitions
//! - [`directory`] - Device/room name snapshot
//! - [`collectors`] - Projection of service states onto gauges
//! - [`metrics`] - Prometheus metric definitions
//! - [`server`] - HTTP server
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use bshc_exporter::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     config.validate()?;
//!     server::start(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - ✅ Room temperature, setpoint temperature and humidity
//! - ✅ Radiator valve position
//! - ✅ Per-kind enable switches
//! - ✅ Mutual TLS with optional server certificate verification

pub mod bshc;
pub mod collectors;
pub mod config;
pub mod directory;
pub mod error;
pub mod metrics;
pub mod server;
