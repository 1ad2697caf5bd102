//! Smart Home Controller REST Client
//!
//! This module provides a client for the controller's local REST API.
//!
//! # Architecture
//!
//! - **Connection**: HTTPS to `https://{host}:{port}/smarthome/...`
//! - **Authentication**: TLS client certificate registered with the controller
//! - **Protocol**: plain JSON `GET` requests, one per resource
//!
//! The controller ships a self-signed server certificate, so server
//! verification can be switched off with `skip_tls_verify`. The client never
//! retries; a failed request is reported to the caller, which keeps the
//! previous gauge values for that scrape.
//!
//! # Example
//!
//! ```no_run
//! use bshc_exporter::bshc::HubClient;
//! use bshc_exporter::config::BshcConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = BshcConfig {
//!     host: "192.168.1.10".to_string(),
//!     port: 8444,
//!     client_cert: "certs/client-cert.pem".into(),
//!     client_key: "certs/client-key.pem".into(),
//!     skip_tls_verify: true,
//!     request_timeout_seconds: 10,
//! };
//!
//! let client = HubClient::new(&config)?;
//! let snapshot = client.query_services().await?;
//! # Ok(())
//! # }
//! ```

use crate::bshc::types::{ServiceRecord, ServiceSnapshot};
use crate::config::BshcConfig;
use crate::error::{ExporterError, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEVICES_PATH: &str = "/smarthome/devices";
pub const ROOMS_PATH: &str = "/smarthome/rooms";
pub const SERVICES_PATH: &str = "/smarthome/services";

/// Client for the Smart Home Controller REST API
///
/// Cheap to share behind an `Arc`; the underlying `reqwest::Client` pools
/// connections and is safe to use from concurrent scrapes.
#[derive(Debug, Clone)]
pub struct HubClient {
    base_url: String,
    http: reqwest::Client,
}

impl HubClient {
    /// Build a client authenticating with the configured certificate/key pair.
    ///
    /// The key may be PEM encoded PKCS#8 (`BEGIN PRIVATE KEY`), PKCS#1 RSA
    /// (`BEGIN RSA PRIVATE KEY`) or SEC1 EC (`BEGIN EC PRIVATE KEY`).
    pub fn new(config: &BshcConfig) -> Result<Self> {
        let identity = load_identity(&config.client_cert, &config.client_key)?;

        if config.skip_tls_verify {
            warn!("Server certificate verification is disabled");
        }

        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .identity(identity)
            .danger_accept_invalid_certs(config.skip_tls_verify)
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        info!("Client certificate loaded from {}", config.client_cert.display());

        Ok(Self::from_parts(config.base_url(), http))
    }

    /// Wrap an already configured HTTP client.
    pub fn from_parts(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Raw device records; the directory validates each one.
    pub async fn query_devices(&self) -> Result<Vec<serde_json::Value>> {
        self.get_json(DEVICES_PATH).await
    }

    /// Raw room records; the directory validates each one.
    pub async fn query_rooms(&self) -> Result<Vec<serde_json::Value>> {
        self.get_json(ROOMS_PATH).await
    }

    /// Fetch and decode the current service states.
    ///
    /// A body that is not a JSON array fails the whole call. Individual
    /// entries of a known kind that do not decode are dropped and counted.
    pub async fn query_services(&self) -> Result<ServiceSnapshot> {
        let raw: Vec<serde_json::Value> = self.get_json(SERVICES_PATH).await?;
        Ok(decode_services(raw))
    }

    /// GET `path` and decode the body as JSON.
    ///
    /// Fails with:
    /// - [`ExporterError::Transport`] when the request cannot be completed
    ///   (connection refused, TLS handshake, timeout)
    /// - [`ExporterError::Status`] on any status other than 200
    /// - [`ExporterError::Json`] when the body does not decode into `T`
    async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        debug!("GET {} completed with status {}", url, status.as_u16());

        if status != StatusCode::OK {
            return Err(ExporterError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(ExporterError::Json)
    }
}

fn load_identity(cert_path: &Path, key_path: &Path) -> Result<reqwest::Identity> {
    let cert = std::fs::read_to_string(cert_path).map_err(|e| {
        ExporterError::Identity(format!(
            "cannot read client certificate {}: {}",
            cert_path.display(),
            e
        ))
    })?;
    let key = std::fs::read_to_string(key_path).map_err(|e| {
        ExporterError::Identity(format!(
            "cannot read client key {}: {}",
            key_path.display(),
            e
        ))
    })?;

    let bundle = identity_blocks(&format!("{}\n{}", cert, key));
    reqwest::Identity::from_pem(bundle.as_bytes())
        .map_err(|e| ExporterError::Identity(format!("invalid client certificate/key: {}", e)))
}

/// Keep only certificate and private key blocks of a PEM bundle.
///
/// `openssl ecparam -genkey` writes an `EC PARAMETERS` block in front of the
/// key, which the identity parser rejects.
fn identity_blocks(pem: &str) -> String {
    let mut bundle = String::new();
    let mut keep = false;

    for line in pem.lines().map(str::trim_end) {
        if let Some(label) = line.strip_prefix("-----BEGIN ") {
            keep = label == "CERTIFICATE-----" || label.ends_with("PRIVATE KEY-----");
        }
        if keep {
            bundle.push_str(line);
            bundle.push('\n');
        }
        if line.starts_with("-----END ") {
            keep = false;
        }
    }

    bundle
}

/// Decode service entries one by one, keeping the good ones.
pub fn decode_services(raw: Vec<serde_json::Value>) -> ServiceSnapshot {
    let mut snapshot = ServiceSnapshot::default();

    for entry in raw {
        // serde reads a numeric tag as a variant index
        let kind = match entry.get("id").and_then(serde_json::Value::as_str) {
            Some(kind) => kind.to_string(),
            None => {
                warn!("Dropping service record without a string id: {}", entry);
                snapshot.rejected += 1;
                continue;
            }
        };

        match serde_json::from_value::<ServiceRecord>(entry) {
            Ok(record) => snapshot.records.push(record),
            Err(e) => {
                warn!("Dropping {} service record: {}", kind, e);
                snapshot.rejected += 1;
            }
        }
    }

    snapshot
}
