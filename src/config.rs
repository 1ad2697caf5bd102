use crate::error::{ExporterError, Result as ExporterResult};
use crate::metrics::MetricKind;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration files tried in order when no path is given on the command line.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["config/Default.toml", "config/config.yaml"];

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub http: ServerConfig,
    #[serde(default)]
    pub bshc: BshcConfig,
    #[serde(default)]
    pub services: ServicesConfig,
}

/// Listener for the exposition endpoint. Both fields are required.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub bind: String,
    #[serde(default)]
    pub port: u16,
}

/// Connection to the Smart Home Controller.
#[derive(Debug, Deserialize, Clone)]
pub struct BshcConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub client_cert: PathBuf,
    #[serde(default)]
    pub client_key: PathBuf,
    #[serde(default)]
    pub skip_tls_verify: bool,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

/// Per-kind switches for the projected gauge families.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    #[serde(default = "default_true")]
    pub temperature_level: bool,
    /// Falls back to `temperature_level` when unset.
    #[serde(default)]
    pub setpoint_temperature_level: Option<bool>,
    #[serde(default = "default_true")]
    pub humidity_level: bool,
    #[serde(default = "default_true")]
    pub valve_tappet: bool,
}

fn default_request_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for BshcConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 0,
            client_cert: PathBuf::new(),
            client_key: PathBuf::new(),
            skip_tls_verify: false,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            temperature_level: true,
            setpoint_temperature_level: None,
            humidity_level: true,
            valve_tappet: true,
        }
    }
}

impl BshcConfig {
    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.host, self.port)
    }
}

impl ServicesConfig {
    pub fn is_enabled(&self, kind: MetricKind) -> bool {
        match kind {
            MetricKind::Temperature => self.temperature_level,
            MetricKind::SetpointTemperature => self
                .setpoint_temperature_level
                .unwrap_or(self.temperature_level),
            MetricKind::Humidity => self.humidity_level,
            MetricKind::ValveTappet => self.valve_tappet,
        }
    }

    pub fn enabled_kinds(&self) -> impl Iterator<Item = MetricKind> + '_ {
        MetricKind::ALL
            .into_iter()
            .filter(move |kind| self.is_enabled(*kind))
    }
}

/// Values given on the command line. `None` (or `false` for the insecure
/// switch) leaves the file/environment value untouched.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub bshc_host: Option<String>,
    pub bshc_port: Option<u16>,
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
    pub insecure: bool,
}

impl Config {
    /// First entry of [`DEFAULT_CONFIG_FILES`] that exists under `base`,
    /// falling back to the first entry when none does.
    pub fn default_path(base: &Path) -> PathBuf {
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|file| base.join(file))
            .find(|path| path.is_file())
            .unwrap_or_else(|| base.join(DEFAULT_CONFIG_FILES[0]))
    }

    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("BSHC_EXPORTER").separator("__"))
            .build()
            .with_context(|| format!("Failed to build configuration from {}", path))?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(bind) = overrides.bind {
            self.http.bind = bind;
        }
        if let Some(port) = overrides.port {
            self.http.port = port;
        }
        if let Some(host) = overrides.bshc_host {
            self.bshc.host = host;
        }
        if let Some(port) = overrides.bshc_port {
            self.bshc.port = port;
        }
        if let Some(cert) = overrides.client_cert {
            self.bshc.client_cert = cert;
        }
        if let Some(key) = overrides.client_key {
            self.bshc.client_key = key;
        }
        if overrides.insecure {
            self.bshc.skip_tls_verify = true;
        }
    }

    /// Fails with every missing required key listed.
    pub fn validate(&self) -> ExporterResult<()> {
        let mut missing = Vec::new();

        if self.http.bind.trim().is_empty() {
            missing.push("http.bind");
        }
        if self.http.port == 0 {
            missing.push("http.port");
        }
        if self.bshc.host.trim().is_empty() {
            missing.push("bshc.host");
        }
        if self.bshc.port == 0 {
            missing.push("bshc.port");
        }
        if self.bshc.client_cert.as_os_str().is_empty() {
            missing.push("bshc.client_cert");
        }
        if self.bshc.client_key.as_os_str().is_empty() {
            missing.push("bshc.client_key");
        }
        if self.bshc.request_timeout_seconds == 0 {
            missing.push("bshc.request_timeout_seconds");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ExporterError::Config(format!(
                "missing required configuration values: {}",
                missing.join(", ")
            )))
        }
    }
}
