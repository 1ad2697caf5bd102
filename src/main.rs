use anyhow::Result;
use bshc_exporter::{
    config::{CliOverrides, Config},
    server,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file [default: config/Default.toml, then config/config.yaml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind the metrics server to (overrides config)
    #[arg(short, long, env = "BSHC_EXPORTER_BIND")]
    bind: Option<String>,

    /// Port to listen on for metrics (overrides config)
    #[arg(short, long, env = "BSHC_EXPORTER_PORT")]
    port: Option<u16>,

    /// Smart Home Controller host (overrides config)
    #[arg(long, alias = "bshchost", env = "BSHC_HOST")]
    bshc_host: Option<String>,

    /// Smart Home Controller port (overrides config)
    #[arg(long, alias = "bshcport", env = "BSHC_PORT")]
    bshc_port: Option<u16>,

    /// Client certificate registered with the controller (overrides config)
    #[arg(long, alias = "clientcert")]
    client_cert: Option<PathBuf>,

    /// PEM private key of the client certificate (overrides config)
    #[arg(long, alias = "clientkey")]
    client_key: Option<PathBuf>,

    /// Skip server certificate verification
    #[arg(short, long)]
    insecure: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            bind: self.bind.clone(),
            port: self.port,
            bshc_host: self.bshc_host.clone(),
            bshc_port: self.bshc_port,
            client_cert: self.client_cert.clone(),
            client_key: self.client_key.clone(),
            insecure: self.insecure,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing
    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting BSHC Prometheus Exporter v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| Config::default_path(Path::new(".")));
    debug!("Configuration file: {}", config_path.display());
    let mut config = Config::load(&config_path.to_string_lossy())?;
    config.apply_overrides(args.overrides());
    config.validate()?;

    info!("Configuration loaded successfully");
    info!(
        "Controller: {} (TLS verification {})",
        config.bshc.base_url(),
        if config.bshc.skip_tls_verify {
            "disabled"
        } else {
            "enabled"
        }
    );
    debug!("Client certificate: {}", config.bshc.client_cert.display());
    debug!("Client key: {}", config.bshc.client_key.display());
    debug!("Enabled services: {:?}", config.services);
    info!(
        "Metrics endpoint: http://{}:{}/metrics",
        config.http.bind, config.http.port
    );

    // Start the metrics server
    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
