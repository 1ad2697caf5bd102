use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Client identity error: {0}")]
    Identity(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid field: {0}")]
    Field(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExporterError {
    /// Whether the hub could not be reached or answered with a non-200 status.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ExporterError::Transport(_) | ExporterError::Status { .. } | ExporterError::Identity(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
