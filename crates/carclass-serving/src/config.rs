//! Server configuration for the carclass backend.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default maximum accepted upload body size (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Configuration for the HTTP serving process.
///
/// # Example
///
/// ```
/// use carclass_serving::config::ServerConfig;
///
/// let config = ServerConfig::builder()
///     .host("0.0.0.0")
///     .port(8000)
///     .model_dir("/models/carclass")
///     .build();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to (default: "0.0.0.0")
    pub host: String,

    /// Port to listen on (default: 8000)
    pub port: u16,

    /// Directory containing the exported classifier artifact
    pub model_dir: PathBuf,

    /// Path of the SQLite database file
    pub database_path: PathBuf,

    /// Directory where uploaded images are stored
    pub upload_dir: PathBuf,

    /// Maximum accepted upload body size in bytes.
    ///
    /// Enforced at the transport layer; the prediction pipeline itself
    /// imposes no size cap.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            model_dir: PathBuf::from("./model"),
            database_path: PathBuf::from("./carclass.db"),
            upload_dir: PathBuf::from("./uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Get the socket address string for binding.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidUploadLimit);
        }
        Ok(())
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    model_dir: Option<PathBuf>,
    database_path: Option<PathBuf>,
    upload_dir: Option<PathBuf>,
    max_upload_bytes: Option<usize>,
}

impl ServerConfigBuilder {
    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port number.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the model artifact directory.
    pub fn model_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_dir = Some(path.into());
        self
    }

    /// Set the SQLite database path.
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Set the upload directory.
    pub fn upload_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.upload_dir = Some(path.into());
        self
    }

    /// Set the maximum upload body size in bytes.
    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ServerConfig {
        let default = ServerConfig::default();
        ServerConfig {
            host: self.host.unwrap_or(default.host),
            port: self.port.unwrap_or(default.port),
            model_dir: self.model_dir.unwrap_or(default.model_dir),
            database_path: self.database_path.unwrap_or(default.database_path),
            upload_dir: self.upload_dir.unwrap_or(default.upload_dir),
            max_upload_bytes: self.max_upload_bytes.unwrap_or(default.max_upload_bytes),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Host must not be empty
    #[error("Invalid host: host cannot be empty")]
    EmptyHost,

    /// Invalid port number
    #[error("Invalid port number: port cannot be 0")]
    InvalidPort,

    /// Invalid upload size limit
    #[error("Invalid upload limit: must be greater than 0")]
    InvalidUploadLimit,
}
