//! Serve command implementation.
//!
//! Builds the classifier engine, record store, and prediction service once,
//! then hands them to the HTTP server.

use anyhow::{Context, Result};
use carclass_serving::{
    AppState, ClassifierEngine, ModelMode, PredictionService, ServerConfig,
};
use carclass_store::PredictionStore;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Serve the classification backend over HTTP
///
/// # Example
///
/// ```bash
/// carclass serve \
///     --model-dir ./model \
///     --db-path ./carclass.db \
///     --upload-dir ./uploads \
///     --port 8000
/// ```
#[derive(Args, Debug, Clone)]
pub struct ServeCommand {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0", env = "CARCLASS_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8000", env = "CARCLASS_PORT")]
    pub port: u16,

    /// Directory containing the exported classifier artifact
    #[arg(long, short = 'd', default_value = "./model", env = "CARCLASS_MODEL_DIR")]
    pub model_dir: PathBuf,

    /// Path of the SQLite database file
    #[arg(long, default_value = "./carclass.db", env = "CARCLASS_DB_PATH")]
    pub db_path: PathBuf,

    /// Directory where uploaded images are stored
    #[arg(long, default_value = "./uploads", env = "CARCLASS_UPLOAD_DIR")]
    pub upload_dir: PathBuf,

    /// Maximum accepted upload body size in bytes
    #[arg(
        long,
        default_value = "10485760",
        env = "CARCLASS_MAX_UPLOAD_BYTES"
    )]
    pub max_upload_bytes: usize,
}

impl ServeCommand {
    /// Execute the serve command.
    pub async fn run(&self) -> Result<()> {
        let config = ServerConfig::builder()
            .host(&self.host)
            .port(self.port)
            .model_dir(&self.model_dir)
            .database_path(&self.db_path)
            .upload_dir(&self.upload_dir)
            .max_upload_bytes(self.max_upload_bytes)
            .build();
        config.validate().context("Invalid server configuration")?;

        info!("Model directory: {:?}", config.model_dir);
        info!("Database: {:?}", config.database_path);
        info!("Upload directory: {:?}", config.upload_dir);

        let engine =
            Arc::new(ClassifierEngine::load(&config.model_dir).context("Failed to build model")?);
        if engine.mode() == ModelMode::Fallback {
            warn!("Serving with the UNTRAINED fallback model; predictions are not meaningful");
        }

        let store = PredictionStore::open(&config.database_path)
            .context("Failed to open prediction store")?;
        let service = Arc::new(PredictionService::new(
            engine,
            store.clone(),
            &config.upload_dir,
        ));

        let state = AppState { service, store };
        carclass_serving::run_server(&config, state)
            .await
            .context("Server terminated with an error")?;
        Ok(())
    }
}
