//! Serving layer for the carclass image-classification backend.
//!
//! This crate ties the image pipeline and the record store together and
//! exposes them over HTTP. It provides:
//!
//! - **ClassifierSpec / ImageClassifier**: Candle-backed MLP classifier built
//!   from an exported artifact (`model_spec.json` + `dense/params.json`)
//! - **ClassifierEngine**: artifact loading with a deterministic untrained
//!   fallback when the artifact is missing or unreadable
//! - **PredictionService**: one upload-to-record cycle
//!   (validate -> decode -> save -> preprocess -> infer -> persist)
//! - **ServerConfig**: serving configuration with builder and validation
//! - **router / run_server**: the axum HTTP binding
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                     HTTP clients                     │
//! └──────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌──────────────────────────────────────────────────────┐
//! │                    axum Router                       │
//! │   /api/predict  /api/predictions  /api/stats  /health│
//! └──────────────────────────────────────────────────────┘
//!             │                          │
//!             ▼                          ▼
//! ┌─────────────────────┐   ┌──────────────────────────┐
//! │  PredictionService  │──▶│     PredictionStore      │
//! └─────────────────────┘   │  (SQLite, carclass-store)│
//!     │            │        └──────────────────────────┘
//!     ▼            ▼
//! ┌──────────┐ ┌─────────────────┐
//! │ carclass │ │ ClassifierEngine│
//! │ -vision  │ │ (Candle MLP or  │
//! │ (decode, │ │  fallback)      │
//! │  resize) │ └─────────────────┘
//! └──────────┘
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use carclass_serving::{
//!     config::ServerConfig, model_loader::ClassifierEngine, server,
//!     service::PredictionService,
//! };
//! use carclass_store::PredictionStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::builder().port(8000).build();
//! let engine = Arc::new(ClassifierEngine::load(&config.model_dir)?);
//! let store = PredictionStore::open(&config.database_path)?;
//! let service = Arc::new(PredictionService::new(
//!     engine,
//!     store.clone(),
//!     &config.upload_dir,
//! ));
//!
//! let state = server::AppState { service, store };
//! server::run_server(&config, state).await?;
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod model_loader;
pub mod schemas;
pub mod server;
pub mod service;

pub use classifier::{ClassifierSpec, ImageClassifier, InputSpec, ModelMode, DEFAULT_CLASSES};
pub use config::ServerConfig;
pub use error::{ServingError, ServingResult};
pub use model_loader::ClassifierEngine;
pub use server::{router, run_server, AppState};
pub use service::{ImageUpload, PredictionOutcome, PredictionService};
