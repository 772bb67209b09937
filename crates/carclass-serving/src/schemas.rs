//! Wire schemas for the HTTP surface.

use crate::classifier::ModelMode;
use crate::service::PredictionOutcome;
use carclass_store::Prediction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use carclass_store::Stats as StatsResponse;

/// Response body of `POST /api/predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Predicted label.
    pub class_name: String,

    /// Probability mass assigned to the predicted label.
    pub confidence: f64,

    /// Full label -> probability mapping.
    pub all_predictions: HashMap<String, f64>,

    /// Which model produced this result (`trained` or `fallback`).
    pub model_mode: ModelMode,
}

impl From<PredictionOutcome> for PredictionResponse {
    fn from(outcome: PredictionOutcome) -> Self {
        Self {
            class_name: outcome.class_name,
            confidence: outcome.confidence,
            all_predictions: outcome.all_predictions,
            model_mode: outcome.model_mode,
        }
    }
}

/// One entry of the prediction history listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionHistory {
    /// Record id.
    pub id: i64,

    /// Path of the stored original image.
    pub image_path: String,

    /// Predicted label.
    pub predicted_class: String,

    /// Probability mass assigned to the predicted label.
    pub confidence: f64,

    /// Record creation time.
    pub created_at: DateTime<Utc>,
}

impl From<Prediction> for PredictionHistory {
    fn from(record: Prediction) -> Self {
        Self {
            id: record.id,
            image_path: record.image_path,
            predicted_class: record.predicted_class,
            confidence: record.confidence,
            created_at: record.created_at,
        }
    }
}

/// Response body of `DELETE /api/predictions/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Human-readable confirmation.
    pub message: String,
}

/// Response body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" while the process is serving.
    pub status: String,

    /// Application name.
    pub app: String,

    /// Crate version.
    pub version: String,

    /// Which model is serving (`trained` or `fallback`).
    pub model_mode: ModelMode,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error description.
    pub error: String,
}
