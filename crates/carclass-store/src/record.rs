//! Domain types for persisted prediction records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A persisted prediction record.
///
/// Invariants maintained by the writer (the prediction service):
/// `predicted_class` is the argmax label of `all_predictions`, and
/// `confidence == all_predictions[predicted_class]`. Only the label string is
/// stored, not a vocabulary index, so the class vocabulary must stay fixed for
/// the lifetime of a database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Unique, monotonically assigned identifier.
    pub id: i64,

    /// Path of the stored original image on disk.
    pub image_path: String,

    /// Predicted label, one of the fixed class vocabulary.
    pub predicted_class: String,

    /// Probability mass assigned to `predicted_class`, in `[0, 1]`.
    pub confidence: f64,

    /// Full probability distribution over the vocabulary; values sum to approximately 1.
    pub all_predictions: HashMap<String, f64>,

    /// Record creation time, assigned by the store at insert.
    pub created_at: DateTime<Utc>,
}

impl Prediction {
    /// Check the stored-record consistency invariants.
    ///
    /// Returns true when `confidence` matches the probability stored for
    /// `predicted_class` and no other label carries more mass.
    pub fn is_consistent(&self) -> bool {
        let Some(&own) = self.all_predictions.get(&self.predicted_class) else {
            return false;
        };
        if (own - self.confidence).abs() > 1e-9 {
            return false;
        }
        self.all_predictions.values().all(|&p| p <= own + 1e-9)
    }
}

/// A prediction record about to be inserted.
///
/// The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrediction {
    /// Path of the stored original image on disk.
    pub image_path: String,

    /// Predicted label.
    pub predicted_class: String,

    /// Probability mass assigned to `predicted_class`.
    pub confidence: f64,

    /// Full probability distribution over the vocabulary.
    pub all_predictions: HashMap<String, f64>,
}
