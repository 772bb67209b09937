//! Aggregate statistics over the prediction history.

use crate::record::Prediction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Summary statistics derived from the full prediction set.
///
/// Also serves as the `/api/stats` response body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Total number of stored predictions.
    pub total_predictions: u64,

    /// Label with the highest occurrence count, `None` when the store is
    /// empty. On a count tie the winner is whichever label reached the
    /// maximum first in scan order; callers must not rely on any particular
    /// tie-break.
    pub most_predicted_class: Option<String>,

    /// Arithmetic mean of `confidence` over all records; 0.0 when empty.
    pub average_confidence: f64,

    /// Occurrence count per observed label. Labels never predicted are
    /// absent, not present with count 0.
    pub predictions_by_class: HashMap<String, u64>,
}

/// Reduce the full record set to summary statistics.
///
/// Pure and read-only; the caller supplies the records (normally via
/// `PredictionStore::scan_all`).
pub fn aggregate(records: &[Prediction]) -> Stats {
    if records.is_empty() {
        return Stats::default();
    }

    let total = records.len() as u64;
    let confidence_sum: f64 = records.iter().map(|r| r.confidence).sum();

    let mut by_class: HashMap<String, u64> = HashMap::new();
    let mut most: Option<(String, u64)> = None;
    for record in records {
        let count = by_class
            .entry(record.predicted_class.clone())
            .and_modify(|c| *c += 1)
            .or_insert(1);
        // Strictly-greater keeps the first label that attained the maximum.
        let count = *count;
        match &most {
            Some((_, best)) if *best >= count => {}
            _ => most = Some((record.predicted_class.clone(), count)),
        }
    }

    Stats {
        total_predictions: total,
        most_predicted_class: most.map(|(label, _)| label),
        average_confidence: confidence_sum / total as f64,
        predictions_by_class: by_class,
    }
}
