//! End-to-end prediction orchestration.
//!
//! One upload-to-record cycle: validate the declared media type, decode,
//! persist the original bytes, preprocess, infer, and write the prediction
//! record. There are no retries; any failing step surfaces as a single
//! terminal error.
//!
//! Known gap, kept deliberately: the uploaded file is written before
//! inference and is NOT removed when a later step fails, so a failed request
//! can leave an orphaned file in the upload directory.

use crate::classifier::ModelMode;
use crate::error::{ServingError, ServingResult};
use crate::model_loader::ClassifierEngine;
use carclass_store::{NewPrediction, PredictionStore};
use carclass_vision::preprocess_rgb;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// An uploaded file as received from the transport layer.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Client-supplied file name.
    pub filename: String,

    /// Declared media type of the upload.
    pub content_type: String,

    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// Structured result of one prediction cycle.
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    /// Predicted label.
    pub class_name: String,

    /// Probability mass assigned to the predicted label.
    pub confidence: f64,

    /// Full label -> probability mapping.
    pub all_predictions: HashMap<String, f64>,

    /// Which model produced this result.
    pub model_mode: ModelMode,
}

/// Orchestrates upload validation, preprocessing, inference, and persistence.
pub struct PredictionService {
    engine: Arc<ClassifierEngine>,
    store: PredictionStore,
    upload_dir: PathBuf,
}

impl PredictionService {
    /// Create a service over an already-constructed engine and store.
    pub fn new(
        engine: Arc<ClassifierEngine>,
        store: PredictionStore,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            store,
            upload_dir: upload_dir.into(),
        }
    }

    /// The engine serving this service's predictions.
    pub fn engine(&self) -> &ClassifierEngine {
        &self.engine
    }

    /// Run one upload-to-record cycle.
    ///
    /// # Errors
    ///
    /// - [`ServingError::InvalidInput`]: the declared media type is not
    ///   `image/*`, or the bytes do not decode as an image.
    /// - [`ServingError::Io`]: the original bytes could not be written to the
    ///   upload directory.
    /// - [`ServingError::Persistence`]: the record write failed. The upload
    ///   file written earlier remains on disk.
    pub fn predict(&self, upload: ImageUpload) -> ServingResult<PredictionOutcome> {
        if !upload.content_type.starts_with("image/") {
            return Err(ServingError::invalid_input(format!(
                "File must be an image, got {:?}",
                upload.content_type
            )));
        }

        // Decode before touching disk: an undecodable upload leaves no file
        // behind.
        let image = carclass_vision::decode_rgb(&upload.bytes)?;

        let image_path = self.save_upload(&upload.filename, &upload.bytes)?;
        debug!("Stored upload at {:?}", image_path);

        let tensor = preprocess_rgb(&image)?;
        let probs = self.engine.predict(&tensor)?;

        let classes = self.engine.classes();
        let (class_idx, confidence) = argmax(&probs).ok_or_else(|| {
            ServingError::inference("Classifier returned an empty probability vector")
        })?;
        let predicted_class = classes[class_idx].clone();

        let all_predictions: HashMap<String, f64> = classes
            .iter()
            .zip(probs.iter())
            .map(|(label, &p)| (label.clone(), p as f64))
            .collect();

        let record = self.store.create(NewPrediction {
            image_path: image_path.display().to_string(),
            predicted_class: predicted_class.clone(),
            confidence,
            all_predictions: all_predictions.clone(),
        })?;
        info!(
            "Prediction {} recorded: {} ({:.2}%, {} model)",
            record.id,
            predicted_class,
            confidence * 100.0,
            self.engine.mode()
        );

        Ok(PredictionOutcome {
            class_name: predicted_class,
            confidence,
            all_predictions,
            model_mode: self.engine.mode(),
        })
    }

    /// Write the original upload bytes under `{timestamp}_{original_name}`.
    fn save_upload(&self, filename: &str, bytes: &[u8]) -> ServingResult<PathBuf> {
        std::fs::create_dir_all(&self.upload_dir)?;

        // Keep only the final path component of the client-supplied name.
        let original = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload");
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let path = self.upload_dir.join(format!("{timestamp}_{original}"));

        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("upload_dir", &self.upload_dir)
            .field("engine", &self.engine)
            .finish()
    }
}

/// Index and value of the maximum entry; first index wins ties.
fn argmax(probs: &[f32]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &p) in probs.iter().enumerate() {
        match best {
            Some((_, max)) if max >= p => {}
            _ => best = Some((i, p)),
        }
    }
    best.map(|(i, p)| (i, p as f64))
}
