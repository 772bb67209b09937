//! Loading the classifier artifact, with fallback on failure.
//!
//! The engine is constructed once at process startup and injected into the
//! prediction service by reference; there is no lazily-initialized global
//! model state. If the exported artifact is missing or unreadable the engine
//! degrades to the deterministic untrained placeholder instead of failing
//! startup; the degradation is logged loudly and surfaced through
//! [`ClassifierEngine::mode`].

use crate::classifier::{ClassifierSpec, ImageClassifier, InputSpec, ModelMode, DEFAULT_CLASSES};
use crate::error::{ServingError, ServingResult};
use candle_core::{Device, Tensor};
use carclass_vision::{INPUT_CHANNELS, INPUT_HEIGHT, INPUT_WIDTH};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name of the classifier spec inside the model directory.
pub const MODEL_SPEC_FILE: &str = "model_spec.json";

/// Relative path of the dense parameter file inside the model directory.
pub const DENSE_PARAMS_FILE: &str = "dense/params.json";

/// The loaded classifier, shared across requests.
///
/// Weights are immutable after construction, so `predict` may be called
/// concurrently without a serialization gate.
pub struct ClassifierEngine {
    classifier: ImageClassifier,
    model_dir: PathBuf,
}

impl ClassifierEngine {
    /// Load the classifier from `model_dir`.
    ///
    /// Falls back to the untrained placeholder (uniform output over
    /// [`DEFAULT_CLASSES`]) when the artifact is missing or fails to parse.
    ///
    /// # Errors
    ///
    /// Returns [`ServingError::ModelUnavailable`] only if neither the real
    /// model nor the fallback can be constructed.
    pub fn load(model_dir: impl AsRef<Path>) -> ServingResult<Self> {
        let model_dir = model_dir.as_ref().to_path_buf();
        let device = Device::Cpu;

        let classifier = match Self::try_load_trained(&model_dir, &device) {
            Ok(Some(model)) => {
                info!(
                    "Loaded trained classifier from {:?} ({} classes)",
                    model_dir,
                    model.classes().len()
                );
                model
            }
            Ok(None) => {
                warn!(
                    "No classifier artifact at {:?}; serving the UNTRAINED fallback model, \
                     predictions are uniform and not production-quality",
                    model_dir
                );
                Self::build_fallback(&device)?
            }
            Err(e) => {
                warn!(
                    "Failed to load classifier from {:?}: {e}; serving the UNTRAINED fallback \
                     model, predictions are uniform and not production-quality",
                    model_dir
                );
                Self::build_fallback(&device)?
            }
        };

        Ok(Self {
            classifier,
            model_dir,
        })
    }

    /// Run inference over a single preprocessed image tensor.
    pub fn predict(&self, input: &Tensor) -> ServingResult<Vec<f32>> {
        self.classifier.predict(input)
    }

    /// The ordered class vocabulary.
    pub fn classes(&self) -> &[String] {
        self.classifier.classes()
    }

    /// Whether the trained artifact or the fallback placeholder is serving.
    pub fn mode(&self) -> ModelMode {
        self.classifier.mode()
    }

    /// The directory this engine attempted to load from.
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    fn try_load_trained(
        model_dir: &Path,
        device: &Device,
    ) -> ServingResult<Option<ImageClassifier>> {
        let spec_path = model_dir.join(MODEL_SPEC_FILE);
        let dense_path = model_dir.join(DENSE_PARAMS_FILE);

        if !spec_path.exists() || !dense_path.exists() {
            return Ok(None);
        }

        let spec_json = std::fs::read_to_string(&spec_path).map_err(|e| {
            ServingError::model_unavailable(format!("Failed to read {spec_path:?}: {e}"))
        })?;
        let spec: ClassifierSpec = serde_json::from_str(&spec_json).map_err(|e| {
            ServingError::model_unavailable(format!("Failed to parse {spec_path:?}: {e}"))
        })?;

        let dense_json = std::fs::read_to_string(&dense_path).map_err(|e| {
            ServingError::model_unavailable(format!("Failed to read {dense_path:?}: {e}"))
        })?;
        let params: HashMap<String, Vec<f32>> =
            serde_json::from_str(&dense_json).map_err(|e| {
                ServingError::model_unavailable(format!("Failed to parse {dense_path:?}: {e}"))
            })?;

        ImageClassifier::from_params(&spec, &params, device).map(Some)
    }

    fn build_fallback(device: &Device) -> ServingResult<ImageClassifier> {
        ImageClassifier::fallback(
            DEFAULT_CLASSES.iter().map(|c| c.to_string()).collect(),
            InputSpec {
                height: INPUT_HEIGHT,
                width: INPUT_WIDTH,
                channels: INPUT_CHANNELS,
            },
            device,
        )
    }
}

impl std::fmt::Debug for ClassifierEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierEngine")
            .field("model_dir", &self.model_dir)
            .field("mode", &self.mode())
            .field("classes", &self.classes().len())
            .finish()
    }
}
