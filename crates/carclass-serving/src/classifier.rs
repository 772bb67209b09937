//! Candle-backed image classifier for carclass serving.
//!
//! An exported classifier artifact is a directory containing
//! `model_spec.json` (a [`ClassifierSpec`]) plus `dense/params.json` holding
//! flat f32 parameter arrays keyed by layer name. Serving loads the spec and
//! builds an inference graph backed by Candle.
//!
//! The network is deliberately simple: the normalized image tensor is
//! flattened and pushed through a stack of linear layers with ReLU between
//! them (none after the last), then softmax turns the logits into a
//! probability distribution over the class vocabulary.

use crate::error::{ServingError, ServingResult};
use candle_core::{DType, Device, Tensor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Class vocabulary compiled into the binary, used by the fallback model.
///
/// The order matters: probability vectors are indexed by position in this
/// list, and historical records only store the label string.
pub const DEFAULT_CLASSES: [&str; 7] = [
    "Audi",
    "Hyundai Creta",
    "Mahindra Scorpio",
    "Rolls Royce",
    "Swift",
    "Tata Safari",
    "Toyota Innova",
];

/// Which kind of model produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelMode {
    /// The exported, trained artifact.
    Trained,
    /// The deterministic untrained placeholder. Predictions are uniform and
    /// must never be mistaken for production-quality results.
    Fallback,
}

impl std::fmt::Display for ModelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelMode::Trained => write!(f, "trained"),
            ModelMode::Fallback => write!(f, "fallback"),
        }
    }
}

/// Expected input shape of the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Input height in pixels.
    pub height: usize,
    /// Input width in pixels.
    pub width: usize,
    /// Input channel count.
    pub channels: usize,
}

impl InputSpec {
    /// Flattened element count of one input image.
    pub fn flat_dim(&self) -> usize {
        self.height * self.width * self.channels
    }
}

/// Classifier specification stored next to an exported model as
/// `model_spec.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSpec {
    /// Expected input shape.
    pub input: InputSpec,

    /// Ordered class vocabulary. The output distribution is indexed by
    /// position in this list.
    pub classes: Vec<String>,

    /// Hidden layer widths of the MLP head over the flattened input.
    #[serde(default)]
    pub hidden_dims: Vec<usize>,
}

impl ClassifierSpec {
    /// Validate structural constraints of the spec.
    pub fn validate(&self) -> ServingResult<()> {
        if self.classes.is_empty() {
            return Err(ServingError::model_unavailable(
                "Classifier spec has an empty class vocabulary",
            ));
        }
        if self.input.flat_dim() == 0 {
            return Err(ServingError::model_unavailable(
                "Classifier spec has a zero-sized input shape",
            ));
        }
        Ok(())
    }
}

/// A classifier ready for inference.
///
/// Weights are immutable after construction; `predict` takes `&self` and is
/// safe to call concurrently.
pub struct ImageClassifier {
    spec: ClassifierSpec,
    // layers: (w, b); w is [out, in]
    weights: Vec<(Tensor, Tensor)>,
    mode: ModelMode,
}

impl ImageClassifier {
    /// Build a classifier from a spec and dense parameters.
    ///
    /// Parameters are flat f32 arrays keyed `classifier.layers.{i}.weight`
    /// (shape `[out, in]`, row-major) and `classifier.layers.{i}.bias`
    /// (shape `[out]`).
    pub fn from_params(
        spec: &ClassifierSpec,
        params: &HashMap<String, Vec<f32>>,
        device: &Device,
    ) -> ServingResult<Self> {
        spec.validate()?;

        let mut weights = Vec::new();
        let mut in_dim = spec.input.flat_dim();

        let mut all_layers: Vec<usize> = spec.hidden_dims.clone();
        all_layers.push(spec.classes.len());

        for (i, &out_dim) in all_layers.iter().enumerate() {
            let w_name = format!("classifier.layers.{i}.weight");
            let b_name = format!("classifier.layers.{i}.bias");
            let w = tensor_from_vec(params, &w_name, &[out_dim, in_dim], device)?;
            let b = tensor_from_vec(params, &b_name, &[out_dim], device)?;
            weights.push((w, b));
            in_dim = out_dim;
        }

        Ok(Self {
            spec: spec.clone(),
            weights,
            mode: ModelMode::Trained,
        })
    }

    /// Build the deterministic untrained placeholder.
    ///
    /// A single zero-weight linear layer: every logit is 0, so softmax yields
    /// an exactly uniform distribution over the vocabulary regardless of
    /// input. Same input/output contract as a trained model.
    pub fn fallback(classes: Vec<String>, input: InputSpec, device: &Device) -> ServingResult<Self> {
        let spec = ClassifierSpec {
            input,
            classes,
            hidden_dims: Vec::new(),
        };
        spec.validate()?;

        let out_dim = spec.classes.len();
        let in_dim = spec.input.flat_dim();
        let w = Tensor::zeros((out_dim, in_dim), DType::F32, device).map_err(|e| {
            ServingError::model_unavailable(format!("Fallback weight init failed: {e}"))
        })?;
        let b = Tensor::zeros(out_dim, DType::F32, device).map_err(|e| {
            ServingError::model_unavailable(format!("Fallback bias init failed: {e}"))
        })?;

        Ok(Self {
            spec,
            weights: vec![(w, b)],
            mode: ModelMode::Fallback,
        })
    }

    /// The spec this classifier was built from.
    pub fn spec(&self) -> &ClassifierSpec {
        &self.spec
    }

    /// The ordered class vocabulary.
    pub fn classes(&self) -> &[String] {
        &self.spec.classes
    }

    /// Whether this is the trained artifact or the fallback placeholder.
    pub fn mode(&self) -> ModelMode {
        self.mode
    }

    /// Run the classifier over a single preprocessed image tensor.
    ///
    /// The input must hold exactly one image whose element count matches the
    /// spec's input shape (the leading batch dimension must be 1). Returns one
    /// probability per vocabulary entry; entries are non-negative and sum to
    /// approximately 1.0.
    pub fn predict(&self, input: &Tensor) -> ServingResult<Vec<f32>> {
        let elems = input.elem_count();
        let expected = self.spec.input.flat_dim();
        if elems != expected {
            return Err(ServingError::inference(format!(
                "Input has {elems} elements, expected {expected} for shape \
                 ({}, {}, {})",
                self.spec.input.height, self.spec.input.width, self.spec.input.channels
            )));
        }

        let mut x = input.reshape((1, expected))?;
        for (i, (w, b)) in self.weights.iter().enumerate() {
            x = x.matmul(&w.t()?)?.broadcast_add(b)?;
            let is_last = i + 1 == self.weights.len();
            if !is_last {
                x = x.relu()?;
            }
        }

        let probs = candle_nn::ops::softmax(&x, 1)?;
        Ok(probs.squeeze(0)?.to_vec1::<f32>()?)
    }
}

impl std::fmt::Debug for ImageClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageClassifier")
            .field("classes", &self.spec.classes.len())
            .field("layers", &self.weights.len())
            .field("mode", &self.mode)
            .finish()
    }
}

fn tensor_from_vec(
    params: &HashMap<String, Vec<f32>>,
    name: &str,
    shape: &[usize],
    device: &Device,
) -> ServingResult<Tensor> {
    let data = params.get(name).ok_or_else(|| {
        ServingError::model_unavailable(format!("Missing dense param {name:?}"))
    })?;
    let numel: usize = shape.iter().product();
    if data.len() != numel {
        return Err(ServingError::model_unavailable(format!(
            "Param {:?} has len {}, expected {} for shape {:?}",
            name,
            data.len(),
            numel,
            shape
        )));
    }
    Tensor::from_slice(data, shape, device)
        .map_err(|e| ServingError::model_unavailable(format!("Tensor init failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_input() -> InputSpec {
        InputSpec {
            height: 2,
            width: 2,
            channels: 1,
        }
    }

    fn image_tensor(values: &[f32], input: &InputSpec) -> Tensor {
        Tensor::from_slice(
            values,
            (1, input.height, input.width, input.channels),
            &Device::Cpu,
        )
        .unwrap()
    }

    #[test]
    fn test_spec_json_roundtrip() {
        let json = r#"{
            "input": {"height": 224, "width": 224, "channels": 3},
            "classes": ["Audi", "Swift"],
            "hidden_dims": [128]
        }"#;
        let spec: ClassifierSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.input.flat_dim(), 224 * 224 * 3);
        assert_eq!(spec.classes, vec!["Audi", "Swift"]);
        assert_eq!(spec.hidden_dims, vec![128]);

        let back: ClassifierSpec =
            serde_json::from_str(&serde_json::to_string(&spec).unwrap()).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_hidden_dims_default_to_empty() {
        let json = r#"{
            "input": {"height": 4, "width": 4, "channels": 3},
            "classes": ["a", "b", "c"]
        }"#;
        let spec: ClassifierSpec = serde_json::from_str(json).unwrap();
        assert!(spec.hidden_dims.is_empty());
    }

    #[test]
    fn test_empty_vocabulary_is_rejected() {
        let spec = ClassifierSpec {
            input: tiny_input(),
            classes: Vec::new(),
            hidden_dims: Vec::new(),
        };
        assert!(matches!(
            spec.validate(),
            Err(ServingError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_fallback_is_exactly_uniform() {
        let classes: Vec<String> = DEFAULT_CLASSES.iter().map(|c| c.to_string()).collect();
        let model =
            ImageClassifier::fallback(classes.clone(), tiny_input(), &Device::Cpu).unwrap();
        assert_eq!(model.mode(), ModelMode::Fallback);

        let input = image_tensor(&[0.1, 0.9, 0.4, 0.7], &tiny_input());
        let probs = model.predict(&input).unwrap();

        assert_eq!(probs.len(), classes.len());
        let uniform = 1.0 / classes.len() as f32;
        for &p in &probs {
            assert!((p - uniform).abs() < 1e-6);
        }
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_trained_model_prefers_weighted_class() {
        // Single linear layer over 4 inputs and 2 classes. The second class
        // weighs the inputs positively, the first negatively, so any positive
        // input must favor class 1.
        let spec = ClassifierSpec {
            input: tiny_input(),
            classes: vec!["low".to_string(), "high".to_string()],
            hidden_dims: Vec::new(),
        };
        let mut params = HashMap::new();
        params.insert(
            "classifier.layers.0.weight".to_string(),
            vec![-1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0],
        );
        params.insert("classifier.layers.0.bias".to_string(), vec![0.0, 0.0]);

        let model = ImageClassifier::from_params(&spec, &params, &Device::Cpu).unwrap();
        assert_eq!(model.mode(), ModelMode::Trained);

        let input = image_tensor(&[0.5, 0.5, 0.5, 0.5], &tiny_input());
        let probs = model.predict(&input).unwrap();

        assert_eq!(probs.len(), 2);
        assert!(probs[1] > probs[0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hidden_layer_model_produces_distribution() {
        let spec = ClassifierSpec {
            input: tiny_input(),
            classes: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            hidden_dims: vec![3],
        };
        let mut params = HashMap::new();
        params.insert(
            "classifier.layers.0.weight".to_string(),
            vec![0.5; 3 * 4],
        );
        params.insert("classifier.layers.0.bias".to_string(), vec![0.1; 3]);
        params.insert(
            "classifier.layers.1.weight".to_string(),
            vec![0.2, -0.1, 0.3, 0.0, 0.4, -0.2, 0.1, 0.1, 0.1],
        );
        params.insert("classifier.layers.1.bias".to_string(), vec![0.0; 3]);

        let model = ImageClassifier::from_params(&spec, &params, &Device::Cpu).unwrap();
        let input = image_tensor(&[0.2, 0.4, 0.6, 0.8], &tiny_input());
        let probs = model.predict(&input).unwrap();

        assert_eq!(probs.len(), 3);
        assert!(probs.iter().all(|&p| p >= 0.0));
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_missing_param_is_rejected() {
        let spec = ClassifierSpec {
            input: tiny_input(),
            classes: vec!["a".to_string(), "b".to_string()],
            hidden_dims: Vec::new(),
        };
        let params = HashMap::new();
        let err = ImageClassifier::from_params(&spec, &params, &Device::Cpu).unwrap_err();
        assert!(matches!(err, ServingError::ModelUnavailable(_)));
    }

    #[test]
    fn test_wrong_param_length_is_rejected() {
        let spec = ClassifierSpec {
            input: tiny_input(),
            classes: vec!["a".to_string(), "b".to_string()],
            hidden_dims: Vec::new(),
        };
        let mut params = HashMap::new();
        params.insert("classifier.layers.0.weight".to_string(), vec![1.0; 3]);
        params.insert("classifier.layers.0.bias".to_string(), vec![0.0; 2]);

        let err = ImageClassifier::from_params(&spec, &params, &Device::Cpu).unwrap_err();
        assert!(matches!(err, ServingError::ModelUnavailable(_)));
    }

    #[test]
    fn test_shape_mismatch_is_rejected_at_predict() {
        let classes = vec!["a".to_string(), "b".to_string()];
        let model = ImageClassifier::fallback(classes, tiny_input(), &Device::Cpu).unwrap();

        let wrong = Tensor::from_slice(&[0.0f32; 6], (1, 2, 3, 1), &Device::Cpu).unwrap();
        let err = model.predict(&wrong).unwrap_err();
        assert!(matches!(err, ServingError::Inference(_)));
    }
}
