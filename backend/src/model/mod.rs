pub mod loader;
pub mod onnx;
#[cfg(feature = "torch")]
pub mod torch;

use ndarray::{Array2, Array4};
use serde::{Deserialize, Serialize};

pub use loader::ModelLoader;

/// Channels in every tensor handed to a predictor (RGB, channel-last).
pub const INPUT_CHANNELS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Input tensor has shape {actual:?}, expected {expected:?}")]
    InputShape {
        expected: [usize; 4],
        actual: Vec<usize>,
    },
    #[error("Model runtime error: {0}")]
    Runtime(String),
    #[error("Unexpected model output: {0}")]
    Output(String),
}

/// Serialized artifact formats the loader can materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Onnx,
    TorchScript,
}

impl ModelFormat {
    /// Guesses the format from the artifact's extension, ignoring any URL query or fragment.
    pub fn detect(location: &str) -> Option<Self> {
        let path = location.split(['?', '#']).next().unwrap_or(location);
        let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "onnx" => Some(ModelFormat::Onnx),
            "pt" | "pth" | "torchscript" => Some(ModelFormat::TorchScript),
            _ => None,
        }
    }
}

/// An inference-only model: fixed-shape tensor in, small score matrix out.
pub trait Predictor: Send + Sync {
    fn forward(&self, input: &Array4<f32>) -> Result<Array2<f32>, InferenceError>;

    fn backend(&self) -> &'static str;
}

/// A predictor tagged with the square resolution it was exported for.
pub struct LoadedModel {
    name: String,
    location: String,
    input_size: u32,
    predictor: Box<dyn Predictor>,
}

impl LoadedModel {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        input_size: u32,
        predictor: Box<dyn Predictor>,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            input_size,
            predictor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    pub fn backend(&self) -> &'static str {
        self.predictor.backend()
    }

    pub fn expected_shape(&self) -> [usize; 4] {
        let size = self.input_size as usize;
        [1, size, size, INPUT_CHANNELS]
    }

    pub fn forward(&self, input: &Array4<f32>) -> Result<Array2<f32>, InferenceError> {
        let expected = self.expected_shape();
        if input.shape() != &expected[..] {
            return Err(InferenceError::InputShape {
                expected,
                actual: input.shape().to_vec(),
            });
        }
        self.predictor.forward(input)
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("name", &self.name)
            .field("location", &self.location)
            .field("input_size", &self.input_size)
            .field("backend", &self.backend())
            .finish()
    }
}

/// Reshapes a flat runtime output into `(batch, scores)` rows.
pub(crate) fn output_rows(values: Vec<f32>, shape: &[usize]) -> Result<Array2<f32>, InferenceError> {
    if values.is_empty() {
        return Err(InferenceError::Output("model produced an empty tensor".into()));
    }
    let rows = match shape {
        [] => 1,
        [_] => 1,
        [batch, ..] => *batch,
    };
    if rows == 0 || values.len() % rows != 0 {
        return Err(InferenceError::Output(format!(
            "cannot split {} values of shape {:?} into batch rows",
            values.len(),
            shape
        )));
    }
    let cols = values.len() / rows;
    Array2::from_shape_vec((rows, cols), values)
        .map_err(|e| InferenceError::Output(e.to_string()))
}
