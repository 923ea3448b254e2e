pub mod decision;
pub mod preprocess;
pub mod selector;

use shared::{HealthResponse, Label, ModelStatus, Route};

use crate::model::{InferenceError, LoadedModel};
use decision::classify;
use preprocess::decode_image;
use selector::PredictionSelector;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Uploaded file is not a decodable image: {0}")]
    InvalidImage(#[source] image::ImageError),
    #[error("No model is loaded to serve this request")]
    ModelUnavailable,
    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("Model output did not contain a score")]
    EmptyOutput,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    pub score: f32,
    pub label: Label,
    pub route: Route,
}

/// Bytes in, label out: decode, pick a model, score, threshold.
#[derive(Debug)]
pub struct DetectionPipeline {
    selector: PredictionSelector,
}

impl DetectionPipeline {
    pub fn new(selector: PredictionSelector) -> Self {
        Self { selector }
    }

    pub fn from_models(primary: Option<LoadedModel>, secondary: Option<LoadedModel>) -> Self {
        Self::new(PredictionSelector::new(primary, secondary))
    }

    pub fn analyze(&self, bytes: &[u8]) -> Result<PredictionResult, PipelineError> {
        let image = decode_image(bytes)?;
        log::debug!("Decoded upload as {}x{} image", image.width(), image.height());

        let scored = self.selector.predict(&image)?;
        Ok(PredictionResult {
            score: scored.score,
            label: classify(scored.score),
            route: scored.route,
        })
    }

    pub fn health(&self) -> HealthResponse {
        let status = |model: &LoadedModel| ModelStatus {
            input_size: model.input_size(),
            backend: model.backend().to_string(),
        };
        let active_route = self.selector.route();
        HealthResponse {
            status: if active_route.is_some() { "ok" } else { "unavailable" }.to_string(),
            active_route,
            primary: self.selector.primary().map(status),
            secondary: self.selector.secondary().map(status),
        }
    }
}
