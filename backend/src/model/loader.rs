use std::path::Path;

use super::onnx::OnnxPredictor;
use super::{LoadedModel, ModelFormat, Predictor};
use crate::config::{ModelConfig, ModelsConfig};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to fetch model from {location}: {source}")]
    Fetch {
        location: String,
        source: reqwest::Error,
    },
    #[error("Failed to read model file {location}: {source}")]
    Read {
        location: String,
        source: std::io::Error,
    },
    #[error("No {0} model is configured")]
    NotConfigured(&'static str),
    #[error("Cannot infer model format from {0}; set `format` explicitly")]
    UnknownFormat(String),
    #[error("Failed to deserialize model from {location}: {message}")]
    Deserialize { location: String, message: String },
    #[error("Model {location} needs the `{feature}` runtime, which this build does not include")]
    RuntimeDisabled {
        location: String,
        feature: &'static str,
    },
}

/// Pulls serialized artifacts from disk or HTTP and turns them into predictors.
#[derive(Clone, Default)]
pub struct ModelLoader {
    client: reqwest::Client,
}

impl ModelLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the primary and secondary models. Both are required; any failure aborts the load.
    pub async fn load_pair(
        &self,
        models: &ModelsConfig,
    ) -> Result<(LoadedModel, LoadedModel), LoadError> {
        let primary = models
            .primary
            .as_ref()
            .ok_or(LoadError::NotConfigured("primary"))?;
        let secondary = models
            .secondary
            .as_ref()
            .ok_or(LoadError::NotConfigured("secondary"))?;

        let primary = self.load("primary", primary).await?;
        let secondary = self.load("secondary", secondary).await?;
        Ok((primary, secondary))
    }

    pub async fn load(&self, name: &str, config: &ModelConfig) -> Result<LoadedModel, LoadError> {
        let format = config
            .format
            .or_else(|| ModelFormat::detect(&config.location))
            .ok_or_else(|| LoadError::UnknownFormat(config.location.clone()))?;

        log::info!(
            "Loading {} model ({:?}, {}x{}) from {}",
            name,
            format,
            config.input_size,
            config.input_size,
            config.location
        );

        let bytes = self.fetch(&config.location).await?;
        log::debug!("Fetched {} bytes for {} model", bytes.len(), name);

        let predictor = materialize(format, &bytes, config)?;
        log::info!(
            "{} model ready on the {} runtime",
            name,
            predictor.backend()
        );

        Ok(LoadedModel::new(
            name,
            config.location.clone(),
            config.input_size,
            predictor,
        ))
    }

    async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        if is_remote(location) {
            let fetch_err = |source| LoadError::Fetch {
                location: location.to_string(),
                source,
            };
            let response = self
                .client
                .get(location)
                .send()
                .await
                .and_then(|resp| resp.error_for_status())
                .map_err(fetch_err)?;
            let body = response.bytes().await.map_err(fetch_err)?;
            Ok(body.to_vec())
        } else {
            std::fs::read(Path::new(location)).map_err(|source| LoadError::Read {
                location: location.to_string(),
                source,
            })
        }
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn materialize(
    format: ModelFormat,
    bytes: &[u8],
    config: &ModelConfig,
) -> Result<Box<dyn Predictor>, LoadError> {
    let deserialize_err = |message: String| LoadError::Deserialize {
        location: config.location.clone(),
        message,
    };

    match format {
        ModelFormat::Onnx => OnnxPredictor::from_bytes(bytes, config.input_size)
            .map(|p| Box::new(p) as Box<dyn Predictor>)
            .map_err(|e| deserialize_err(format!("{:?}", e))),
        #[cfg(feature = "torch")]
        ModelFormat::TorchScript => super::torch::TorchPredictor::from_bytes(bytes)
            .map(|p| Box::new(p) as Box<dyn Predictor>)
            .map_err(|e| deserialize_err(e.to_string())),
        #[cfg(not(feature = "torch"))]
        ModelFormat::TorchScript => Err(LoadError::RuntimeDisabled {
            location: config.location.clone(),
            feature: "torch",
        }),
    }
}

/// Runtimes compiled into this binary, for the startup banner.
pub fn available_runtimes() -> Vec<&'static str> {
    let mut runtimes = vec!["onnx (tract)"];
    if cfg!(feature = "torch") {
        runtimes.push("torchscript (libtorch)");
    }
    runtimes
}
