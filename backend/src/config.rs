use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::ModelFormat;

pub const DEFAULT_CONFIG_PATH: &str = "config/detector.yaml";
pub const DEFAULT_PRIMARY_INPUT_SIZE: u32 = 224;
pub const DEFAULT_SECONDARY_INPUT_SIZE: u32 = 256;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidOverride { key: &'static str, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_dir: Option<PathBuf>,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            frontend_dir: None,
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub primary: Option<ModelConfig>,
    pub secondary: Option<ModelConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    pub location: String,
    pub input_size: u32,
    #[serde(default)]
    pub format: Option<ModelFormat>,
}

impl ModelConfig {
    pub fn new(location: impl Into<String>, input_size: u32) -> Self {
        Self {
            location: location.into(),
            input_size,
            format: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// Reads the YAML file (when present), applies environment overrides and validates.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("DETECTOR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let mut config = if Path::new(&path).exists() {
            log::info!("Loading configuration from {}", path);
            Self::from_file(&path)?
        } else {
            log::info!("No config file at {}, using defaults", path);
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(config_str: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(config_str)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(location) = lookup("PRIMARY_MODEL_URI") {
            override_location(
                &mut self.models.primary,
                location,
                DEFAULT_PRIMARY_INPUT_SIZE,
            );
        }
        if let Some(location) = lookup("SECONDARY_MODEL_URI") {
            override_location(
                &mut self.models.secondary,
                location,
                DEFAULT_SECONDARY_INPUT_SIZE,
            );
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidOverride {
                key: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(dir) = lookup("FRONTEND_DIR") {
            self.server.frontend_dir = Some(PathBuf::from(dir));
        }
        if let Some(max_bytes) = lookup("MAX_UPLOAD_BYTES") {
            self.upload.max_bytes =
                max_bytes
                    .parse()
                    .map_err(|_| ConfigError::InvalidOverride {
                        key: "MAX_UPLOAD_BYTES",
                        value: max_bytes.clone(),
                    })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, model) in [
            ("primary", &self.models.primary),
            ("secondary", &self.models.secondary),
        ] {
            let Some(model) = model else {
                return Err(ConfigError::Invalid(format!("models.{} is not set", name)));
            };
            if model.location.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "models.{}.location is empty",
                    name
                )));
            }
            if model.input_size == 0 {
                return Err(ConfigError::Invalid(format!(
                    "models.{}.input_size must be greater than zero",
                    name
                )));
            }
        }
        if self.upload.max_bytes == 0 {
            return Err(ConfigError::Invalid(
                "upload.max_bytes must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn override_location(slot: &mut Option<ModelConfig>, location: String, default_size: u32) {
    match slot {
        Some(model) => model.location = location,
        None => *slot = Some(ModelConfig::new(location, default_size)),
    }
}
