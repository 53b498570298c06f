use std::env;
use std::path::PathBuf;

use crate::classifier::{ModelLoading, WasteClassifier};
use crate::{ImageSize, TransformationPipeline, Result};
use crate::{ICON_DIR, INPUT_SIZE, LABELS_PATH, MODEL_PATH};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub icon_dir: PathBuf,
    pub input_size: usize,
    pub model_cache: bool,
    pub preprocess_config: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            model_path: PathBuf::from(MODEL_PATH),
            labels_path: PathBuf::from(LABELS_PATH),
            icon_dir: PathBuf::from(ICON_DIR),
            input_size: INPUT_SIZE,
            model_cache: false,
            preprocess_config: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let input_size = match lookup("INPUT_SIZE") {
            Some(v) => v
                .parse::<usize>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or_else(|| ConfigError::InvalidValue(format!("INPUT_SIZE: {}", v)))?,
            None => defaults.input_size,
        };

        Ok(Config {
            port: match lookup("PORT") {
                Some(v) => v
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(format!("PORT: {}", v)))?,
                None => defaults.port,
            },
            model_path: lookup("MODEL_PATH").map(PathBuf::from).unwrap_or(defaults.model_path),
            labels_path: lookup("LABELS_PATH").map(PathBuf::from).unwrap_or(defaults.labels_path),
            icon_dir: lookup("ICON_DIR").map(PathBuf::from).unwrap_or(defaults.icon_dir),
            input_size,
            model_cache: match lookup("MODEL_CACHE").map(|v| v.to_ascii_lowercase()) {
                Some(v) if v == "1" || v == "true" => true,
                Some(v) if v == "0" || v == "false" || v.is_empty() => false,
                Some(v) => return Err(ConfigError::InvalidValue(format!("MODEL_CACHE: {}", v))),
                None => defaults.model_cache,
            },
            preprocess_config: lookup("PREPROCESS_CONFIG").map(PathBuf::from),
            max_upload_bytes: match lookup("MAX_UPLOAD_BYTES") {
                Some(v) => v
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(format!("MAX_UPLOAD_BYTES: {}", v)))?,
                None => defaults.max_upload_bytes,
            },
        })
    }

    pub fn image_size(&self) -> ImageSize {
        ImageSize::square(self.input_size)
    }

    pub fn classifier(&self) -> Result<WasteClassifier> {
        let mut classifier =
            WasteClassifier::new(&self.model_path, &self.labels_path, self.image_size());
        if let Some(path) = &self.preprocess_config {
            classifier = classifier.with_pipeline(TransformationPipeline::from_json_file(path)?);
        }
        if self.model_cache {
            classifier = classifier.with_loading(ModelLoading::Shared);
        }
        Ok(classifier)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(var) => write!(f, "Invalid value for: {}", var),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.model_path, PathBuf::from("model.onnx"));
        assert_eq!(config.labels_path, PathBuf::from("labels.txt"));
        assert_eq!(config.image_size(), ImageSize::square(224));
        assert!(!config.model_cache);
    }

    #[test]
    fn values_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("MODEL_PATH", "/models/waste.onnx"),
            ("INPUT_SIZE", "160"),
            ("MODEL_CACHE", "TRUE"),
            ("MAX_UPLOAD_BYTES", "1048576"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.model_path, PathBuf::from("/models/waste.onnx"));
        assert_eq!(config.input_size, 160);
        assert!(config.model_cache);
        assert_eq!(config.max_upload_bytes, 1024 * 1024);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Config::from_lookup(lookup(&[("PORT", "http")])).is_err());
        assert!(Config::from_lookup(lookup(&[("INPUT_SIZE", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("MODEL_CACHE", "sometimes")])).is_err());
        assert!(Config::from_lookup(lookup(&[("MAX_UPLOAD_BYTES", "20MB")])).is_err());
    }

    #[test]
    fn missing_preprocess_file_fails_classifier_setup() {
        let config = Config::from_lookup(lookup(&[("PREPROCESS_CONFIG", "no/such/steps.json")])).unwrap();
        assert!(config.classifier().is_err());
    }
}
