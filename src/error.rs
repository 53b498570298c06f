use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tract_onnx::prelude::TractError;

pub type Result<T, E = ClassifierError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Error loading model: '{}' does not exist", .0.display())]
    ModelNotFound(PathBuf),

    #[error("Error loading model '{}': {source}", .path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: TractError,
    },

    #[error("Labels file not found. Please ensure '{}' exists.", .0.display())]
    LabelsNotFound(PathBuf),

    #[error("An error occurred while loading the labels: {source}")]
    LabelsRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("The labels file contains no labels")]
    EmptyLabels,

    #[error("The model produced an empty output")]
    EmptyOutput,

    #[error("Predicted class {index} has no label ({count} labels loaded)")]
    LabelOutOfRange { index: usize, count: usize },

    #[error("Failed to run model: {0}")]
    Inference(#[source] TractError),

    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Preprocessing failed: {0}")]
    Transform(&'static str),

    #[error("Cannot read preprocessing steps from '{}': {source}", .path.display())]
    PreprocessRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid preprocessing steps in '{}': {source}", .path.display())]
    PreprocessParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ClassifierError {
    /// Errors caused by the uploaded data rather than the deployment.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ClassifierError::Decode(_))
    }

    /// Errors caused by missing or broken model/label assets.
    pub fn is_asset_error(&self) -> bool {
        matches!(
            self,
            ClassifierError::ModelNotFound(_)
                | ClassifierError::ModelLoad { .. }
                | ClassifierError::LabelsNotFound(_)
                | ClassifierError::LabelsRead { .. }
                | ClassifierError::EmptyLabels
        )
    }
}
