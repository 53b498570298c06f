pub mod classifier;
pub mod config;
pub mod error;
pub mod footprint;
pub mod icons;
pub mod labels;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod server;
pub mod transformer;

pub use classifier::WasteClassifier;
pub use error::{ClassifierError, Result};
pub use labels::Prediction;
pub use pipeline::TransformationPipeline;
pub use report::ClassificationReport;

use image::imageops::FilterType;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tract_onnx::prelude::{tract_ndarray::Array4, Tensor};

pub const MODEL_PATH: &str = "model.onnx";
pub const LABELS_PATH: &str = "labels.txt";
pub const ICON_DIR: &str = "sustainable_dev_goal";

/// Side length of the square input the classifier expects.
pub const INPUT_SIZE: usize = 224;

#[derive(Serialize, Deserialize)]
#[serde(remote = "FilterType")]
enum FilterOption {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub width: usize,
    pub height: usize,
}

impl ImageSize {
    pub fn square(side: usize) -> Self {
        ImageSize {
            width: side,
            height: side,
        }
    }
}

/// Intermediate value flowing between transform steps.
pub enum ImageTransformResult {
    RgbImage(RgbImage),
    Array4(Array4<f32>),
    Tensor(Tensor),
}

impl ImageTransformResult {
    pub fn shape(&self) -> Vec<usize> {
        match self {
            ImageTransformResult::RgbImage(image) => {
                let (width, height) = image.dimensions();
                vec![height as usize, width as usize, 3]
            }
            ImageTransformResult::Array4(array) => array.shape().to_vec(),
            ImageTransformResult::Tensor(tensor) => tensor.shape().to_vec(),
        }
    }
}

impl From<RgbImage> for ImageTransformResult {
    fn from(rgb_image: RgbImage) -> Self {
        ImageTransformResult::RgbImage(rgb_image)
    }
}

impl From<Array4<f32>> for ImageTransformResult {
    fn from(array: Array4<f32>) -> Self {
        ImageTransformResult::Array4(array)
    }
}

impl From<Tensor> for ImageTransformResult {
    fn from(tensor: Tensor) -> Self {
        ImageTransformResult::Tensor(tensor)
    }
}
