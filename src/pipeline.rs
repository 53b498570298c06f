use std::fs;
use std::path::Path;

use image::imageops::FilterType;
use image::RgbImage;
use tract_onnx::prelude::Tensor;

use crate::error::{ClassifierError, Result};
use crate::transformer::{FitRgbImage, GenericTransform, ImageTransform, Normalization, ToArray, ToTensor};
use crate::{ImageSize, ImageTransformResult};

/// Ordered preprocessing steps turning an RGB image into a model input.
#[derive(Clone, Debug)]
pub struct TransformationPipeline {
    steps: Vec<ImageTransform>,
}

impl TransformationPipeline {
    /// Fit to a square with Lanczos3, then scale pixels to [-1, 1] in a
    /// `[1, H, W, 3]` tensor.
    pub fn new(image_size: ImageSize) -> Self {
        TransformationPipeline {
            steps: vec![
                FitRgbImage {
                    image_size,
                    filter: FilterType::Lanczos3,
                }
                .into(),
                ToArray {}.into(),
                Normalization::symmetric().into(),
                ToTensor {}.into(),
            ],
        }
    }

    pub fn from_steps(steps: Vec<ImageTransform>) -> Self {
        TransformationPipeline { steps }
    }

    /// Reads a JSON array of steps.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ClassifierError::PreprocessRead {
            path: path.to_path_buf(),
            source,
        })?;
        let steps: Vec<ImageTransform> =
            serde_json::from_str(&raw).map_err(|source| ClassifierError::PreprocessParse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(steps = steps.len(), path = %path.display(), "loaded preprocessing steps");
        Ok(Self::from_steps(steps))
    }

    pub fn steps(&self) -> &[ImageTransform] {
        &self.steps
    }

    /// Shape of the tensor produced for `image_size` inputs, i.e. the shape
    /// the model has to accept.
    pub fn output_shape(&self, image_size: ImageSize) -> Result<Vec<usize>> {
        let blank = RgbImage::new(image_size.width as u32, image_size.height as u32);
        Ok(self.transform_image(blank)?.shape().to_vec())
    }

    pub fn transform_image(&self, image: RgbImage) -> Result<Tensor> {
        let mut result = ImageTransformResult::RgbImage(image);

        for step in &self.steps {
            result = step.transform(result).map_err(ClassifierError::Transform)?;
            tracing::trace!(shape = ?result.shape(), "applied preprocessing step");
        }

        let to_tensor = ToTensor {};
        result = to_tensor.transform(result).map_err(ClassifierError::Transform)?;

        match result {
            ImageTransformResult::Tensor(t) => Ok(t),
            _ => Err(ClassifierError::Transform("Should be converted to tensor already")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::io::Write;

    fn gradient(width: u32, height: u32) -> RgbImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 255])
        })
    }

    #[test]
    fn default_pipeline_has_fixed_shape_and_unit_range() {
        let pipeline = TransformationPipeline::new(ImageSize::square(224));
        for (w, h) in [(640, 480), (100, 300), (224, 224), (7, 3)] {
            let tensor = pipeline.transform_image(gradient(w, h)).unwrap();
            assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
            let values = tensor.as_slice::<f32>().unwrap();
            assert!(values.iter().all(|v| (-1.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn default_output_shape_is_channels_last() {
        let pipeline = TransformationPipeline::new(ImageSize::square(224));
        assert_eq!(pipeline.output_shape(ImageSize::square(224)).unwrap(), vec![1, 224, 224, 3]);
    }

    #[test]
    fn solid_white_becomes_all_ones() {
        let pipeline = TransformationPipeline::new(ImageSize::square(8));
        let image = ImageBuffer::from_pixel(16, 12, Rgb([255, 255, 255]));
        let tensor = pipeline.transform_image(image).unwrap();
        let values = tensor.as_slice::<f32>().unwrap();
        assert!(values.iter().all(|v| (*v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn broken_step_list_surfaces_transform_error() {
        let pipeline = TransformationPipeline::from_steps(vec![
            ToArray {}.into(),
            FitRgbImage {
                image_size: ImageSize::square(4),
                filter: FilterType::Nearest,
            }
            .into(),
        ]);
        let err = pipeline.transform_image(gradient(4, 4)).unwrap_err();
        assert!(matches!(err, ClassifierError::Transform(_)));
    }

    #[test]
    fn steps_load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"step": "resize_rgb_image", "image_size": {{"width": 6, "height": 4}}, "filter": "Triangle"}},
               {{"step": "to_array"}},
               {{"step": "transpose", "axes": [0, 3, 1, 2]}}]"#
        )
        .unwrap();
        let pipeline = TransformationPipeline::from_json_file(file.path()).unwrap();
        assert_eq!(pipeline.steps().len(), 3);
        assert_eq!(pipeline.output_shape(ImageSize::square(50)).unwrap(), vec![1, 3, 4, 6]);
        let tensor = pipeline.transform_image(gradient(12, 8)).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 4, 6]);
    }

    #[test]
    fn invalid_json_is_reported_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"step": "unknown"}}]"#).unwrap();
        let err = TransformationPipeline::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ClassifierError::PreprocessParse { .. }));
    }
}
