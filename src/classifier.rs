use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use once_cell::sync::OnceCell;

use crate::error::Result;
use crate::labels::{load_labels, resolve};
use crate::model::{load_model, run_model, TractSimplePlan};
use crate::report::ClassificationReport;
use crate::{ImageSize, TransformationPipeline};

/// Whether the model is read from disk for every image or kept after the
/// first successful load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelLoading {
    PerRequest,
    Shared,
}

pub struct WasteClassifier {
    pipeline: TransformationPipeline,
    model_path: PathBuf,
    labels_path: PathBuf,
    image_size: ImageSize,
    loading: ModelLoading,
    shared_model: OnceCell<Arc<TractSimplePlan>>,
}

impl WasteClassifier {
    pub fn new(model_path: impl Into<PathBuf>, labels_path: impl Into<PathBuf>, image_size: ImageSize) -> Self {
        WasteClassifier {
            pipeline: TransformationPipeline::new(image_size),
            model_path: model_path.into(),
            labels_path: labels_path.into(),
            image_size,
            loading: ModelLoading::PerRequest,
            shared_model: OnceCell::new(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: TransformationPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_loading(mut self, loading: ModelLoading) -> Self {
        self.loading = loading;
        self
    }

    pub fn labels_path(&self) -> &Path {
        &self.labels_path
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn load(&self) -> Result<TractSimplePlan> {
        let input_shape = self.pipeline.output_shape(self.image_size)?;
        load_model(&self.model_path, &input_shape)
    }

    fn model(&self) -> Result<Arc<TractSimplePlan>> {
        match self.loading {
            ModelLoading::PerRequest => Ok(Arc::new(self.load()?)),
            // a failed load leaves the cell empty, so the next call retries
            ModelLoading::Shared => self.shared_model.get_or_try_init(|| self.load().map(Arc::new)).cloned(),
        }
    }

    /// Classifies one decoded image. Blocking: the model may be read from
    /// disk and inference runs on the calling thread.
    pub fn classify(&self, image: &DynamicImage) -> Result<ClassificationReport> {
        let started = Instant::now();

        let model = self.model()?;
        let labels = load_labels(&self.labels_path)?;

        let input = self.pipeline.transform_image(image.to_rgb8())?;
        let probabilities = run_model(&model, input)?;
        let prediction = resolve(&probabilities, &labels)?;

        tracing::info!(
            label = %prediction.label,
            confidence = prediction.confidence,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "classified image"
        );
        Ok(ClassificationReport::new(prediction, started.elapsed()))
    }

    pub fn classify_bytes(&self, bytes: &[u8]) -> Result<ClassificationReport> {
        let image = image::load_from_memory(bytes)?;
        self.classify(&image)
    }
}
