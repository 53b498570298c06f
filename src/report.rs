use std::time::Duration;

use serde::Serialize;
use serde_with::{serde_as, DurationMilliSecondsWithFrac};

use crate::footprint::footprint_lines;
use crate::icons::{icon_group, IconGroup};
use crate::labels::Prediction;

/// Everything shown for one classified upload.
#[serde_as]
#[derive(Debug, Serialize)]
pub struct ClassificationReport {
    #[serde(flatten)]
    pub prediction: Prediction,
    pub footprint: Vec<&'static str>,
    pub icons: Option<&'static IconGroup>,
    #[serde_as(as = "DurationMilliSecondsWithFrac<f64>")]
    #[serde(rename = "elapsed_ms")]
    pub elapsed: Duration,
}

impl ClassificationReport {
    pub fn new(prediction: Prediction, elapsed: Duration) -> Self {
        let footprint = footprint_lines(&prediction.label);
        let icons = icon_group(&prediction.label);
        ClassificationReport {
            prediction,
            footprint,
            icons,
            elapsed,
        }
    }

    /// Confidence as a percentage with two decimals, e.g. `60.00%`.
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.prediction.confidence * 100.0)
    }
}
