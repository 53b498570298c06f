use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::error::{ClassifierError, Result};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Prediction {
    pub index: usize,
    pub label: String,
    pub confidence: f32,
}

/// One label per line, in class-index order.
pub fn parse_labels(text: &str) -> Vec<String> {
    text.lines().map(|line| line.trim().to_string()).collect()
}

pub fn load_labels(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ClassifierError::LabelsNotFound(path.to_path_buf()),
        _ => ClassifierError::LabelsRead {
            path: path.to_path_buf(),
            source,
        },
    })?;
    Ok(parse_labels(&text))
}

/// Index of the largest value; the first one wins on ties and NaN never wins.
pub fn argmax(values: &[f32]) -> Option<usize> {
    if values.is_empty() {
        return None;
    }
    let mut best_idx = 0usize;
    let mut best_score = f32::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_score {
            best_idx = i;
            best_score = v;
        }
    }
    Some(best_idx)
}

pub fn resolve(probabilities: &[f32], labels: &[String]) -> Result<Prediction> {
    if labels.is_empty() {
        return Err(ClassifierError::EmptyLabels);
    }
    let index = argmax(probabilities).ok_or(ClassifierError::EmptyOutput)?;
    let label = labels.get(index).ok_or(ClassifierError::LabelOutOfRange {
        index,
        count: labels.len(),
    })?;
    Ok(Prediction {
        index,
        label: label.clone(),
        confidence: probabilities[index],
    })
}
