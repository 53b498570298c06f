use std::path::Path;

use tract_onnx::prelude::*;

use crate::error::{ClassifierError, Result};

pub type TractSimplePlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Loads an ONNX classifier and pins its single input to `f32` of `input_shape`.
pub fn load_model(path: &Path, input_shape: &[usize]) -> Result<TractSimplePlan> {
    if !path.exists() {
        return Err(ClassifierError::ModelNotFound(path.to_path_buf()));
    }
    let model_load = |source: TractError| ClassifierError::ModelLoad {
        path: path.to_path_buf(),
        source,
    };

    let input_shape: TVec<usize> = input_shape.iter().copied().collect();
    let model = tract_onnx::onnx()
        .model_for_path(path)
        .map_err(model_load)?
        .with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), input_shape))
        .map_err(model_load)?
        .into_optimized()
        .map_err(model_load)?
        .into_runnable()
        .map_err(model_load)?;

    tracing::info!(path = %path.display(), "loaded classifier model");
    Ok(model)
}

/// Runs one forward pass and returns the first output flattened.
pub fn run_model(model: &TractSimplePlan, input: Tensor) -> Result<Vec<f32>> {
    let outputs = model
        .run(tvec!(input.into_tvalue()))
        .map_err(ClassifierError::Inference)?;
    let output = outputs.first().ok_or(ClassifierError::EmptyOutput)?;
    let probabilities: Vec<f32> = output
        .to_array_view::<f32>()
        .map_err(ClassifierError::Inference)?
        .iter()
        .cloned()
        .collect();
    Ok(probabilities)
}

/// A plan that returns its `f32` input unchanged, so tests can feed known
/// scores through the same run path as a real model.
#[cfg(test)]
pub(crate) fn identity_plan(shape: &[usize]) -> TractResult<TractSimplePlan> {
    let mut model = TypedModel::default();
    let source = model.add_source("input", f32::fact(shape.to_vec()))?;
    model.set_output_outlets(&[source])?;
    model.into_runnable()
}
