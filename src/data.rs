use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{LaminaError, Result};

/// One supervised example: an input vector and the output it should produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    input: Array1<f64>,
    target: Array1<f64>,
}

impl TrainingExample {
    pub fn new(input: Vec<f64>, target: Vec<f64>) -> TrainingExample {
        TrainingExample {
            input: Array1::from(input),
            target: Array1::from(target),
        }
    }

    pub fn input(&self) -> ArrayView1<'_, f64> {
        self.input.view()
    }

    pub fn target(&self) -> ArrayView1<'_, f64> {
        self.target.view()
    }
}

/// An ordered training set. Examples are consumed in this order every epoch.
pub type Dataset = Vec<TrainingExample>;

/// Zips parallel input and target lists into a dataset.
pub fn examples_from(inputs: Vec<Vec<f64>>, targets: Vec<Vec<f64>>) -> Result<Dataset> {
    if inputs.len() != targets.len() {
        return Err(LaminaError::shape(
            "targets per input",
            inputs.len(),
            targets.len(),
        ));
    }

    Ok(inputs
        .into_iter()
        .zip(targets)
        .map(|(x, y)| TrainingExample::new(x, y))
        .collect())
}
