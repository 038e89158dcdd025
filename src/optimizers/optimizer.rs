use serde::{Deserialize, Serialize};

use crate::data::TrainingExample;
use crate::error::{LaminaError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyper {
    pub epochs: usize,
    pub learning_rate: f64,
}

impl Hyper {
    pub fn new() -> Hyper {
        Hyper {
            epochs: 10,
            learning_rate: 0.1,
        }
    }

    /// Reads hyperparameters from JSON. Missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Hyper> {
        let hyper: Hyper = serde_json::from_str(raw)?;
        hyper.validate()?;
        Ok(hyper)
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(LaminaError::InvalidHyper("epochs must be positive"));
        }
        if self.learning_rate <= 0. || !self.learning_rate.is_finite() {
            return Err(LaminaError::InvalidHyper(
                "learning rate must be a positive finite number",
            ));
        }
        Ok(())
    }
}

impl Default for Hyper {
    fn default() -> Self {
        Hyper::new()
    }
}

pub trait Optimizer {
    fn override_hyper(&mut self, hyper: Hyper) -> &mut Self;
    fn train(&mut self, examples: &[TrainingExample]) -> Result<&mut Self>;
}
