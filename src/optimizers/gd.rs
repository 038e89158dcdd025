use log::{debug, info};

use super::{Hyper, Optimizer};
use crate::data::TrainingExample;
use crate::error::Result;
use crate::f::squared_error;
use crate::nn::Network;

/// Plain per-example gradient descent over a fixed number of epochs.
///
/// Every epoch visits the examples in the order given, one `Network::train`
/// step each. There is no shuffling, no learning-rate decay and no early
/// stopping: the amount of work is exactly `epochs × examples.len()` steps.
pub struct GradientDescent<'a> {
    network: &'a mut Network,
    hyper: Hyper,
    pub losses: Vec<f64>,
}

impl<'a> GradientDescent<'a> {
    pub fn new(network: &'a mut Network) -> Self {
        GradientDescent {
            network,
            hyper: Hyper::new(),
            losses: vec![],
        }
    }

    pub fn set_learning_rate(&mut self, rate: f64) -> &mut Self {
        self.hyper.learning_rate = rate;
        self
    }

    pub fn set_epochs(&mut self, epochs: usize) -> &mut Self {
        self.hyper.epochs = epochs;
        self
    }

    pub fn hyper(&self) -> &Hyper {
        &self.hyper
    }
}

impl Optimizer for GradientDescent<'_> {
    fn override_hyper(&mut self, hyper: Hyper) -> &mut Self {
        self.hyper = hyper;
        self
    }

    /// Runs all epochs. `losses` gains one entry per epoch: the mean squared
    /// error of each example's output as seen by its own training step,
    /// before that step's update.
    fn train(&mut self, examples: &[TrainingExample]) -> Result<&mut Self> {
        self.hyper.validate()?;
        self.network.check_examples(examples)?;

        for epoch in 0..self.hyper.epochs {
            let mut total_loss = 0.;

            for example in examples.iter() {
                self.network
                    .train(example.input(), example.target(), self.hyper.learning_rate)?;
                total_loss += squared_error(self.network.output()?, example.target());
            }

            let avg_loss = match examples.len() {
                0 => 0.,
                n => total_loss / n as f64,
            };
            self.losses.push(avg_loss);

            debug!("({}/{}) Loss = {}", epoch + 1, self.hyper.epochs, avg_loss);
        }

        info!(
            "trained {} epochs over {} examples, final loss {}",
            self.hyper.epochs,
            examples.len(),
            self.losses.last().copied().unwrap_or(0.)
        );

        Ok(self)
    }
}
