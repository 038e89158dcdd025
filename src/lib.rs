//! A small feed-forward network trainer.
//!
//! Build a [`Network`] output layer first, train it with per-example
//! backpropagation, then read predictions back:
//!
//! ```
//! use lamina::{Activations, Network, TrainingExample};
//!
//! let mut net = Network::new();
//! net.add_layer(3, 1, Activations::Sigmoid)?
//!     .add_layer(2, 3, Activations::Sigmoid)?;
//!
//! let data = vec![
//!     TrainingExample::new(vec![0., 0.], vec![0.]),
//!     TrainingExample::new(vec![0., 1.], vec![1.]),
//! ];
//! net.train_all(&data, 10, 0.1)?;
//! let y = net.predict(data[1].input())?;
//! assert_eq!(y.len(), 1);
//! # Ok::<(), lamina::LaminaError>(())
//! ```

mod activation;
pub mod data;
mod error;
pub mod f;
pub mod layers;
pub mod nn;
pub mod optimizers;

pub use activation::{Activation, Activations};
pub use data::{examples_from, Dataset, TrainingExample};
pub use error::{LaminaError, Result};
pub use layers::Dense;
pub use nn::Network;
pub use optimizers::{GradientDescent, Hyper, Optimizer};
