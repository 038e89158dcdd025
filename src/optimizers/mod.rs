mod gd;
mod optimizer;

pub use gd::GradientDescent;
pub use optimizer::{Hyper, Optimizer};
