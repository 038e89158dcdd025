pub mod metrics;
pub mod shape;
pub mod vector;

pub use metrics::*;
pub use shape::*;
