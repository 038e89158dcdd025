use thiserror::Error;

/// Errors raised when a caller breaks the trainer's contract.
///
/// None of these are recovered internally: the offending call returns before
/// any weight is touched.
#[derive(Error, Debug)]
pub enum LaminaError {
    #[error(
        "shape mismatch for {}{}: expected {}, got {}",
        .what,
        fmt_layer(.layer),
        .expected,
        .got
    )]
    ShapeMismatch {
        what: &'static str,
        layer: Option<usize>,
        expected: usize,
        got: usize,
    },

    #[error("unknown activation kind: {0:?}")]
    UnknownActivation(String),

    #[error("network has no layers")]
    EmptyNetwork,

    #[error("no forward pass has been run")]
    NoForwardPass,

    #[error("dataset has no examples")]
    EmptyDataset,

    #[error("invalid hyperparameter: {0}")]
    InvalidHyper(&'static str),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

fn fmt_layer(layer: &Option<usize>) -> String {
    match layer {
        Some(l) => format!(" in layer {}", l),
        None => String::new(),
    }
}

impl LaminaError {
    pub(crate) fn shape(what: &'static str, expected: usize, got: usize) -> LaminaError {
        LaminaError::ShapeMismatch {
            what,
            layer: None,
            expected,
            got,
        }
    }

    /// Tags a shape error with the index of the layer it came from.
    pub(crate) fn at_layer(self, index: usize) -> LaminaError {
        match self {
            LaminaError::ShapeMismatch {
                what,
                expected,
                got,
                ..
            } => LaminaError::ShapeMismatch {
                what,
                layer: Some(index),
                expected,
                got,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, LaminaError>;
