use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by fitting, encoding and bundle persistence.
#[derive(Debug, Error)]
pub enum FareError {
    /// A numeric column has zero variance, so z-scoring would divide by zero.
    #[error("feature '{feature}' has zero standard deviation in the training data")]
    DegenerateFeature { feature: &'static str },

    #[error("training dataset is empty after dropping rows with missing values")]
    EmptyDataset,

    /// No trained bundle exists at the requested location.
    #[error("no trained model bundle found at {}", path.display())]
    MissingBundle { path: PathBuf },

    #[error("model bundle has {found} weights but its schema encodes {expected} features")]
    DimensionMismatch { expected: usize, found: usize },

    /// Training diverged; the parameters cannot be persisted.
    #[error("model parameters are not finite; refusing to save bundle")]
    NonFiniteParameters,

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize model bundle")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to read tabular data")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, FareError>;
