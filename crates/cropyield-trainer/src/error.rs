use cropyield_core::{SchemaError, TensorError};
use cropyield_data::DataError;
use cropyield_io::ModelIoError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the training job.
///
/// Everything except `Model` and `Artifact` is raised before any model is
/// fitted.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("target column `{target}` not present in dataset headers {headers:?}")]
    MissingTarget { target: String, headers: Vec<String> },

    #[error("no usable rows: every row has a missing or non-numeric target")]
    NoUsableRows,

    #[error("need at least 2 usable rows for a train/test split, got {0}")]
    TooFewRows(usize),

    #[error("detected columns do not match the crop-yield schema: {0}")]
    SchemaMismatch(#[source] SchemaError),

    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no candidate produced a finite RMSE")]
    NoViableCandidate,

    #[error("dataset error: {0}")]
    Data(#[source] DataError),

    #[error("training error: {0}")]
    Model(#[from] TensorError),

    #[error(transparent)]
    Artifact(#[from] ModelIoError),
}

impl From<DataError> for TrainError {
    fn from(e: DataError) -> Self {
        match e {
            DataError::NotFound(path) => TrainError::DatasetNotFound(path),
            DataError::MissingTarget { target, headers } => TrainError::MissingTarget { target, headers },
            DataError::NoUsableRows => TrainError::NoUsableRows,
            DataError::Schema(e) => TrainError::SchemaMismatch(e),
            other => TrainError::Data(other),
        }
    }
}
