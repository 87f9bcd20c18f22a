use cropyield_core::{SchemaError, TensorError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("dataset not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("target column `{target}` not present in CSV headers {headers:?}")]
    MissingTarget { target: String, headers: Vec<String> },

    #[error("feature column `{0}` not present in CSV headers")]
    MissingColumn(String),

    #[error("no rows available after filtering missing target")]
    NoUsableRows,

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Frame(#[from] TensorError),
}
