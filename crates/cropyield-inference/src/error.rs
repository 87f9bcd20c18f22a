use cropyield_core::SchemaError;
use cropyield_io::ModelIoError;
use thiserror::Error;

/// Errors raised while bringing a predictor up.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("failed to load model artifact: {0}")]
    Artifact(#[from] ModelIoError),

    #[error("model artifact was trained on a different feature schema: {0}")]
    Schema(#[from] SchemaError),
}
