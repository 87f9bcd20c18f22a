use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelIoError {
    #[error("model artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact {} is not valid: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode model artifact: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("encoded model artifact does not decode (non-finite value?): {0}")]
    NotReloadable(#[source] serde_json::Error),

    #[error("model artifact format version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}
