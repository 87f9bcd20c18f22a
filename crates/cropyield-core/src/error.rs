use thiserror::Error;

/// Core error type for tensor, frame and fitted-transform operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TensorError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Index out of bounds: index {index} for axis {axis} with size {size}")]
    IndexOutOfBounds {
        index: usize,
        axis: usize,
        size: usize,
    },

    #[error("Invalid axis: {axis} for tensor with {ndim} dimensions")]
    InvalidAxis { axis: usize, ndim: usize },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("{0} must be fitted before use")]
    NotFitted(&'static str),

    #[error("Non-finite value in {0}")]
    NonFinite(String),

    #[error("Empty tensor")]
    EmptyTensor,
}

pub type TensorResult<T> = Result<T, TensorError>;

/// Errors raised while building or comparing feature schemas.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("column `{0}` appears more than once in the feature schema")]
    DuplicateColumn(String),

    #[error(
        "feature schema mismatch: expected numeric {expected_numeric:?} and categorical \
         {expected_categorical:?}, found numeric {found_numeric:?} and categorical {found_categorical:?}"
    )]
    Mismatch {
        expected_numeric: Vec<String>,
        expected_categorical: Vec<String>,
        found_numeric: Vec<String>,
        found_categorical: Vec<String>,
    },
}
