pub mod tensor;
pub mod shape;
pub mod dtype;
pub mod error;
pub mod value;
pub mod schema;
pub mod frame;

pub use tensor::Tensor;
pub use shape::Shape;
pub use dtype::Float;
pub use error::{SchemaError, TensorError, TensorResult};
pub use value::{format_number, FieldValue, MISSING_SENTINELS};
pub use schema::{ColumnKind, FeatureSchema, CATEGORICAL_FEATURES, NUMERIC_FEATURES, TARGET_COLUMN};
pub use frame::{FeatureFrame, FeatureFrameBuilder};
