pub mod error;
pub mod features;
pub mod predictor;

pub use error::InferenceError;
pub use features::{build_feature_frame, FeatureMap, FeatureValue};
pub use predictor::{ModelState, Prediction, YieldPredictor};
