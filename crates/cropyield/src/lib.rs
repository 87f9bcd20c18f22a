//! # cropyield
//!
//! Crop-yield regression from a tabular farm dataset, written in pure Rust.
//!
//! ## Modules
//!
//! - **core**: Tensor storage, the `FieldValue` cell type, the shared feature schema and feature frames
//! - **data**: CSV loading, numeric/categorical column detection, target filtering, seeded sampling
//! - **preprocessing**: Median and most-frequent imputers, StandardScaler, OneHotEncoder, ColumnTransformer, train/test split
//! - **tree**: Decision Tree (CART), Random Forest, Gradient Boosting regressors
//! - **metrics**: RMSE, MAE, MSE, R² and a serializable regression report
//! - **pipeline**: Preprocessing + regressor pipeline over mixed feature frames
//! - **io**: Versioned JSON model artifacts
//! - **trainer**: TOML-configured training job with candidate selection by RMSE
//! - **inference**: Single-row prediction with an explicit model-availability state
//! - **advisor**: Multilingual reply templates filled from dataset rows and predictions
//!
//! ## Example
//!
//! ```no_run
//! use cropyield::inference::{FeatureMap, YieldPredictor};
//!
//! let predictor = YieldPredictor::load_or_unavailable("Model_Yield_Predict.json");
//! let mut features = FeatureMap::new();
//! features.insert("Crop".into(), "Rice".into());
//! features.insert("Rainfall".into(), 1200.0.into());
//! println!("{}", predictor.predict(&features));
//! ```

/// Core tensor engine, schema and cell types.
pub use cropyield_core as core;

/// Dataset loading and column classification.
pub use cropyield_data as data;

/// Data preprocessing.
pub use cropyield_preprocessing as preprocessing;

/// Tree-based models.
pub use cropyield_tree as tree;

/// Evaluation metrics.
pub use cropyield_metrics as metrics;

/// Pipeline API.
pub use cropyield_pipeline as pipeline;

/// Model artifact I/O.
pub use cropyield_io as io;

/// Training job.
pub use cropyield_trainer as trainer;

/// Inference adapter.
pub use cropyield_inference as inference;

/// Chat-facing advisor.
pub use cropyield_advisor as advisor;
