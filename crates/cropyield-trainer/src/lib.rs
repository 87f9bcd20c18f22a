pub mod config;
pub mod error;
pub mod selection;
pub mod trainer;

pub use config::{GradientBoostingConfig, RandomForestConfig, TrainConfig};
pub use error::TrainError;
pub use selection::{select_best, train_and_select, Selection, TrainedCandidate};
pub use trainer::{CandidateReport, Trainer, TrainingOutcome, TrainingReport};
