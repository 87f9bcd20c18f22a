use crate::error::TrainError;
use cropyield_core::TARGET_COLUMN;
use cropyield_tree::{GradientBoostingRegressor, RandomForestRegressor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Hyperparameters of the bagged candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomForestConfig {
    pub n_estimators: usize,
    /// Unset grows every tree until its leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features_ratio: f64,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features_ratio: 1.0,
        }
    }
}

impl RandomForestConfig {
    pub fn build(&self, seed: u64) -> RandomForestRegressor<f64> {
        let max_depth = self.max_depth.unwrap_or(usize::MAX);
        RandomForestRegressor::new(self.n_estimators, max_depth, self.max_features_ratio)
            .with_min_samples(self.min_samples_split, self.min_samples_leaf)
            .with_seed(Some(seed))
    }
}

/// Hyperparameters of the boosted candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientBoostingConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub subsample: f64,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 2,
            subsample: 1.0,
        }
    }
}

impl GradientBoostingConfig {
    pub fn build(&self, seed: u64) -> GradientBoostingRegressor<f64> {
        GradientBoostingRegressor::new(
            self.n_estimators,
            self.learning_rate,
            self.max_depth,
            self.min_samples_split,
            self.subsample,
        )
        .with_seed(Some(seed))
    }
}

/// Everything the training job needs. Missing keys in a TOML file take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub csv_path: PathBuf,
    pub output_model_path: PathBuf,
    pub target_column: String,
    /// Fraction of usable rows kept before splitting, in (0, 1].
    pub sample_fraction: f64,
    pub random_state: u64,
    /// Held-out share, in (0, 1).
    pub test_ratio: f64,
    /// Require the detected columns to be exactly the crop-yield schema.
    pub enforce_schema: bool,
    pub random_forest: RandomForestConfig,
    pub gradient_boosting: GradientBoostingConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("combined.csv"),
            output_model_path: PathBuf::from("Model_Yield_Predict.json"),
            target_column: TARGET_COLUMN.to_string(),
            sample_fraction: 1.0,
            random_state: 42,
            test_ratio: 0.2,
            enforce_schema: true,
            random_forest: RandomForestConfig::default(),
            gradient_boosting: GradientBoostingConfig::default(),
        }
    }
}

impl TrainConfig {
    /// Load and validate a TOML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrainError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| TrainError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: TrainConfig = toml::from_str(&content).map_err(|source| TrainError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, TrainError> {
        toml::to_string_pretty(self).map_err(|e| TrainError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), TrainError> {
        let invalid = |msg: String| Err(TrainError::InvalidConfig(msg));

        if self.target_column.trim().is_empty() {
            return invalid("target_column must not be empty".into());
        }
        if !(self.sample_fraction > 0.0 && self.sample_fraction <= 1.0) {
            return invalid(format!("sample_fraction must be in (0, 1], got {}", self.sample_fraction));
        }
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return invalid(format!("test_ratio must be in (0, 1), got {}", self.test_ratio));
        }

        let rf = &self.random_forest;
        if rf.n_estimators == 0 {
            return invalid("random_forest.n_estimators must be positive".into());
        }
        if rf.max_depth == Some(0) {
            return invalid("random_forest.max_depth must be positive".into());
        }
        if rf.min_samples_split < 2 || rf.min_samples_leaf == 0 {
            return invalid("random_forest needs min_samples_split >= 2 and min_samples_leaf >= 1".into());
        }
        if !(rf.max_features_ratio > 0.0 && rf.max_features_ratio <= 1.0) {
            return invalid(format!(
                "random_forest.max_features_ratio must be in (0, 1], got {}",
                rf.max_features_ratio
            ));
        }

        let gb = &self.gradient_boosting;
        if gb.n_estimators == 0 {
            return invalid("gradient_boosting.n_estimators must be positive".into());
        }
        if !(gb.learning_rate > 0.0 && gb.learning_rate.is_finite()) {
            return invalid(format!("gradient_boosting.learning_rate must be > 0, got {}", gb.learning_rate));
        }
        if gb.max_depth == 0 || gb.min_samples_split < 2 {
            return invalid("gradient_boosting needs max_depth >= 1 and min_samples_split >= 2".into());
        }
        if !(gb.subsample > 0.0 && gb.subsample <= 1.0) {
            return invalid(format!("gradient_boosting.subsample must be in (0, 1], got {}", gb.subsample));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = TrainConfig::default();
        assert_eq!(config.csv_path, PathBuf::from("combined.csv"));
        assert_eq!(config.target_column, "Yield");
        assert_eq!(config.random_state, 42);
        assert_eq!(config.random_forest.n_estimators, 200);
        assert_eq!(config.gradient_boosting.n_estimators, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "csv_path = \"data/crops.csv\"").unwrap();
        writeln!(file, "test_ratio = 0.25").unwrap();
        writeln!(file, "[random_forest]").unwrap();
        writeln!(file, "n_estimators = 50").unwrap();
        file.flush().unwrap();

        let config = TrainConfig::from_file(file.path()).unwrap();
        assert_eq!(config.csv_path, PathBuf::from("data/crops.csv"));
        assert_eq!(config.test_ratio, 0.25);
        assert_eq!(config.random_forest.n_estimators, 50);
        assert_eq!(config.random_forest.max_depth, None);
        assert_eq!(config.gradient_boosting, GradientBoostingConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = TrainConfig::default();
        let text = config.to_toml_string().unwrap();
        let parsed: TrainConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validation() {
        let mut config = TrainConfig::default();
        config.test_ratio = 1.0;
        assert!(matches!(config.validate(), Err(TrainError::InvalidConfig(_))));

        let mut config = TrainConfig::default();
        config.sample_fraction = 0.0;
        assert!(config.validate().is_err());

        let mut config = TrainConfig::default();
        config.gradient_boosting.learning_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = TrainConfig::default();
        config.random_forest.n_estimators = 0;
        assert!(config.validate().is_err());

        let mut config = TrainConfig::default();
        config.random_forest.max_depth = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_forest_depth_unbounded_by_default() {
        let model = RandomForestConfig::default().build(1);
        assert_eq!(model.max_depth, usize::MAX);

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[random_forest]").unwrap();
        writeln!(file, "max_depth = 12").unwrap();
        file.flush().unwrap();
        let config = TrainConfig::from_file(file.path()).unwrap();
        assert_eq!(config.random_forest.max_depth, Some(12));
        assert_eq!(config.random_forest.build(1).max_depth, 12);
    }

    #[test]
    fn test_small_subsample_is_kept() {
        let mut config = GradientBoostingConfig::default();
        config.subsample = 0.05;
        assert_eq!(config.build(1).subsample, 0.05);
    }

    #[test]
    fn test_bad_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "test_ratio = \"lots\"").unwrap();
        file.flush().unwrap();
        assert!(matches!(
            TrainConfig::from_file(file.path()),
            Err(TrainError::ConfigParse { .. })
        ));
    }
}
