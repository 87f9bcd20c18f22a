use crate::config::TrainConfig;
use crate::error::TrainError;
use crate::selection::train_and_select;
use cropyield_core::FeatureSchema;
use cropyield_data::{build_training_data, detect_column_types, sample_rows, Dataset};
use cropyield_io::{save_artifact, PipelineArtifact};
use cropyield_metrics::RegressionReport;
use cropyield_pipeline::{ModelKind, Pipeline};
use cropyield_preprocessing::train_test_split;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Held-out scores of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateReport {
    pub kind: ModelKind,
    pub evaluation: RegressionReport,
}

/// Summary of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub dataset_path: Option<PathBuf>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub total_rows: usize,
    pub usable_rows: usize,
    pub sampled_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub candidates: Vec<CandidateReport>,
    pub selected: ModelKind,
    pub artifact_path: Option<PathBuf>,
}

impl TrainingReport {
    pub fn selected_evaluation(&self) -> Option<&RegressionReport> {
        self.candidates
            .iter()
            .find(|c| c.kind == self.selected)
            .map(|c| &c.evaluation)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// The selected artifact, still in memory, and the run summary.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: PipelineArtifact,
    pub report: TrainingReport,
}

/// Training job driven by a validated [`TrainConfig`].
pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Result<Self, TrainError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Load `csv_path`, train, and persist only the selected pipeline to
    /// `output_model_path`.
    pub fn run(&self) -> Result<TrainingReport, TrainError> {
        let path = &self.config.csv_path;
        info!(path = %path.display(), "loading dataset");
        let dataset = Dataset::from_csv(path)?;

        let TrainingOutcome { artifact, mut report } = self.train(&dataset)?;
        report.dataset_path = Some(path.clone());

        save_artifact(&artifact, &self.config.output_model_path)?;
        report.artifact_path = Some(self.config.output_model_path.clone());
        info!(
            kind = %report.selected,
            path = %self.config.output_model_path.display(),
            "training complete"
        );
        Ok(report)
    }

    /// Train on an already loaded dataset without touching the filesystem.
    ///
    /// Every configuration and data check happens before the first fit.
    pub fn train(&self, dataset: &Dataset) -> Result<TrainingOutcome, TrainError> {
        let cfg = &self.config;
        info!(rows = dataset.len(), columns = dataset.n_columns(), "dataset shape");

        let detected = detect_column_types(dataset, &cfg.target_column)?;
        info!(numeric = ?detected.numeric(), categorical = ?detected.categorical(), "detected columns");

        let schema = if cfg.enforce_schema {
            let canonical = FeatureSchema::crop_yield();
            canonical
                .ensure_same_columns(&detected)
                .map_err(TrainError::SchemaMismatch)?;
            canonical
        } else {
            detected
        };

        let usable = build_training_data(dataset, &schema, &cfg.target_column)?;
        let usable_rows = usable.n_rows();
        info!(usable_rows, dropped = dataset.len() - usable_rows, "filtered rows by target");

        let data = sample_rows(&usable, cfg.sample_fraction, cfg.random_state)?;
        let sampled_rows = data.n_rows();
        if sampled_rows < 2 {
            return Err(TrainError::TooFewRows(sampled_rows));
        }

        let (x_train, x_test, y_train, y_test) = train_test_split(
            &data.features,
            &data.target,
            cfg.test_ratio,
            Some(cfg.random_state),
        )?;
        info!(train = x_train.n_rows(), test = x_test.n_rows(), "split rows");

        let candidates = vec![
            Pipeline::new(cfg.random_forest.build(cfg.random_state)),
            Pipeline::new(cfg.gradient_boosting.build(cfg.random_state)),
        ];
        let selection = train_and_select(candidates, &x_train, &y_train, &x_test, &y_test)?;

        let candidate_reports: Vec<CandidateReport> = selection
            .candidates
            .iter()
            .map(|c| CandidateReport {
                kind: c.pipeline.kind(),
                evaluation: c.evaluation,
            })
            .collect();
        let chosen = selection.into_selected();
        debug!(kind = %chosen.pipeline.kind(), "building artifact");

        let report = TrainingReport {
            dataset_path: None,
            numeric_columns: schema.numeric().to_vec(),
            categorical_columns: schema.categorical().to_vec(),
            total_rows: dataset.len(),
            usable_rows,
            sampled_rows,
            train_rows: x_train.n_rows(),
            test_rows: x_test.n_rows(),
            candidates: candidate_reports,
            selected: chosen.pipeline.kind(),
            artifact_path: None,
        };
        let artifact = PipelineArtifact::new(chosen.pipeline, schema, cfg.target_column.clone(), chosen.evaluation);
        Ok(TrainingOutcome { artifact, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> TrainConfig {
        let mut config = TrainConfig::default();
        config.enforce_schema = false;
        config.random_forest.n_estimators = 5;
        config.gradient_boosting.n_estimators = 10;
        config
    }

    fn toy_dataset() -> Dataset {
        let rows: Vec<Vec<String>> = (0..20)
            .map(|i| {
                let crop = if i % 2 == 0 { "Rice" } else { "Wheat" };
                vec![i.to_string(), crop.to_string(), (i * 3).to_string()]
            })
            .collect();
        let rows: Vec<Vec<&str>> = rows.iter().map(|r| r.iter().map(String::as_str).collect()).collect();
        Dataset::from_raw_rows(&["Rainfall", "Crop", "Yield"], &rows)
    }

    #[test]
    fn test_train_in_memory() {
        let trainer = Trainer::new(small_config()).unwrap();
        let outcome = trainer.train(&toy_dataset()).unwrap();

        let report = &outcome.report;
        assert_eq!(report.numeric_columns, vec!["Rainfall".to_string()]);
        assert_eq!(report.categorical_columns, vec!["Crop".to_string()]);
        assert_eq!(report.usable_rows, 20);
        assert_eq!(report.test_rows, 4);
        assert_eq!(report.train_rows, 16);
        assert_eq!(report.candidates.len(), 2);
        assert_eq!(report.candidates[0].kind, ModelKind::RandomForest);
        assert_eq!(outcome.artifact.model_kind, report.selected);
        assert!(report.selected_evaluation().is_some());
    }

    #[test]
    fn test_schema_enforced() {
        let mut config = small_config();
        config.enforce_schema = true;
        let trainer = Trainer::new(config).unwrap();
        assert!(matches!(
            trainer.train(&toy_dataset()),
            Err(TrainError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_too_few_rows() {
        let ds = Dataset::from_raw_rows(&["Rainfall", "Yield"], &[vec!["1", "2"], vec!["3", "NA"]]);
        let trainer = Trainer::new(small_config()).unwrap();
        assert!(matches!(trainer.train(&ds), Err(TrainError::TooFewRows(1))));
    }

    #[test]
    fn test_missing_target() {
        let ds = Dataset::from_raw_rows(&["Rainfall"], &[vec!["1"]]);
        let trainer = Trainer::new(small_config()).unwrap();
        assert!(matches!(trainer.train(&ds), Err(TrainError::MissingTarget { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small_config();
        config.test_ratio = 0.0;
        assert!(matches!(Trainer::new(config), Err(TrainError::InvalidConfig(_))));
    }
}
