use crate::error::InferenceError;
use crate::features::{build_feature_frame, FeatureMap};
use cropyield_core::FeatureSchema;
use cropyield_io::{load_artifact, PipelineArtifact};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of one prediction call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Prediction {
    /// Predicted yield, rounded to two decimals.
    Yield(f64),
    /// No model, or the model could not score this row.
    Unavailable,
}

impl Prediction {
    pub fn value(&self) -> Option<f64> {
        match self {
            Prediction::Yield(v) => Some(*v),
            Prediction::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Prediction::Yield(_))
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Yield(v) => write!(f, "{:.2}", v),
            Prediction::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// Whether a model was loaded. Fixed when the predictor is built.
#[derive(Debug, Clone)]
pub enum ModelState {
    Ready(Arc<PipelineArtifact>),
    Unavailable { reason: String },
}

/// Read-only prediction context, loaded once and shared across callers.
#[derive(Debug, Clone)]
pub struct YieldPredictor {
    state: ModelState,
}

impl YieldPredictor {
    /// Load the artifact at `path`, failing if it is absent, corrupt or was
    /// trained on another schema.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InferenceError> {
        let artifact = load_artifact(path.as_ref())?;
        Self::from_artifact(artifact)
    }

    /// Like [`load`](Self::load), but a failure yields a predictor that
    /// answers every call with [`Prediction::Unavailable`].
    pub fn load_or_unavailable<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(predictor) => predictor,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "model unavailable, predictions disabled");
                Self::unavailable(e.to_string())
            }
        }
    }

    pub fn from_artifact(artifact: PipelineArtifact) -> Result<Self, InferenceError> {
        FeatureSchema::crop_yield().ensure_matches(&artifact.schema)?;
        info!(
            kind = %artifact.model_kind,
            rmse = artifact.evaluation.rmse,
            "model loaded"
        );
        Ok(YieldPredictor {
            state: ModelState::Ready(Arc::new(artifact)),
        })
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        YieldPredictor {
            state: ModelState::Unavailable { reason: reason.into() },
        }
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, ModelState::Ready(_))
    }

    pub fn artifact(&self) -> Option<&PipelineArtifact> {
        match &self.state {
            ModelState::Ready(artifact) => Some(artifact.as_ref()),
            ModelState::Unavailable { .. } => None,
        }
    }

    /// Predict the yield for one entity. Never fails: a missing model or a
    /// failing call is reported as [`Prediction::Unavailable`].
    pub fn predict(&self, features: &FeatureMap) -> Prediction {
        let artifact = match &self.state {
            ModelState::Ready(artifact) => artifact,
            ModelState::Unavailable { reason } => {
                debug!(%reason, "prediction skipped");
                return Prediction::Unavailable;
            }
        };

        let result = build_feature_frame(&artifact.schema, features).and_then(|frame| artifact.predict(&frame));
        match result {
            Ok(pred) => match pred.data().first().copied() {
                Some(v) if v.is_finite() => Prediction::Yield(round2(v)),
                other => {
                    warn!(value = ?other, "model returned no finite prediction");
                    Prediction::Unavailable
                }
            },
            Err(e) => {
                warn!(error = %e, "prediction failed");
                Prediction::Unavailable
            }
        }
    }
}

fn round2(v: f64) -> f64 {
    let scaled = v * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureValue;
    use cropyield_core::{FeatureFrameBuilder, Tensor, CATEGORICAL_FEATURES, NUMERIC_FEATURES};
    use cropyield_io::save_artifact;
    use cropyield_metrics::RegressionReport;
    use cropyield_pipeline::Pipeline;
    use cropyield_tree::RandomForestRegressor;
    use std::thread;
    use tempfile::tempdir;

    fn trained_artifact() -> PipelineArtifact {
        let mut b = FeatureFrameBuilder::new(NUMERIC_FEATURES.len(), CATEGORICAL_FEATURES.len());
        let mut y = Vec::new();
        for i in 0..30 {
            let f = i as f64;
            let numeric = [40.0 + f, 20.0 + f / 2.0, 15.0, 6.0 + f / 30.0, 500.0 + 20.0 * f, 25.0];
            let crop = if i % 2 == 0 { "Rice" } else { "Wheat" };
            let cats = ["Kolhapur", crop, "Urea", "Black", "Kharif", "July"]
                .iter()
                .map(|s| Some(s.to_string()))
                .collect();
            b.push_row(&numeric, cats).unwrap();
            y.push(10.0 + f / 3.0);
        }
        let x = b.finish().unwrap();
        let y = Tensor::from_slice(&y);

        let mut pipe = Pipeline::new(RandomForestRegressor::<f64>::new(8, 6, 1.0));
        pipe.fit(&x, &y).unwrap();
        let report = RegressionReport::evaluate(&y, &pipe.predict(&x).unwrap()).unwrap();
        PipelineArtifact::new(pipe, FeatureSchema::crop_yield(), "Yield", report)
    }

    /// Forest that splits only on rainfall: low rainfall yields 10, high
    /// rainfall 1000. Leaves worth 1000 are then rewritten to a value whose
    /// sum across trees overflows, so only high-rainfall rows fail.
    fn overflowing_artifact() -> PipelineArtifact {
        let mut b = FeatureFrameBuilder::new(NUMERIC_FEATURES.len(), CATEGORICAL_FEATURES.len());
        let mut y = Vec::new();
        for i in 0..30 {
            let high = i >= 15;
            let rainfall = if high { 1500.0 + i as f64 } else { 100.0 + i as f64 };
            let numeric = [50.0, 25.0, 15.0, 6.5, rainfall, 25.0];
            let cats = ["Kolhapur", "Rice", "Urea", "Black", "Kharif", "July"]
                .iter()
                .map(|s| Some(s.to_string()))
                .collect();
            b.push_row(&numeric, cats).unwrap();
            y.push(if high { 1000.0 } else { 10.0 });
        }
        let x = b.finish().unwrap();
        let y = Tensor::from_slice(&y);
        let mut pipe = Pipeline::new(RandomForestRegressor::<f64>::new(8, 4, 1.0));
        pipe.fit(&x, &y).unwrap();
        let report = RegressionReport::evaluate(&y, &pipe.predict(&x).unwrap()).unwrap();
        let artifact = PipelineArtifact::new(pipe, FeatureSchema::crop_yield(), "Yield", report);

        fn inflate_leaves(v: &mut serde_json::Value) {
            match v {
                serde_json::Value::Object(map) => {
                    if let Some(serde_json::Value::Object(leaf)) = map.get_mut("Leaf") {
                        if let Some(value) = leaf.get_mut("value") {
                            if value.as_f64().map_or(false, |x| x > 500.0) {
                                *value = serde_json::json!(1.7e308);
                            }
                        }
                    }
                    for child in map.values_mut() {
                        inflate_leaves(child);
                    }
                }
                serde_json::Value::Array(items) => items.iter_mut().for_each(inflate_leaves),
                _ => {}
            }
        }
        let mut json = serde_json::to_value(&artifact).unwrap();
        inflate_leaves(&mut json);
        serde_json::from_value(json).unwrap()
    }

    fn request() -> FeatureMap {
        let mut map = FeatureMap::new();
        map.insert("Nitrogen".into(), 55.0.into());
        map.insert("Phosphorus".into(), "27".into());
        map.insert("Potassium".into(), FeatureValue::List(vec![15.0.into()]));
        map.insert("pH".into(), 6.4.into());
        map.insert("Rainfall".into(), 800.0.into());
        map.insert("Temperature".into(), 26.0.into());
        map.insert("District_Name".into(), "Kolhapur".into());
        map.insert("Crop".into(), "Rice".into());
        map
    }

    #[test]
    fn test_predict_is_rounded_and_idempotent() {
        let predictor = YieldPredictor::from_artifact(trained_artifact()).unwrap();
        let first = predictor.predict(&request());
        let second = predictor.predict(&request());

        let v = first.value().expect("model is loaded");
        assert_eq!((v * 100.0).round() / 100.0, v);
        assert_eq!(first, second);
    }

    #[test]
    fn test_failed_call_does_not_disable_later_calls() {
        let predictor = YieldPredictor::from_artifact(overflowing_artifact()).unwrap();
        let mut wet = request();
        wet.insert("Rainfall".into(), 1600.0.into());
        let mut dry = request();
        dry.insert("Rainfall".into(), 110.0.into());

        assert_eq!(predictor.predict(&wet), Prediction::Unavailable);
        assert!(predictor.is_available());
        assert_eq!(predictor.predict(&dry), Prediction::Yield(10.0));
        assert_eq!(predictor.predict(&wet), Prediction::Unavailable);
        assert_eq!(predictor.predict(&dry), Prediction::Yield(10.0));
    }

    #[test]
    fn test_round2_keeps_huge_values_finite() {
        assert_eq!(round2(10.126), 10.13);
        assert_eq!(round2(1.7e308), 1.7e308);
    }

    #[test]
    fn test_missing_ph_still_predicts() {
        let predictor = YieldPredictor::from_artifact(trained_artifact()).unwrap();
        let mut req = request();
        req.remove("pH");
        assert!(predictor.predict(&req).is_available());
    }

    #[test]
    fn test_missing_artifact_is_unavailable() {
        let dir = tempdir().unwrap();
        let predictor = YieldPredictor::load_or_unavailable(dir.path().join("absent.json"));
        assert!(!predictor.is_available());
        assert!(matches!(predictor.state(), ModelState::Unavailable { .. }));
        for _ in 0..3 {
            assert_eq!(predictor.predict(&request()), Prediction::Unavailable);
        }
        assert!(YieldPredictor::load(dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn test_load_from_disk_matches_memory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        let artifact = trained_artifact();
        save_artifact(&artifact, &path).unwrap();

        let in_memory = YieldPredictor::from_artifact(artifact).unwrap();
        let from_disk = YieldPredictor::load(&path).unwrap();
        assert_eq!(in_memory.predict(&request()), from_disk.predict(&request()));
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let mut artifact = trained_artifact();
        artifact.schema = FeatureSchema::new(vec!["Rainfall".into()], vec![]).unwrap();
        assert!(matches!(
            YieldPredictor::from_artifact(artifact),
            Err(InferenceError::Schema(_))
        ));
    }

    #[test]
    fn test_shared_across_threads() {
        let predictor = Arc::new(YieldPredictor::from_artifact(trained_artifact()).unwrap());
        let expected = predictor.predict(&request());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let p = Arc::clone(&predictor);
                thread::spawn(move || p.predict(&request()))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Prediction::Yield(12.5).to_string(), "12.50");
        assert_eq!(Prediction::Unavailable.to_string(), "unavailable");
    }
}
