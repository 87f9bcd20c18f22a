use crate::model::{ModelKind, Regressor};
use cropyield_core::error::TensorResult;
use cropyield_core::{FeatureFrame, Tensor};
use cropyield_preprocessing::ColumnTransformer;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Trait for unsupervised transformers from a mixed feature frame to a
/// dense design matrix.
pub trait FrameTransformer {
    fn fit(&mut self, x: &FeatureFrame) -> TensorResult<()>;
    fn transform(&self, x: &FeatureFrame) -> TensorResult<Tensor<f64>>;
    fn fit_transform(&mut self, x: &FeatureFrame) -> TensorResult<Tensor<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}

/// Trait for supervised estimators.
pub trait Estimator {
    fn fit(&mut self, x: &Tensor<f64>, y: &Tensor<f64>) -> TensorResult<()>;
    fn predict(&self, x: &Tensor<f64>) -> TensorResult<Tensor<f64>>;
}

impl FrameTransformer for ColumnTransformer {
    fn fit(&mut self, x: &FeatureFrame) -> TensorResult<()> {
        ColumnTransformer::fit(self, x)
    }

    fn transform(&self, x: &FeatureFrame) -> TensorResult<Tensor<f64>> {
        ColumnTransformer::transform(self, x)
    }
}

/// Preprocessing transform plus final regressor, fitted and applied as one
/// unit. The transform only ever sees the frame passed to [`Pipeline::fit`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    preprocessor: ColumnTransformer,
    model: Regressor,
}

impl Pipeline {
    pub fn new(model: impl Into<Regressor>) -> Self {
        Pipeline {
            preprocessor: ColumnTransformer::new(),
            model: model.into(),
        }
    }

    /// Fit the preprocessing transform, then the regressor on its output.
    pub fn fit(&mut self, x: &FeatureFrame, y: &Tensor<f64>) -> TensorResult<()> {
        let design = FrameTransformer::fit_transform(&mut self.preprocessor, x)?;
        debug!(kind = %self.model.kind(), features = design.shape_vec()[1], "fitting regressor");
        Estimator::fit(&mut self.model, &design, y)
    }

    /// Transform with the fitted preprocessing and predict.
    pub fn predict(&self, x: &FeatureFrame) -> TensorResult<Tensor<f64>> {
        let design = FrameTransformer::transform(&self.preprocessor, x)?;
        Estimator::predict(&self.model, &design)
    }

    pub fn kind(&self) -> ModelKind {
        self.model.kind()
    }

    pub fn preprocessor(&self) -> &ColumnTransformer {
        &self.preprocessor
    }

    pub fn model(&self) -> &Regressor {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropyield_core::{FeatureFrameBuilder, TensorError};
    use cropyield_tree::{GradientBoostingRegressor, RandomForestRegressor};

    fn frame() -> (FeatureFrame, Tensor<f64>) {
        let mut b = FeatureFrameBuilder::new(1, 1);
        let mut y = Vec::new();
        for i in 0..12 {
            let crop = if i % 2 == 0 { "Rice" } else { "Wheat" };
            b.push_row(&[i as f64], vec![Some(crop.to_string())]).unwrap();
            y.push(i as f64 * 2.0 + if i % 2 == 0 { 0.0 } else { 5.0 });
        }
        (b.finish().unwrap(), Tensor::from_slice(&y))
    }

    #[test]
    fn test_pipeline_fit_predict() {
        let (x, y) = frame();
        let mut pipe = Pipeline::new(RandomForestRegressor::<f64>::new(10, 6, 1.0));
        pipe.fit(&x, &y).unwrap();

        let pred = pipe.predict(&x).unwrap();
        assert_eq!(pred.numel(), 12);
        assert_eq!(pipe.kind(), ModelKind::RandomForest);
        assert!(pipe.preprocessor().is_fitted());
    }

    #[test]
    fn test_unseen_category_at_predict() {
        let (x, y) = frame();
        let mut pipe = Pipeline::new(GradientBoostingRegressor::<f64>::new(20, 0.1, 3, 2, 1.0));
        pipe.fit(&x, &y).unwrap();

        let mut b = FeatureFrameBuilder::new(1, 1);
        b.push_row(&[f64::NAN], vec![Some("Millet".to_string())]).unwrap();
        let pred = pipe.predict(&b.finish().unwrap()).unwrap();
        assert!(pred.data()[0].is_finite());
    }

    #[test]
    fn test_predict_before_fit() {
        let (x, _) = frame();
        let pipe = Pipeline::new(RandomForestRegressor::<f64>::new(2, 2, 1.0));
        assert_eq!(
            pipe.predict(&x).unwrap_err(),
            TensorError::NotFitted("ColumnTransformer")
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let (x, y) = frame();
        let mut pipe = Pipeline::new(GradientBoostingRegressor::<f64>::new(10, 0.1, 2, 2, 1.0));
        pipe.fit(&x, &y).unwrap();

        let json = serde_json::to_string(&pipe).unwrap();
        let restored: Pipeline = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.predict(&x).unwrap(), pipe.predict(&x).unwrap());
    }
}
