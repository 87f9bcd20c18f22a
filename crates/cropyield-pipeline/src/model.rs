use crate::pipeline::Estimator;
use cropyield_core::error::TensorResult;
use cropyield_core::Tensor;
use cropyield_tree::{GradientBoostingRegressor, RandomForestRegressor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which candidate family a regressor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    RandomForest,
    GradientBoosting,
}

impl ModelKind {
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "RandomForest",
            ModelKind::GradientBoosting => "GradientBoosting",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The closed set of regressors a pipeline can end in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Regressor {
    RandomForest(RandomForestRegressor<f64>),
    GradientBoosting(GradientBoostingRegressor<f64>),
}

impl Regressor {
    pub fn kind(&self) -> ModelKind {
        match self {
            Regressor::RandomForest(_) => ModelKind::RandomForest,
            Regressor::GradientBoosting(_) => ModelKind::GradientBoosting,
        }
    }
}

impl Estimator for RandomForestRegressor<f64> {
    fn fit(&mut self, x: &Tensor<f64>, y: &Tensor<f64>) -> TensorResult<()> {
        RandomForestRegressor::fit(self, x, y)
    }

    fn predict(&self, x: &Tensor<f64>) -> TensorResult<Tensor<f64>> {
        RandomForestRegressor::predict(self, x)
    }
}

impl Estimator for GradientBoostingRegressor<f64> {
    fn fit(&mut self, x: &Tensor<f64>, y: &Tensor<f64>) -> TensorResult<()> {
        GradientBoostingRegressor::fit(self, x, y)
    }

    fn predict(&self, x: &Tensor<f64>) -> TensorResult<Tensor<f64>> {
        GradientBoostingRegressor::predict(self, x)
    }
}

impl Estimator for Regressor {
    fn fit(&mut self, x: &Tensor<f64>, y: &Tensor<f64>) -> TensorResult<()> {
        match self {
            Regressor::RandomForest(m) => Estimator::fit(m, x, y),
            Regressor::GradientBoosting(m) => Estimator::fit(m, x, y),
        }
    }

    fn predict(&self, x: &Tensor<f64>) -> TensorResult<Tensor<f64>> {
        match self {
            Regressor::RandomForest(m) => Estimator::predict(m, x),
            Regressor::GradientBoosting(m) => Estimator::predict(m, x),
        }
    }
}

impl From<RandomForestRegressor<f64>> for Regressor {
    fn from(m: RandomForestRegressor<f64>) -> Self {
        Regressor::RandomForest(m)
    }
}

impl From<GradientBoostingRegressor<f64>> for Regressor {
    fn from(m: GradientBoostingRegressor<f64>) -> Self {
        Regressor::GradientBoosting(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(ModelKind::RandomForest.to_string(), "RandomForest");
        assert_eq!(ModelKind::GradientBoosting.to_string(), "GradientBoosting");

        let r: Regressor = GradientBoostingRegressor::<f64>::new(3, 0.1, 2, 2, 1.0).into();
        assert_eq!(r.kind(), ModelKind::GradientBoosting);
    }
}
