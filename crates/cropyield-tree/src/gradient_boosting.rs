use cropyield_core::error::TensorResult;
use cropyield_core::{Float, Tensor, TensorError};
use crate::decision_tree::DecisionTreeRegressor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gradient Boosted Trees for Regression.
///
/// Uses gradient descent in function space by sequentially fitting
/// decision trees to the residuals (negative gradient of the squared loss).
/// With `subsample < 1.0` each stage fits on a seeded random subset of the
/// rows drawn without replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct GradientBoostingRegressor<T: Float> {
    pub n_estimators: usize,
    pub learning_rate: T,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub subsample: f64,
    pub seed: Option<u64>,
    trees: Vec<DecisionTreeRegressor<T>>,
    initial_prediction: T,
}

impl<T: Float> GradientBoostingRegressor<T> {
    pub fn new(
        n_estimators: usize,
        learning_rate: T,
        max_depth: usize,
        min_samples_split: usize,
        subsample: f64,
    ) -> Self {
        GradientBoostingRegressor {
            n_estimators,
            learning_rate,
            max_depth: if max_depth == 0 { 3 } else { max_depth },
            min_samples_split: if min_samples_split == 0 { 2 } else { min_samples_split },
            min_samples_leaf: 1,
            subsample: if subsample > 0.0 && subsample <= 1.0 { subsample } else { 1.0 },
            seed: Some(42),
            trees: Vec::new(),
            initial_prediction: T::ZERO,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<()> {
        let n = x.shape().dim(0)?;
        if n == 0 {
            return Err(TensorError::EmptyTensor);
        }
        if y.numel() != n {
            return Err(TensorError::ShapeMismatch {
                expected: vec![n],
                got: y.shape_vec(),
            });
        }
        if self.n_estimators == 0 {
            return Err(TensorError::InvalidOperation(
                "gradient boosting needs at least one estimator".into(),
            ));
        }

        // Initial prediction: mean of y
        let y_sum: T = y.data().iter().copied().sum();
        self.initial_prediction = y_sum / T::from_usize(n);

        let mut predictions = vec![self.initial_prediction; n];
        let mut rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let n_inbag = ((n as f64 * self.subsample).floor() as usize).clamp(1, n);

        self.trees.clear();

        for _ in 0..self.n_estimators {
            let residuals: Vec<T> = y.data().iter().zip(predictions.iter())
                .map(|(&yi, &pi)| yi - pi)
                .collect();
            let residual_tensor = Tensor::new(residuals, vec![n])?;

            let mut tree =
                DecisionTreeRegressor::new(self.max_depth, self.min_samples_split, self.min_samples_leaf);
            if n_inbag < n {
                let rows = rand::seq::index::sample(&mut rng, n, n_inbag).into_vec();
                tree.fit(&x.select_rows(&rows)?, &residual_tensor.select_rows(&rows)?)?;
            } else {
                tree.fit(x, &residual_tensor)?;
            }

            let tree_pred = tree.predict(x)?;
            for (p, &t) in predictions.iter_mut().zip(tree_pred.data()) {
                *p += self.learning_rate * t;
            }

            self.trees.push(tree);
        }

        debug!(stages = self.trees.len(), rows = n, n_inbag, "fitted gradient boosting");
        Ok(())
    }

    pub fn predict(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        if self.trees.is_empty() {
            return Err(TensorError::NotFitted("GradientBoostingRegressor"));
        }
        let n = x.shape().dim(0)?;
        let mut predictions = vec![self.initial_prediction; n];

        for tree in &self.trees {
            let tree_pred = tree.predict(x)?;
            for (p, &t) in predictions.iter_mut().zip(tree_pred.data()) {
                *p += self.learning_rate * t;
            }
        }

        Tensor::new(predictions, vec![n])
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear() -> (Tensor<f64>, Tensor<f64>) {
        let x: Tensor<f64> = Tensor::from_vec2d(&[
            vec![1.0], vec![2.0], vec![3.0], vec![4.0], vec![5.0],
            vec![6.0], vec![7.0], vec![8.0], vec![9.0], vec![10.0],
        ]).unwrap();
        let y: Tensor<f64> = Tensor::from_slice(&[3.0, 5.0, 7.0, 9.0, 11.0, 13.0, 15.0, 17.0, 19.0, 21.0]);
        (x, y)
    }

    #[test]
    fn test_gradient_boosting_regressor() {
        let (x, y) = linear();
        let mut model = GradientBoostingRegressor::new(50, 0.1, 3, 2, 1.0);
        model.fit(&x, &y).unwrap();

        let pred = model.predict(&x).unwrap();
        for i in 0..10 {
            assert!((pred.data()[i] - y.data()[i]).abs() < 2.0,
                "prediction {} != expected {} at index {}", pred.data()[i], y.data()[i], i);
        }
        assert_eq!(model.n_trees(), 50);
    }

    #[test]
    fn test_subsample_is_seeded() {
        let (x, y) = linear();
        let mut a = GradientBoostingRegressor::new(20, 0.1, 2, 2, 0.5).with_seed(Some(3));
        let mut b = GradientBoostingRegressor::new(20, 0.1, 2, 2, 0.5).with_seed(Some(3));
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_subsample_out_of_range_means_all_rows() {
        assert_eq!(GradientBoostingRegressor::<f64>::new(5, 0.1, 3, 2, 0.05).subsample, 0.05);
        assert_eq!(GradientBoostingRegressor::<f64>::new(5, 0.1, 3, 2, 0.0).subsample, 1.0);
        assert_eq!(GradientBoostingRegressor::<f64>::new(5, 0.1, 3, 2, 1.5).subsample, 1.0);
    }

    #[test]
    fn test_predict_before_fit() {
        let (x, _) = linear();
        let model = GradientBoostingRegressor::<f64>::new(5, 0.1, 3, 2, 1.0);
        assert!(matches!(model.predict(&x), Err(TensorError::NotFitted(_))));
    }
}
