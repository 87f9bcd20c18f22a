use cropyield_core::error::TensorResult;
use cropyield_core::{Float, Tensor, TensorError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decision_tree::DecisionTreeRegressor;

/// Random Forest Regressor: bagged regression trees, each grown on a
/// bootstrap sample and a random subset of the features.
///
/// Every tree gets its own seed drawn from `seed` before fitting starts, so
/// the trees can be grown in parallel and still come out identical across
/// runs and thread counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct RandomForestRegressor<T: Float> {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features_ratio: f64,
    pub seed: Option<u64>,
    trees: Vec<DecisionTreeRegressor<T>>,
    feature_subsets: Vec<Vec<usize>>,
}

impl<T: Float> RandomForestRegressor<T> {
    pub fn new(n_estimators: usize, max_depth: usize, max_features_ratio: f64) -> Self {
        RandomForestRegressor {
            n_estimators,
            max_depth,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features_ratio,
            seed: Some(42),
            trees: Vec::new(),
            feature_subsets: Vec::new(),
        }
    }

    pub fn with_min_samples(mut self, split: usize, leaf: usize) -> Self {
        self.min_samples_split = split;
        self.min_samples_leaf = leaf;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<()> {
        let n = x.shape().dim(0)?;
        let p = x.shape().dim(1)?;
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
                "random forest needs at least one estimator".into(),
            ));
        }
        let max_features = ((p as f64 * self.max_features_ratio).ceil() as usize).max(1).min(p.max(1));

        let mut base_rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let tree_seeds: Vec<u64> = (0..self.n_estimators).map(|_| base_rng.gen()).collect();

        let fitted = tree_seeds
            .par_iter()
            .map(|&seed| self.fit_tree(x, y, n, p, max_features, seed))
            .collect::<TensorResult<Vec<_>>>()?;

        let (trees, subsets): (Vec<_>, Vec<_>) = fitted.into_iter().unzip();
        self.trees = trees;
        self.feature_subsets = subsets;
        debug!(trees = self.trees.len(), max_features, rows = n, "fitted random forest");
        Ok(())
    }

    fn fit_tree(
        &self,
        x: &Tensor<T>,
        y: &Tensor<T>,
        n: usize,
        p: usize,
        max_features: usize,
        seed: u64,
    ) -> TensorResult<(DecisionTreeRegressor<T>, Vec<usize>)> {
        let mut rng = StdRng::seed_from_u64(seed);

        let sample_indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

        let mut feature_indices: Vec<usize> = (0..p).collect();
        feature_indices.shuffle(&mut rng);
        let mut selected_features: Vec<usize> = feature_indices.into_iter().take(max_features).collect();
        selected_features.sort_unstable();

        let width = selected_features.len();
        let mut x_sub_data = Vec::with_capacity(n * width);
        let mut y_sub_data = Vec::with_capacity(n);
        for &i in &sample_indices {
            let row = x.row_slice(i)?;
            x_sub_data.extend(selected_features.iter().map(|&f| row[f]));
            y_sub_data.push(y.data()[i]);
        }
        let x_sub = Tensor::new(x_sub_data, vec![n, width])?;
        let y_sub = Tensor::new(y_sub_data, vec![n])?;

        let mut tree =
            DecisionTreeRegressor::new(self.max_depth, self.min_samples_split, self.min_samples_leaf);
        tree.fit(&x_sub, &y_sub)?;
        Ok((tree, selected_features))
    }

    pub fn predict(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        if self.trees.is_empty() {
            return Err(TensorError::NotFitted("RandomForestRegressor"));
        }
        let n = x.shape().dim(0)?;
        let mut predictions = Vec::with_capacity(n);
        let mut row_data = Vec::new();

        for i in 0..n {
            let row = x.row_slice(i)?;
            let mut sum = T::ZERO;
            for (tree, features) in self.trees.iter().zip(&self.feature_subsets) {
                row_data.clear();
                for &f in features {
                    let v = row.get(f).copied().ok_or(TensorError::IndexOutOfBounds {
                        index: f,
                        axis: 1,
                        size: row.len(),
                    })?;
                    row_data.push(v);
                }
                sum += tree.predict_row(&row_data)?;
            }
            predictions.push(sum / T::from_usize(self.trees.len()));
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

    fn step_data() -> (Tensor<f64>, Tensor<f64>) {
        let x: Tensor<f64> = Tensor::from_vec2d(&[
            vec![0.0, 0.0], vec![0.5, 0.5], vec![1.0, 1.0],
            vec![5.0, 5.0], vec![5.5, 5.5], vec![6.0, 6.0],
        ]).unwrap();
        let y: Tensor<f64> = Tensor::from_slice(&[1.0, 1.0, 1.0, 9.0, 9.0, 9.0]);
        (x, y)
    }

    #[test]
    fn test_random_forest_regressor() {
        let (x, y) = step_data();
        let mut rf = RandomForestRegressor::new(20, 5, 1.0);
        rf.fit(&x, &y).unwrap();
        let pred = rf.predict(&x).unwrap();

        assert_eq!(rf.n_trees(), 20);
        for i in 0..6 {
            assert!((pred.data()[i] - y.data()[i]).abs() < 3.0);
        }
        assert!(pred.data()[0] < pred.data()[5]);
    }

    #[test]
    fn test_seeded_fit_is_reproducible() {
        let (x, y) = step_data();
        let mut a = RandomForestRegressor::new(15, 4, 0.5).with_seed(Some(7));
        let mut b = RandomForestRegressor::new(15, 4, 0.5).with_seed(Some(7));
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_predict_before_fit() {
        let (x, _) = step_data();
        let rf = RandomForestRegressor::<f64>::new(3, 3, 1.0);
        assert_eq!(rf.predict(&x).unwrap_err(), TensorError::NotFitted("RandomForestRegressor"));
    }

    #[test]
    fn test_zero_estimators_rejected() {
        let (x, y) = step_data();
        let mut rf = RandomForestRegressor::new(0, 3, 1.0);
        assert!(rf.fit(&x, &y).is_err());
    }
}
