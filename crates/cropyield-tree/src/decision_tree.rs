use cropyield_core::error::TensorResult;
use cropyield_core::{Float, Tensor, TensorError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A node in the decision tree. Children are indices into the node arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
enum TreeNode<T: Float> {
    /// Internal node: rows with `x[feature_idx] <= threshold` go left.
    Split {
        feature_idx: usize,
        threshold: T,
        left: usize,
        right: usize,
    },
    Leaf { value: T },
}

/// Decision Tree Regressor using CART (MSE criterion).
///
/// Candidate thresholds are midpoints between consecutive distinct values.
/// Each feature is scanned once in sorted order with running sums, so a
/// split search costs `O(n log n)` per feature. Ties between equally good
/// splits keep the first one found (lowest feature index, lowest threshold).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct DecisionTreeRegressor<T: Float> {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    nodes: Vec<TreeNode<T>>,
    root: usize,
    n_features: usize,
}

struct SplitCandidate<T> {
    feature: usize,
    threshold: T,
    sse: f64,
}

impl<T: Float> DecisionTreeRegressor<T> {
    pub fn new(max_depth: usize, min_samples_split: usize, min_samples_leaf: usize) -> Self {
        DecisionTreeRegressor {
            max_depth,
            min_samples_split: min_samples_split.max(2),
            min_samples_leaf: min_samples_leaf.max(1),
            nodes: Vec::new(),
            root: 0,
            n_features: 0,
        }
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

        let mut nodes = Vec::new();
        let mut indices: Vec<usize> = (0..n).collect();
        let root = self.build_tree(x, y.data(), &mut indices, p, 0, &mut nodes)?;
        self.nodes = nodes;
        self.root = root;
        self.n_features = p;
        Ok(())
    }

    fn build_tree(
        &self,
        x: &Tensor<T>,
        y: &[T],
        indices: &mut [usize],
        n_features: usize,
        depth: usize,
        nodes: &mut Vec<TreeNode<T>>,
    ) -> TensorResult<usize> {
        let leaf_value = Self::mean_value(y, indices);
        let pure = indices.iter().all(|&i| y[i] == y[indices[0]]);
        let stop = depth >= self.max_depth
            || indices.len() < self.min_samples_split
            || indices.len() < 2 * self.min_samples_leaf
            || pure;

        let best = if stop {
            None
        } else {
            self.best_split(x, y, indices, n_features)?
        };

        let Some(split) = best else {
            nodes.push(TreeNode::Leaf { value: leaf_value });
            return Ok(nodes.len() - 1);
        };

        // Partition in place: rows going left first.
        let cols = n_features;
        let data = x.data();
        let mut mid = 0;
        for k in 0..indices.len() {
            if data[indices[k] * cols + split.feature] <= split.threshold {
                indices.swap(k, mid);
                mid += 1;
            }
        }
        let (left_idx, right_idx) = indices.split_at_mut(mid);

        let left = self.build_tree(x, y, left_idx, n_features, depth + 1, nodes)?;
        let right = self.build_tree(x, y, right_idx, n_features, depth + 1, nodes)?;

        nodes.push(TreeNode::Split {
            feature_idx: split.feature,
            threshold: split.threshold,
            left,
            right,
        });
        Ok(nodes.len() - 1)
    }

    /// Lowest total squared error split over all features, if any split
    /// leaves at least `min_samples_leaf` rows on each side.
    fn best_split(
        &self,
        x: &Tensor<T>,
        y: &[T],
        indices: &[usize],
        n_features: usize,
    ) -> TensorResult<Option<SplitCandidate<T>>> {
        let n = indices.len();
        let data = x.data();
        let total_sum: f64 = indices.iter().map(|&i| y[i].to_f64()).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i].to_f64().powi(2)).sum();

        let mut best: Option<SplitCandidate<T>> = None;
        let mut order: Vec<usize> = indices.to_vec();

        for feature in 0..n_features {
            let value = |i: usize| data[i * n_features + feature];
            order.sort_by(|&a, &b| {
                value(a)
                    .to_f64()
                    .partial_cmp(&value(b).to_f64())
                    .unwrap_or(Ordering::Equal)
            });

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 0..n - 1 {
                let yi = y[order[k]].to_f64();
                left_sum += yi;
                left_sq += yi * yi;

                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }
                let here = value(order[k]);
                let next = value(order[k + 1]);
                if !(here < next) {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / n_left as f64)
                    + (right_sq - right_sum * right_sum / n_right as f64);

                if best.as_ref().map_or(true, |b| sse < b.sse) {
                    let mut threshold = (here + next) / T::TWO;
                    // Midpoint can round up to `next` for adjacent floats.
                    if !(threshold < next) {
                        threshold = here;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        sse,
                    });
                }
            }
        }
        Ok(best)
    }

    fn mean_value(y: &[T], indices: &[usize]) -> T {
        if indices.is_empty() {
            return T::ZERO;
        }
        let sum: T = indices.iter().map(|&i| y[i]).sum();
        sum / T::from_usize(indices.len())
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    /// Depth of the fitted tree; a lone leaf has depth 0.
    pub fn depth(&self) -> usize {
        fn walk<T: Float>(nodes: &[TreeNode<T>], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, self.root)
        }
    }

    /// Predict a single row given as a feature slice.
    pub fn predict_row(&self, row: &[T]) -> TensorResult<T> {
        if !self.is_fitted() {
            return Err(TensorError::NotFitted("DecisionTreeRegressor"));
        }
        if row.len() != self.n_features {
            return Err(TensorError::ShapeMismatch {
                expected: vec![self.n_features],
                got: vec![row.len()],
            });
        }
        let mut idx = self.root;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature_idx] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn predict(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        let n = x.shape().dim(0)?;
        let mut preds = Vec::with_capacity(n);
        for i in 0..n {
            preds.push(self.predict_row(x.row_slice(i)?)?);
        }
        Tensor::new(preds, vec![n])
    }
}
