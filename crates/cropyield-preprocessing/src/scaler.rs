use cropyield_core::error::{TensorError, TensorResult};
use cropyield_core::{Float, Tensor};
use serde::{Deserialize, Serialize};

/// Standardize features by removing the mean and scaling to unit variance.
///
/// Uses the population standard deviation. Constant columns keep a scale of
/// one so they transform to zero instead of dividing by zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct StandardScaler<T: Float> {
    mean: Option<Vec<T>>,
    scale: Option<Vec<T>>,
}

impl<T: Float> StandardScaler<T> {
    pub fn new() -> Self {
        StandardScaler {
            mean: None,
            scale: None,
        }
    }

    /// Compute per-column mean and std from training data (2D: [samples, features]).
    ///
    /// Each column is divided by its largest magnitude before summing, so
    /// finite inputs near `f64::MAX` still give finite statistics. Fails if
    /// any column contains a non-finite value.
    pub fn fit(&mut self, x: &Tensor<T>) -> TensorResult<()> {
        let rows = x.shape().dim(0)?;
        let cols = x.shape().dim(1)?;

        let mut mean = vec![T::ZERO; cols];
        let mut scale = vec![T::ONE; cols];
        if rows > 0 {
            let n = T::from_usize(rows);
            for j in 0..cols {
                let col = x.col(j)?;
                let values = col.data();
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(TensorError::NonFinite(format!(
                        "StandardScaler input column {}",
                        j
                    )));
                }
                let peak = values.iter().fold(T::ZERO, |acc, v| {
                    let a = v.abs();
                    if a > acc { a } else { acc }
                });
                if peak == T::ZERO {
                    continue;
                }

                let m = values.iter().map(|&v| v / peak).sum::<T>() / n;
                let var = values
                    .iter()
                    .map(|&v| {
                        let d = v / peak - m;
                        d * d
                    })
                    .sum::<T>()
                    / n;
                let std = var.sqrt() * peak;

                mean[j] = m * peak;
                scale[j] = if std.abs() < T::EPSILON { T::ONE } else { std };
                if !mean[j].is_finite() || !scale[j].is_finite() {
                    return Err(TensorError::NonFinite(format!(
                        "StandardScaler statistics for column {}",
                        j
                    )));
                }
            }
        }

        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(())
    }

    /// Transform data using fitted mean and std.
    pub fn transform(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        let (mean, scale) = match (&self.mean, &self.scale) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(TensorError::NotFitted("StandardScaler")),
        };
        let rows = x.shape().dim(0)?;
        let cols = x.shape().dim(1)?;
        if cols != mean.len() {
            return Err(TensorError::ShapeMismatch {
                expected: vec![rows, mean.len()],
                got: x.shape_vec(),
            });
        }

        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for (j, &v) in x.row_slice(i)?.iter().enumerate() {
                data.push((v - mean[j]) / scale[j]);
            }
        }
        Tensor::new(data, vec![rows, cols])
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&mut self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        self.fit(x)?;
        self.transform(x)
    }

    pub fn mean(&self) -> Option<&[T]> {
        self.mean.as_deref()
    }

    pub fn scale(&self) -> Option<&[T]> {
        self.scale.as_deref()
    }
}

impl<T: Float> Default for StandardScaler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_standard_scaler() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[
            vec![1.0, 2.0],
            vec![3.0, 4.0],
            vec![5.0, 6.0],
        ]).unwrap();

        let mut scaler = StandardScaler::new();
        let transformed = scaler.fit_transform(&x).unwrap();

        for j in 0..2 {
            let col = transformed.col(j).unwrap();
            assert_abs_diff_eq!(col.mean_all(), 0.0, epsilon = 1e-10);
        }
        // population std of [1, 3, 5]
        assert_abs_diff_eq!(scaler.scale().unwrap()[0], (8.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[vec![7.0], vec![7.0]]).unwrap();
        let mut scaler = StandardScaler::new();
        let out = scaler.fit_transform(&x).unwrap();
        assert_eq!(out.data(), &[0.0, 0.0]);
    }

    #[test]
    fn test_huge_finite_values_keep_finite_statistics() {
        let rows: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![if i < 5 { 1e308 } else { 1.0 }])
            .collect();
        let x = Tensor::from_vec2d(&rows).unwrap();
        let mut scaler = StandardScaler::new();
        let out = scaler.fit_transform(&x).unwrap();

        assert_abs_diff_eq!(scaler.mean().unwrap()[0] / 5e307, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scaler.scale().unwrap()[0] / 5e307, 1.0, epsilon = 1e-12);
        assert!(out.data().iter().all(|v| v.is_finite()));
        assert_abs_diff_eq!(out.data()[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.data()[9], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[vec![1.0], vec![f64::INFINITY]]).unwrap();
        let mut scaler = StandardScaler::new();
        assert!(matches!(scaler.fit(&x), Err(TensorError::NonFinite(_))));
        assert!(scaler.mean().is_none());
    }

    #[test]
    fn test_unfitted_and_width_errors() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[vec![1.0, 2.0]]).unwrap();
        let scaler = StandardScaler::<f64>::new();
        assert_eq!(scaler.transform(&x).unwrap_err(), TensorError::NotFitted("StandardScaler"));

        let mut scaler = StandardScaler::new();
        scaler.fit(&x).unwrap();
        let narrow: Tensor<f64> = Tensor::from_vec2d(&[vec![1.0]]).unwrap();
        assert!(matches!(scaler.transform(&narrow), Err(TensorError::ShapeMismatch { .. })));
    }
}
