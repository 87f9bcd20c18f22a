use cropyield_core::error::{TensorError, TensorResult};
use cropyield_core::{Float, Tensor};
use serde::{Deserialize, Serialize};
use std::fmt;

fn check_lengths<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> TensorResult<usize> {
    if y_true.numel() != y_pred.numel() {
        return Err(TensorError::ShapeMismatch {
            expected: y_true.shape_vec(),
            got: y_pred.shape_vec(),
        });
    }
    if y_true.numel() == 0 {
        return Err(TensorError::EmptyTensor);
    }
    Ok(y_true.numel())
}

/// Mean Squared Error.
pub fn mse<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> TensorResult<f64> {
    let n = check_lengths(y_true, y_pred)?;
    let sum: f64 = y_true
        .data()
        .iter()
        .zip(y_pred.data().iter())
        .map(|(&t, &p)| {
            let d = t.to_f64() - p.to_f64();
            d * d
        })
        .sum();
    Ok(sum / n as f64)
}

/// Root Mean Squared Error.
pub fn rmse<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> TensorResult<f64> {
    Ok(mse(y_true, y_pred)?.sqrt())
}

/// Mean Absolute Error.
pub fn mae<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> TensorResult<f64> {
    let n = check_lengths(y_true, y_pred)?;
    let sum: f64 = y_true
        .data()
        .iter()
        .zip(y_pred.data().iter())
        .map(|(&t, &p)| (t.to_f64() - p.to_f64()).abs())
        .sum();
    Ok(sum / n as f64)
}

/// R² (coefficient of determination).
///
/// A constant `y_true` scores 1.0 when predicted exactly and 0.0 otherwise.
pub fn r2_score<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> TensorResult<f64> {
    let n = check_lengths(y_true, y_pred)? as f64;
    let mean_true: f64 = y_true.data().iter().map(|v| v.to_f64()).sum::<f64>() / n;

    let ss_res: f64 = y_true
        .data()
        .iter()
        .zip(y_pred.data().iter())
        .map(|(&t, &p)| {
            let d = t.to_f64() - p.to_f64();
            d * d
        })
        .sum();

    let ss_tot: f64 = y_true
        .data()
        .iter()
        .map(|&t| {
            let d = t.to_f64() - mean_true;
            d * d
        })
        .sum();

    if ss_tot < 1e-15 {
        return Ok(if ss_res < 1e-15 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Held-out scores for one fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    pub n_samples: usize,
}

impl RegressionReport {
    pub fn evaluate<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> TensorResult<Self> {
        Ok(RegressionReport {
            rmse: rmse(y_true, y_pred)?,
            mae: mae(y_true, y_pred)?,
            r2: r2_score(y_true, y_pred)?,
            n_samples: y_true.numel(),
        })
    }
}

impl fmt::Display for RegressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RMSE={:.3} MAE={:.3} R2={:.3} (n={})",
            self.rmse, self.mae, self.r2, self.n_samples
        )
    }
}
