use cropyield_core::error::{TensorError, TensorResult};
use cropyield_core::{FeatureFrame, Tensor};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle `0..n` and cut it into `(train, test)` index sets.
///
/// The test set holds `ceil(n * test_ratio)` rows, clamped so both sets keep
/// at least one row. Needs `n >= 2` and `0 < test_ratio < 1`.
pub fn split_indices(
    n: usize,
    test_ratio: f64,
    seed: Option<u64>,
) -> TensorResult<(Vec<usize>, Vec<usize>)> {
    if n < 2 {
        return Err(TensorError::InvalidOperation(format!(
            "train/test split needs at least 2 rows, got {}",
            n
        )));
    }
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(TensorError::InvalidOperation(format!(
            "test_ratio must be in (0, 1), got {}",
            test_ratio
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    indices.shuffle(&mut rng);

    let test_size = ((n as f64 * test_ratio).ceil() as usize).clamp(1, n - 1);
    let train_size = n - test_size;
    let test = indices.split_off(train_size);
    Ok((indices, test))
}

/// Split a feature frame and its targets into training and test sets.
///
/// Returns `(X_train, X_test, y_train, y_test)`.
pub fn train_test_split(
    x: &FeatureFrame,
    y: &Tensor<f64>,
    test_ratio: f64,
    seed: Option<u64>,
) -> TensorResult<(FeatureFrame, FeatureFrame, Tensor<f64>, Tensor<f64>)> {
    let n = x.n_rows();
    if n != y.numel() {
        return Err(TensorError::ShapeMismatch {
            expected: vec![n],
            got: y.shape_vec(),
        });
    }
    let (train, test) = split_indices(n, test_ratio, seed)?;
    Ok((
        x.select_rows(&train)?,
        x.select_rows(&test)?,
        y.select_rows(&train)?,
        y.select_rows(&test)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropyield_core::FeatureFrameBuilder;

    fn frame(n: usize) -> (FeatureFrame, Tensor<f64>) {
        let mut b = FeatureFrameBuilder::new(1, 1);
        for i in 0..n {
            b.push_row(&[i as f64], vec![Some(format!("c{}", i))]).unwrap();
        }
        let y: Vec<f64> = (0..n).map(|i| i as f64 * 10.0).collect();
        (b.finish().unwrap(), Tensor::from_slice(&y))
    }

    #[test]
    fn test_train_test_split() {
        let (x, y) = frame(5);
        let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, 0.2, Some(42)).unwrap();

        assert_eq!(x_train.n_rows(), 4);
        assert_eq!(x_test.n_rows(), 1);
        assert_eq!(y_train.numel(), 4);
        assert_eq!(y_test.numel(), 1);
        // rows stay paired with their targets
        for i in 0..x_train.n_rows() {
            let xv = x_train.numeric().get(&[i, 0]).unwrap();
            assert_eq!(y_train.data()[i], xv * 10.0);
        }
    }

    #[test]
    fn test_test_size_rounds_up() {
        let (train, test) = split_indices(11, 0.2, Some(1)).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_split_is_seeded() {
        let a = split_indices(50, 0.2, Some(42)).unwrap();
        let b = split_indices(50, 0.2, Some(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_two_rows_minimum() {
        assert!(split_indices(1, 0.2, Some(42)).is_err());
        let (train, test) = split_indices(2, 0.9, Some(42)).unwrap();
        assert_eq!((train.len(), test.len()), (1, 1));
    }
}
