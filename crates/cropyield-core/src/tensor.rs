use crate::dtype::Float;
use crate::error::{TensorError, TensorResult};
use crate::shape::Shape;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense N-dimensional tensor used for feature matrices, targets and fitted statistics.
///
/// Stores data in a flat contiguous `Vec<T>` with row-major (C-order) layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct Tensor<T: Float> {
    data: Vec<T>,
    shape: Shape,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl<T: Float> Tensor<T> {
    /// Create a tensor from raw data and shape.
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> TensorResult<Self> {
        let s = Shape::new(shape);
        if data.len() != s.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: s.to_vec(),
                got: vec![data.len()],
            });
        }
        Ok(Tensor { data, shape: s })
    }

    /// Create a tensor filled with zeros.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let s = Shape::new(shape);
        Tensor {
            data: vec![T::ZERO; s.numel()],
            shape: s,
        }
    }

    /// Create a 1-D tensor from a slice.
    pub fn from_slice(data: &[T]) -> Self {
        Tensor {
            data: data.to_vec(),
            shape: Shape::new(vec![data.len()]),
        }
    }

    /// Create a 2-D tensor from a nested slice.
    pub fn from_vec2d(data: &[Vec<T>]) -> TensorResult<Self> {
        if data.is_empty() {
            return Ok(Tensor::zeros(vec![0, 0]));
        }
        let rows = data.len();
        let cols = data[0].len();
        for row in data {
            if row.len() != cols {
                return Err(TensorError::InvalidOperation(
                    "All rows must have the same number of columns".to_string(),
                ));
            }
        }
        let flat: Vec<T> = data.iter().flat_map(|r| r.iter().copied()).collect();
        Tensor::new(flat, vec![rows, cols])
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_vec(&self) -> Vec<usize> {
        self.shape.to_vec()
    }

    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    fn offset(&self, indices: &[usize]) -> TensorResult<usize> {
        if indices.len() != self.ndim() {
            return Err(TensorError::DimensionMismatch(format!(
                "Expected {} indices, got {}",
                self.ndim(),
                indices.len()
            )));
        }
        let strides = self.shape.strides();
        let mut offset = 0;
        for (i, &idx) in indices.iter().enumerate() {
            let dim_size = self.shape.dim(i)?;
            if idx >= dim_size {
                return Err(TensorError::IndexOutOfBounds {
                    index: idx,
                    axis: i,
                    size: dim_size,
                });
            }
            offset += idx * strides[i];
        }
        Ok(offset)
    }

    /// Multi-dimensional indexing.
    pub fn get(&self, indices: &[usize]) -> TensorResult<T> {
        let offset = self.offset(indices)?;
        Ok(self.data[offset])
    }

    fn require_matrix(&self, op: &str) -> TensorResult<(usize, usize)> {
        if self.ndim() != 2 {
            return Err(TensorError::InvalidOperation(format!(
                "{}() requires a 2D tensor, got shape {}",
                op, self.shape
            )));
        }
        Ok((self.shape.dim(0)?, self.shape.dim(1)?))
    }

    /// Borrow a row of a 2D tensor without copying.
    pub fn row_slice(&self, i: usize) -> TensorResult<&[T]> {
        let (rows, cols) = self.require_matrix("row_slice")?;
        if i >= rows {
            return Err(TensorError::IndexOutOfBounds {
                index: i,
                axis: 0,
                size: rows,
            });
        }
        Ok(&self.data[i * cols..(i + 1) * cols])
    }

    /// Extract a column from a 2D tensor.
    pub fn col(&self, j: usize) -> TensorResult<Tensor<T>> {
        let (rows, cols) = self.require_matrix("col")?;
        if j >= cols {
            return Err(TensorError::IndexOutOfBounds {
                index: j,
                axis: 1,
                size: cols,
            });
        }
        let data: Vec<T> = (0..rows).map(|i| self.data[i * cols + j]).collect();
        Ok(Tensor {
            data,
            shape: Shape::new(vec![rows]),
        })
    }

    /// Gather the given rows (first axis) into a new tensor, in the given order.
    /// Works for 1-D targets and 2-D feature matrices.
    pub fn select_rows(&self, indices: &[usize]) -> TensorResult<Tensor<T>> {
        let rows = self.shape.dim(0)?;
        let width: usize = self.shape.dims()[1..].iter().product();
        let mut data = Vec::with_capacity(indices.len() * width);
        for &i in indices {
            if i >= rows {
                return Err(TensorError::IndexOutOfBounds {
                    index: i,
                    axis: 0,
                    size: rows,
                });
            }
            data.extend_from_slice(&self.data[i * width..(i + 1) * width]);
        }
        let mut dims = self.shape_vec();
        dims[0] = indices.len();
        Tensor::new(data, dims)
    }

    /// Horizontally stack 2D tensors that share a row count.
    pub fn hstack(tensors: &[&Tensor<T>]) -> TensorResult<Tensor<T>> {
        if tensors.is_empty() {
            return Err(TensorError::EmptyTensor);
        }
        let (rows, _) = tensors[0].require_matrix("hstack")?;
        let mut total_cols = 0usize;
        for t in tensors {
            let (r, c) = t.require_matrix("hstack")?;
            if r != rows {
                return Err(TensorError::ShapeMismatch {
                    expected: vec![rows, c],
                    got: t.shape_vec(),
                });
            }
            total_cols += c;
        }

        let mut data = Vec::with_capacity(rows * total_cols);
        for i in 0..rows {
            for t in tensors {
                data.extend_from_slice(t.row_slice(i)?);
            }
        }
        Tensor::new(data, vec![rows, total_cols])
    }

    // ─── Element-wise ───────────────────────────────────────────────────────

    pub fn has_nan(&self) -> bool {
        self.data.iter().any(|v| v.is_nan())
    }

    pub fn mean_all(&self) -> T {
        if self.data.is_empty() {
            return T::ZERO;
        }
        let sum: T = self.data.iter().copied().sum();
        sum / T::from_usize(self.data.len())
    }
}

impl<T: Float> PartialEq for Tensor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.data == other.data
    }
}

impl<T: Float> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor{} {:?}", self.shape, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_shape() {
        assert!(Tensor::<f64>::new(vec![1.0, 2.0, 3.0], vec![2, 2]).is_err());
        let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        assert_eq!(t.get(&[1, 0]).unwrap(), 3.0);
    }

    #[test]
    fn test_row_and_col() {
        let t: Tensor<f64> = Tensor::from_vec2d(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(t.row_slice(1).unwrap(), &[3.0, 4.0]);
        assert_eq!(t.col(1).unwrap().data(), &[2.0, 4.0]);
        assert!(t.row_slice(2).is_err());
    }

    #[test]
    fn test_select_rows_keeps_order() {
        let t: Tensor<f64> =
            Tensor::from_vec2d(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        let picked = t.select_rows(&[2, 0]).unwrap();
        assert_eq!(picked.shape_vec(), vec![2, 2]);
        assert_eq!(picked.data(), &[5.0, 6.0, 1.0, 2.0]);

        let y: Tensor<f64> = Tensor::from_slice(&[10.0, 20.0, 30.0]);
        assert_eq!(y.select_rows(&[1]).unwrap().data(), &[20.0]);
        assert!(y.select_rows(&[3]).is_err());
    }

    #[test]
    fn test_hstack() {
        let a: Tensor<f64> = Tensor::from_vec2d(&[vec![1.0], vec![2.0]]).unwrap();
        let b: Tensor<f64> = Tensor::from_vec2d(&[vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        let empty: Tensor<f64> = Tensor::zeros(vec![2, 0]);
        let c = Tensor::hstack(&[&a, &empty, &b]).unwrap();
        assert_eq!(c.shape_vec(), vec![2, 3]);
        assert_eq!(c.data(), &[1.0, 3.0, 4.0, 2.0, 5.0, 6.0]);
    }

    #[test]
    fn test_hstack_row_mismatch() {
        let a: Tensor<f64> = Tensor::zeros(vec![2, 1]);
        let b: Tensor<f64> = Tensor::zeros(vec![3, 1]);
        assert!(Tensor::hstack(&[&a, &b]).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let t: Tensor<f64> = Tensor::from_vec2d(&[vec![0.1, 0.2], vec![1.0 / 3.0, 7.5]]).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let back: Tensor<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
