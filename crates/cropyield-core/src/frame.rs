use crate::error::{TensorError, TensorResult};
use crate::tensor::Tensor;

/// Mixed-type feature matrix: a numeric block (NaN marks a missing value)
/// and a categorical block (`None` marks a missing label), sharing rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    numeric: Tensor<f64>,
    categorical: Vec<Vec<Option<String>>>,
    n_categorical: usize,
}

impl FeatureFrame {
    pub fn new(
        numeric: Tensor<f64>,
        categorical: Vec<Vec<Option<String>>>,
        n_categorical: usize,
    ) -> TensorResult<Self> {
        if numeric.ndim() != 2 {
            return Err(TensorError::DimensionMismatch(format!(
                "numeric block must be 2D, got shape {}",
                numeric.shape()
            )));
        }
        let rows = numeric.shape().dim(0)?;
        if categorical.len() != rows {
            return Err(TensorError::ShapeMismatch {
                expected: vec![rows, n_categorical],
                got: vec![categorical.len(), n_categorical],
            });
        }
        if let Some(bad) = categorical.iter().find(|r| r.len() != n_categorical) {
            return Err(TensorError::ShapeMismatch {
                expected: vec![rows, n_categorical],
                got: vec![rows, bad.len()],
            });
        }
        Ok(FeatureFrame {
            numeric,
            categorical,
            n_categorical,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.categorical.len()
    }

    pub fn n_numeric(&self) -> usize {
        self.numeric.shape().dims()[1]
    }

    pub fn n_categorical(&self) -> usize {
        self.n_categorical
    }

    pub fn numeric(&self) -> &Tensor<f64> {
        &self.numeric
    }

    pub fn categorical(&self) -> &[Vec<Option<String>>] {
        &self.categorical
    }

    /// Labels of one categorical column, top to bottom.
    pub fn categorical_column(&self, j: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.categorical.iter().map(move |row| row[j].as_deref())
    }

    /// Gather the given rows into a new frame, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> TensorResult<Self> {
        let numeric = self.numeric.select_rows(indices)?;
        let categorical = indices
            .iter()
            .map(|&i| self.categorical[i].clone())
            .collect();
        FeatureFrame::new(numeric, categorical, self.n_categorical)
    }
}

/// Row-at-a-time builder for [`FeatureFrame`].
#[derive(Debug)]
pub struct FeatureFrameBuilder {
    n_numeric: usize,
    n_categorical: usize,
    numeric: Vec<f64>,
    categorical: Vec<Vec<Option<String>>>,
}

impl FeatureFrameBuilder {
    pub fn new(n_numeric: usize, n_categorical: usize) -> Self {
        FeatureFrameBuilder {
            n_numeric,
            n_categorical,
            numeric: Vec::new(),
            categorical: Vec::new(),
        }
    }

    pub fn with_capacity(n_numeric: usize, n_categorical: usize, rows: usize) -> Self {
        FeatureFrameBuilder {
            n_numeric,
            n_categorical,
            numeric: Vec::with_capacity(rows * n_numeric),
            categorical: Vec::with_capacity(rows),
        }
    }

    pub fn push_row(&mut self, numeric: &[f64], categorical: Vec<Option<String>>) -> TensorResult<()> {
        if numeric.len() != self.n_numeric || categorical.len() != self.n_categorical {
            return Err(TensorError::ShapeMismatch {
                expected: vec![self.n_numeric, self.n_categorical],
                got: vec![numeric.len(), categorical.len()],
            });
        }
        self.numeric.extend_from_slice(numeric);
        self.categorical.push(categorical);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categorical.is_empty()
    }

    pub fn finish(self) -> TensorResult<FeatureFrame> {
        let rows = self.categorical.len();
        let numeric = Tensor::new(self.numeric, vec![rows, self.n_numeric])?;
        FeatureFrame::new(numeric, self.categorical, self.n_categorical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FeatureFrame {
        let mut b = FeatureFrameBuilder::new(2, 1);
        b.push_row(&[1.0, f64::NAN], vec![Some("a".into())]).unwrap();
        b.push_row(&[2.0, 20.0], vec![None]).unwrap();
        b.push_row(&[3.0, 30.0], vec![Some("b".into())]).unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn test_builder_shapes() {
        let f = sample();
        assert_eq!(f.n_rows(), 3);
        assert_eq!(f.n_numeric(), 2);
        assert_eq!(f.n_categorical(), 1);
        let col: Vec<Option<&str>> = f.categorical_column(0).collect();
        assert_eq!(col, vec![Some("a"), None, Some("b")]);
    }

    #[test]
    fn test_builder_rejects_wrong_width() {
        let mut b = FeatureFrameBuilder::new(2, 1);
        assert!(b.push_row(&[1.0], vec![None]).is_err());
        assert!(b.push_row(&[1.0, 2.0], vec![]).is_err());
        assert!(b.is_empty());
    }

    #[test]
    fn test_select_rows() {
        let f = sample().select_rows(&[2, 0]).unwrap();
        assert_eq!(f.n_rows(), 2);
        assert_eq!(f.numeric().data()[0], 3.0);
        assert_eq!(f.categorical()[1][0].as_deref(), Some("a"));
    }

    #[test]
    fn test_numeric_only_frame() {
        let mut b = FeatureFrameBuilder::new(1, 0);
        b.push_row(&[5.0], vec![]).unwrap();
        let f = b.finish().unwrap();
        assert_eq!(f.n_rows(), 1);
        assert_eq!(f.n_categorical(), 0);
    }
}
