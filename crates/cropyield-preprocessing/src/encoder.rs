use crate::imputer::check_widths;
use cropyield_core::error::{TensorError, TensorResult};
use cropyield_core::Tensor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder for string columns.
///
/// Categories are learned per column and kept sorted. Labels not seen during
/// fitting encode to an all-zero block for their column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Option<Vec<Vec<String>>>,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, rows: &[Vec<String>], n_columns: usize) -> TensorResult<()> {
        check_widths(rows, n_columns)?;
        let categories: Vec<Vec<String>> = (0..n_columns)
            .map(|j| {
                rows.iter()
                    .map(|r| r[j].clone())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            })
            .collect();
        self.categories = Some(categories);
        Ok(())
    }

    /// Encode rows into a `[rows, n_output_features]` matrix.
    pub fn transform(&self, rows: &[Vec<String>]) -> TensorResult<Tensor<f64>> {
        let categories = self
            .categories
            .as_ref()
            .ok_or(TensorError::NotFitted("OneHotEncoder"))?;
        check_widths(rows, categories.len())?;

        let width: usize = categories.iter().map(Vec::len).sum();
        let mut data = vec![0.0; rows.len() * width];
        for (i, row) in rows.iter().enumerate() {
            let mut offset = i * width;
            for (label, cats) in row.iter().zip(categories) {
                if let Ok(pos) = cats.binary_search(label) {
                    data[offset + pos] = 1.0;
                }
                offset += cats.len();
            }
        }
        Tensor::new(data, vec![rows.len(), width])
    }

    pub fn fit_transform(&mut self, rows: &[Vec<String>], n_columns: usize) -> TensorResult<Tensor<f64>> {
        self.fit(rows, n_columns)?;
        self.transform(rows)
    }

    pub fn categories(&self) -> Option<&[Vec<String>]> {
        self.categories.as_deref()
    }

    /// Total width of the encoded block; zero before fitting.
    pub fn n_output_features(&self) -> usize {
        self.categories
            .as_ref()
            .map_or(0, |c| c.iter().map(Vec::len).sum())
    }
}
