use cropyield_core::error::{TensorError, TensorResult};
use cropyield_core::Tensor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Replaces non-finite numeric cells with the per-column median of the
/// finite training values. A column with no finite values imputes 0.0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedianImputer {
    statistics: Option<Vec<f64>>,
}

impl MedianImputer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, x: &Tensor<f64>) -> TensorResult<()> {
        let cols = x.shape().dim(1)?;
        let stats = (0..cols)
            .map(|j| -> TensorResult<f64> {
                let col = x.col(j)?;
                let mut present: Vec<f64> =
                    col.data().iter().copied().filter(|v| v.is_finite()).collect();
                Ok(median(&mut present).unwrap_or(0.0))
            })
            .collect::<TensorResult<Vec<_>>>()?;
        self.statistics = Some(stats);
        Ok(())
    }

    pub fn transform(&self, x: &Tensor<f64>) -> TensorResult<Tensor<f64>> {
        let stats = self
            .statistics
            .as_ref()
            .ok_or(TensorError::NotFitted("MedianImputer"))?;
        let rows = x.shape().dim(0)?;
        let cols = x.shape().dim(1)?;
        if cols != stats.len() {
            return Err(TensorError::ShapeMismatch {
                expected: vec![rows, stats.len()],
                got: x.shape_vec(),
            });
        }
        let mut out = x.clone();
        for (i, v) in out.data_mut().iter_mut().enumerate() {
            if !v.is_finite() {
                *v = stats[i % cols];
            }
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, x: &Tensor<f64>) -> TensorResult<Tensor<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    pub fn statistics(&self) -> Option<&[f64]> {
        self.statistics.as_deref()
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        // Halve before adding so values near f64::MAX stay finite.
        Some(values[mid - 1] / 2.0 + values[mid] / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Replaces missing categorical labels with the most frequent training label
/// per column. Ties go to the lexicographically smallest label; a column with
/// no labels at all imputes the empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MostFrequentImputer {
    fill: Option<Vec<String>>,
}

impl MostFrequentImputer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, rows: &[Vec<Option<String>>], n_columns: usize) -> TensorResult<()> {
        check_widths(rows, n_columns)?;
        let fill = (0..n_columns)
            .map(|j| {
                let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
                for label in rows.iter().filter_map(|r| r[j].as_deref()) {
                    *counts.entry(label).or_insert(0) += 1;
                }
                let mut best: Option<(&str, usize)> = None;
                for (label, count) in counts {
                    if best.map_or(true, |(_, c)| count > c) {
                        best = Some((label, count));
                    }
                }
                best.map(|(label, _)| label.to_string()).unwrap_or_default()
            })
            .collect();
        self.fill = Some(fill);
        Ok(())
    }

    pub fn transform(&self, rows: &[Vec<Option<String>>]) -> TensorResult<Vec<Vec<String>>> {
        let fill = self
            .fill
            .as_ref()
            .ok_or(TensorError::NotFitted("MostFrequentImputer"))?;
        check_widths(rows, fill.len())?;
        Ok(rows
            .iter()
            .map(|r| {
                r.iter()
                    .zip(fill)
                    .map(|(v, f)| v.clone().unwrap_or_else(|| f.clone()))
                    .collect()
            })
            .collect())
    }

    pub fn fit_transform(
        &mut self,
        rows: &[Vec<Option<String>>],
        n_columns: usize,
    ) -> TensorResult<Vec<Vec<String>>> {
        self.fit(rows, n_columns)?;
        self.transform(rows)
    }

    pub fn fill_values(&self) -> Option<&[String]> {
        self.fill.as_deref()
    }
}

pub(crate) fn check_widths<S>(rows: &[Vec<S>], n_columns: usize) -> TensorResult<()> {
    match rows.iter().find(|r| r.len() != n_columns) {
        Some(bad) => Err(TensorError::ShapeMismatch {
            expected: vec![rows.len(), n_columns],
            got: vec![rows.len(), bad.len()],
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn test_median_imputer() {
        let x = Tensor::from_vec2d(&[
            vec![1.0, f64::NAN],
            vec![f64::NAN, f64::NAN],
            vec![3.0, f64::NAN],
            vec![10.0, f64::NAN],
        ])
        .unwrap();
        let mut imp = MedianImputer::new();
        let out = imp.fit_transform(&x).unwrap();
        assert_eq!(imp.statistics().unwrap(), &[3.0, 0.0]);
        assert_eq!(out.get(&[1, 0]).unwrap(), 3.0);
        assert_eq!(out.get(&[2, 1]).unwrap(), 0.0);
        assert!(!out.has_nan());
    }

    #[test]
    fn test_median_even_count() {
        let x = Tensor::from_vec2d(&[vec![1.0], vec![2.0], vec![4.0], vec![8.0]]).unwrap();
        let mut imp = MedianImputer::new();
        imp.fit(&x).unwrap();
        assert_eq!(imp.statistics().unwrap(), &[3.0]);

        let huge = Tensor::from_vec2d(&[vec![1e308], vec![1e308]]).unwrap();
        imp.fit(&huge).unwrap();
        assert_eq!(imp.statistics().unwrap(), &[1e308]);
    }

    #[test]
    fn test_most_frequent_with_ties() {
        let rows = vec![
            vec![s("Rice"), None],
            vec![s("Wheat"), None],
            vec![s("Wheat"), None],
            vec![s("Rice"), None],
            vec![None, None],
        ];
        let mut imp = MostFrequentImputer::new();
        let out = imp.fit_transform(&rows, 2).unwrap();
        assert_eq!(imp.fill_values().unwrap(), &["Rice".to_string(), String::new()]);
        assert_eq!(out[4], vec!["Rice".to_string(), String::new()]);
        assert_eq!(out[1][0], "Wheat");
    }

    #[test]
    fn test_unfitted() {
        let imp = MostFrequentImputer::new();
        assert!(imp.transform(&[]).is_err());
        let x = Tensor::from_vec2d(&[vec![1.0]]).unwrap();
        assert!(MedianImputer::new().transform(&x).is_err());
    }
}
