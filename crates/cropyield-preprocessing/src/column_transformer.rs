use crate::encoder::OneHotEncoder;
use crate::imputer::{MedianImputer, MostFrequentImputer};
use crate::scaler::StandardScaler;
use cropyield_core::error::{TensorError, TensorResult};
use cropyield_core::{FeatureFrame, Tensor};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Median imputation then standardization for the numeric block, most
/// frequent imputation then one-hot encoding for the categorical block.
///
/// The output matrix is the numeric block followed by the categorical block.
/// All statistics come from the frame passed to [`ColumnTransformer::fit`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnTransformer {
    numeric_imputer: MedianImputer,
    scaler: StandardScaler<f64>,
    categorical_imputer: MostFrequentImputer,
    encoder: OneHotEncoder,
    widths: Option<(usize, usize)>,
}

impl ColumnTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, x: &FeatureFrame) -> TensorResult<()> {
        let imputed = self.numeric_imputer.fit_transform(x.numeric())?;
        self.scaler.fit(&imputed)?;

        let labels = self
            .categorical_imputer
            .fit_transform(x.categorical(), x.n_categorical())?;
        self.encoder.fit(&labels, x.n_categorical())?;

        self.widths = Some((x.n_numeric(), x.n_categorical()));
        debug!(
            rows = x.n_rows(),
            numeric = x.n_numeric(),
            encoded = self.encoder.n_output_features(),
            "fitted column transformer"
        );
        Ok(())
    }

    pub fn transform(&self, x: &FeatureFrame) -> TensorResult<Tensor<f64>> {
        let (n_numeric, n_categorical) = self
            .widths
            .ok_or(TensorError::NotFitted("ColumnTransformer"))?;
        if x.n_numeric() != n_numeric || x.n_categorical() != n_categorical {
            return Err(TensorError::ShapeMismatch {
                expected: vec![n_numeric, n_categorical],
                got: vec![x.n_numeric(), x.n_categorical()],
            });
        }

        let numeric = self
            .scaler
            .transform(&self.numeric_imputer.transform(x.numeric())?)?;
        let labels = self.categorical_imputer.transform(x.categorical())?;
        let encoded = self.encoder.transform(&labels)?;
        Tensor::hstack(&[&numeric, &encoded])
    }

    pub fn fit_transform(&mut self, x: &FeatureFrame) -> TensorResult<Tensor<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    pub fn is_fitted(&self) -> bool {
        self.widths.is_some()
    }

    /// `(numeric, categorical)` input widths seen during fitting.
    pub fn input_widths(&self) -> Option<(usize, usize)> {
        self.widths
    }

    pub fn n_output_features(&self) -> usize {
        self.widths.map_or(0, |(n, _)| n) + self.encoder.n_output_features()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use cropyield_core::FeatureFrameBuilder;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn training_frame() -> FeatureFrame {
        let mut b = FeatureFrameBuilder::new(2, 1);
        b.push_row(&[1.0, 10.0], vec![s("Rice")]).unwrap();
        b.push_row(&[3.0, f64::NAN], vec![s("Wheat")]).unwrap();
        b.push_row(&[5.0, 30.0], vec![None]).unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn test_fit_transform_layout() {
        let mut ct = ColumnTransformer::new();
        let out = ct.fit_transform(&training_frame()).unwrap();

        assert_eq!(out.shape_vec(), vec![3, 4]);
        assert_eq!(ct.n_output_features(), 4);
        assert!(!out.has_nan());
        // NaN imputed with median 20, which is also the mean, so scales to 0
        assert_abs_diff_eq!(out.get(&[1, 1]).unwrap(), 0.0, epsilon = 1e-12);
        // missing crop imputed with "Rice" (tie broken lexicographically)
        assert_eq!(&out.row_slice(2).unwrap()[2..], &[1.0, 0.0]);
    }

    #[test]
    fn test_rejects_wrong_column_counts() {
        let mut ct = ColumnTransformer::new();
        ct.fit(&training_frame()).unwrap();

        let mut b = FeatureFrameBuilder::new(1, 1);
        b.push_row(&[1.0], vec![s("Rice")]).unwrap();
        let err = ct.transform(&b.finish().unwrap()).unwrap_err();
        assert!(matches!(err, TensorError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_not_fitted() {
        let ct = ColumnTransformer::new();
        assert_eq!(
            ct.transform(&training_frame()).unwrap_err(),
            TensorError::NotFitted("ColumnTransformer")
        );
    }

    #[test]
    fn test_serde_round_trip_preserves_output() {
        let mut ct = ColumnTransformer::new();
        let frame = training_frame();
        let before = ct.fit_transform(&frame).unwrap();
        let json = serde_json::to_string(&ct).unwrap();
        let restored: ColumnTransformer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.transform(&frame).unwrap(), before);
    }
}
