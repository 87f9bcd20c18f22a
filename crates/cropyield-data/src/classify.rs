use crate::dataset::Dataset;
use crate::error::DataError;
use cropyield_core::{ColumnKind, FeatureSchema, FieldValue};
use tracing::debug;

/// Minimum share of non-missing values that must parse as numbers for a
/// column to count as numeric.
pub const NUMERIC_THRESHOLD: f64 = 0.8;

/// Classify one column from its values. A column with no present values is
/// categorical.
pub fn classify_column<'a, I>(values: I) -> ColumnKind
where
    I: IntoIterator<Item = &'a FieldValue>,
{
    let mut present = 0usize;
    let mut numeric = 0usize;
    for v in values {
        match v {
            FieldValue::Missing => {}
            FieldValue::Numeric(_) => {
                present += 1;
                numeric += 1;
            }
            FieldValue::Categorical(_) => present += 1,
        }
    }
    if present == 0 {
        return ColumnKind::Categorical;
    }
    if numeric as f64 / present as f64 >= NUMERIC_THRESHOLD {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

/// Partition every non-target header into numeric and categorical columns,
/// preserving header order within each group.
pub fn detect_column_types(dataset: &Dataset, target: &str) -> Result<FeatureSchema, DataError> {
    if dataset.column_index(target).is_none() {
        return Err(DataError::MissingTarget {
            target: target.to_string(),
            headers: dataset.headers().to_vec(),
        });
    }

    let mut numeric = Vec::new();
    let mut categorical = Vec::new();
    for (idx, name) in dataset.headers().iter().enumerate() {
        if name == target || numeric.contains(name) || categorical.contains(name) {
            continue;
        }
        // Duplicate headers resolve to the rightmost column.
        let idx = dataset.column_index(name).unwrap_or(idx);
        match classify_column(dataset.column(idx)) {
            ColumnKind::Numeric => numeric.push(name.clone()),
            ColumnKind::Categorical => categorical.push(name.clone()),
        }
    }
    debug!(
        numeric = numeric.len(),
        categorical = categorical.len(),
        "detected column types"
    );
    Ok(FeatureSchema::new(numeric, categorical)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rainfall_with_missing_is_numeric() {
        let ds = Dataset::from_raw_rows(
            &["Rainfall", "Yield"],
            &[vec!["100", "10"], vec!["200", "20"], vec!["300", "30"], vec!["NA", "40"]],
        );
        let schema = detect_column_types(&ds, "Yield").unwrap();
        assert_eq!(schema.numeric(), &["Rainfall".to_string()]);
        assert!(schema.categorical().is_empty());
    }

    #[test]
    fn test_mixed_column_below_threshold() {
        let ds = Dataset::from_raw_rows(
            &["Soil", "Yield"],
            &[vec!["1", "1"], vec!["2", "1"], vec!["3", "1"], vec!["Black", "1"]],
        );
        // 3 of 4 numeric is 0.75
        let schema = detect_column_types(&ds, "Yield").unwrap();
        assert_eq!(schema.categorical(), &["Soil".to_string()]);
    }

    #[test]
    fn test_all_missing_column_is_categorical() {
        let ds = Dataset::from_raw_rows(&["Empty", "Yield"], &[vec!["", "1"], vec!["NA", "2"]]);
        let schema = detect_column_types(&ds, "Yield").unwrap();
        assert_eq!(schema.categorical(), &["Empty".to_string()]);
    }

    #[test]
    fn test_header_order_preserved() {
        let ds = Dataset::from_raw_rows(
            &["Crop", "Nitrogen", "Yield", "Season", "pH"],
            &[vec!["Rice", "80", "30", "Kharif", "6.5"]],
        );
        let schema = detect_column_types(&ds, "Yield").unwrap();
        assert_eq!(schema.numeric(), &["Nitrogen".to_string(), "pH".to_string()]);
        assert_eq!(schema.categorical(), &["Crop".to_string(), "Season".to_string()]);
    }

    #[test]
    fn test_missing_target() {
        let ds = Dataset::from_raw_rows(&["a"], &[vec!["1"]]);
        let err = detect_column_types(&ds, "Yield").unwrap_err();
        assert!(matches!(err, DataError::MissingTarget { .. }));
    }

    proptest! {
        #[test]
        fn prop_threshold_decides_kind(n_num in 0usize..40, n_text in 0usize..40, n_missing in 0usize..10) {
            let mut values = Vec::new();
            values.extend((0..n_num).map(|i| FieldValue::Numeric(i as f64)));
            values.extend((0..n_text).map(|i| FieldValue::Categorical(format!("c{}", i))));
            values.extend((0..n_missing).map(|_| FieldValue::Missing));

            let kind = classify_column(&values);
            let present = n_num + n_text;
            let expected = if present > 0 && n_num as f64 / present as f64 >= NUMERIC_THRESHOLD {
                ColumnKind::Numeric
            } else {
                ColumnKind::Categorical
            };
            prop_assert_eq!(kind, expected);
        }
    }
}
