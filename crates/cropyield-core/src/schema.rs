//! The feature-column contract shared by training and inference.
//!
//! A fitted pipeline consumes numeric columns first, then categorical columns,
//! each in the order listed here. The trainer checks the columns it detects
//! against this schema, the artifact records the schema it was trained with,
//! and the inference adapter rebuilds request rows from the same schema.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Numeric feature columns of the crop-yield dataset, in pipeline order.
pub const NUMERIC_FEATURES: [&str; 6] = [
    "Nitrogen",
    "Phosphorus",
    "Potassium",
    "pH",
    "Rainfall",
    "Temperature",
];

/// Categorical feature columns of the crop-yield dataset, in pipeline order.
pub const CATEGORICAL_FEATURES: [&str; 6] = [
    "District_Name",
    "Crop",
    "Fertilizer",
    "Soil_color",
    "Season",
    "Month",
];

/// Regression target column of the crop-yield dataset.
pub const TARGET_COLUMN: &str = "Yield";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Ordered partition of feature columns into numeric and categorical sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    numeric: Vec<String>,
    categorical: Vec<String>,
}

impl FeatureSchema {
    pub fn new(numeric: Vec<String>, categorical: Vec<String>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for name in numeric.iter().chain(categorical.iter()) {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }
        Ok(FeatureSchema { numeric, categorical })
    }

    /// The schema every crop-yield artifact is trained and served with.
    pub fn crop_yield() -> Self {
        FeatureSchema {
            numeric: NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect(),
            categorical: CATEGORICAL_FEATURES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn numeric(&self) -> &[String] {
        &self.numeric
    }

    pub fn categorical(&self) -> &[String] {
        &self.categorical
    }

    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All feature columns in pipeline order: numeric, then categorical.
    pub fn feature_order(&self) -> impl Iterator<Item = (&str, ColumnKind)> {
        self.numeric
            .iter()
            .map(|c| (c.as_str(), ColumnKind::Numeric))
            .chain(self.categorical.iter().map(|c| (c.as_str(), ColumnKind::Categorical)))
    }

    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        if self.numeric.iter().any(|c| c == column) {
            Some(ColumnKind::Numeric)
        } else if self.categorical.iter().any(|c| c == column) {
            Some(ColumnKind::Categorical)
        } else {
            None
        }
    }

    /// Require `other` to have exactly the same columns, kinds and order.
    pub fn ensure_matches(&self, other: &FeatureSchema) -> Result<(), SchemaError> {
        if self == other {
            return Ok(());
        }
        Err(SchemaError::Mismatch {
            expected_numeric: self.numeric.clone(),
            expected_categorical: self.categorical.clone(),
            found_numeric: other.numeric.clone(),
            found_categorical: other.categorical.clone(),
        })
    }

    /// Like [`ensure_matches`](Self::ensure_matches) but ignores column order:
    /// `other` must hold the same numeric and categorical column sets.
    pub fn ensure_same_columns(&self, other: &FeatureSchema) -> Result<(), SchemaError> {
        let same_set = |a: &[String], b: &[String]| {
            a.len() == b.len() && a.iter().all(|c| b.contains(c))
        };
        if same_set(&self.numeric, &other.numeric) && same_set(&self.categorical, &other.categorical) {
            return Ok(());
        }
        self.ensure_matches(other)
    }
}
