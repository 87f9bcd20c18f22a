use serde::{Deserialize, Serialize};

/// Cell texts treated as missing. Compared case-sensitively after trimming.
pub const MISSING_SENTINELS: [&str; 4] = ["", "NA", "N/A", "nan"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Numeric(f64),
    Categorical(String),
    Missing,
}

impl FieldValue {
    /// Normalize one raw cell.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if MISSING_SENTINELS.contains(&trimmed) {
            return FieldValue::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) => FieldValue::Numeric(v),
            Err(_) => FieldValue::Categorical(trimmed.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldValue::Numeric(_))
    }

    /// Value for a numeric feature column. Missing, textual and non-finite
    /// cells yield `None` and are left to the imputer.
    pub fn as_finite(&self) -> Option<f64> {
        match self {
            FieldValue::Numeric(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Label for a categorical feature column. `None` for missing cells.
    pub fn category_text(&self) -> Option<String> {
        match self {
            FieldValue::Numeric(v) => Some(format_number(*v)),
            FieldValue::Categorical(s) => Some(s.clone()),
            FieldValue::Missing => None,
        }
    }
}

/// Shortest decimal text that round-trips to `v` (`100` for `100.0`).
pub fn format_number(v: f64) -> String {
    format!("{}", v)
}
