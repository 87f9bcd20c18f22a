use cropyield_core::error::TensorResult;
use cropyield_core::{format_number, FeatureFrame, FeatureFrameBuilder, FeatureSchema};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One raw feature value as sent by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<FeatureValue>),
}

/// Column name to raw value for a single entity.
pub type FeatureMap = HashMap<String, FeatureValue>;

static NULL: FeatureValue = FeatureValue::Null;

impl FeatureValue {
    /// Lists collapse to their first element, recursively; an empty list is `Null`.
    pub fn first(&self) -> &FeatureValue {
        match self {
            FeatureValue::List(items) => items.first().map_or(&NULL, FeatureValue::first),
            other => other,
        }
    }

    /// Value for a numeric column. Anything that does not give a finite
    /// number becomes NaN, the imputer's missing marker.
    pub fn to_numeric(&self) -> f64 {
        let v = match self.first() {
            FeatureValue::Number(n) => *n,
            FeatureValue::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            FeatureValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            FeatureValue::Null | FeatureValue::List(_) => f64::NAN,
        };
        if v.is_finite() {
            v
        } else {
            f64::NAN
        }
    }

    /// Label for a categorical column. Always produces text; null and
    /// booleans use the same spellings the training data carries
    /// (`None`, `True`, `False`).
    pub fn to_category(&self) -> String {
        match self.first() {
            FeatureValue::Text(s) => {
                let s = s.trim();
                match s.parse::<f64>() {
                    Ok(n) => format_number(n),
                    Err(_) => s.to_string(),
                }
            }
            FeatureValue::Number(n) => format_number(*n),
            FeatureValue::Bool(true) => "True".to_string(),
            FeatureValue::Bool(false) => "False".to_string(),
            FeatureValue::Null | FeatureValue::List(_) => "None".to_string(),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Number(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Text(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        FeatureValue::Text(v)
    }
}

/// Build a one-row frame in `schema` order. Absent keys count as `Null`.
pub fn build_feature_frame(schema: &FeatureSchema, features: &FeatureMap) -> TensorResult<FeatureFrame> {
    let lookup = |column: &String| features.get(column).unwrap_or(&NULL);

    let numeric: Vec<f64> = schema.numeric().iter().map(|c| lookup(c).to_numeric()).collect();
    let categorical: Vec<Option<String>> = schema
        .categorical()
        .iter()
        .map(|c| Some(lookup(c).to_category()))
        .collect();

    let mut builder = FeatureFrameBuilder::with_capacity(numeric.len(), categorical.len(), 1);
    builder.push_row(&numeric, categorical)?;
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_reduces_to_first() {
        let v = FeatureValue::List(vec![FeatureValue::Number(3.0), FeatureValue::Number(9.0)]);
        assert_eq!(v.to_numeric(), 3.0);
        assert_eq!(FeatureValue::List(vec![]).to_category(), "None");
        let nested = FeatureValue::List(vec![FeatureValue::List(vec!["Rice".into()])]);
        assert_eq!(nested.to_category(), "Rice");
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(FeatureValue::from(" 6.5 ").to_numeric(), 6.5);
        assert_eq!(FeatureValue::Bool(true).to_numeric(), 1.0);
        assert!(FeatureValue::from("high").to_numeric().is_nan());
        assert!(FeatureValue::Null.to_numeric().is_nan());
        assert!(FeatureValue::from("inf").to_numeric().is_nan());
    }

    #[test]
    fn test_category_coercion() {
        assert_eq!(FeatureValue::from("  Kolhapur ").to_category(), "Kolhapur");
        assert_eq!(FeatureValue::Number(100.0).to_category(), "100");
        assert_eq!(FeatureValue::from("100.0").to_category(), "100");
        assert_eq!(FeatureValue::Bool(false).to_category(), "False");
        assert_eq!(FeatureValue::Null.to_category(), "None");
    }

    #[test]
    fn test_untagged_json() {
        let map: FeatureMap = serde_json::from_str(
            r#"{"Nitrogen": [90, 10], "pH": "6.5", "Rainfall": 1200, "Crop": "Rice", "Month": null, "Irrigated": true}"#,
        )
        .unwrap();
        assert_eq!(map["Nitrogen"].to_numeric(), 90.0);
        assert_eq!(map["pH"].to_numeric(), 6.5);
        assert_eq!(map["Rainfall"], FeatureValue::Number(1200.0));
        assert_eq!(map["Month"], FeatureValue::Null);
        assert_eq!(map["Irrigated"], FeatureValue::Bool(true));
    }

    #[test]
    fn test_missing_ph_becomes_nan() {
        let schema = FeatureSchema::crop_yield();
        let mut map = FeatureMap::new();
        map.insert("Nitrogen".into(), 80.0.into());
        map.insert("Crop".into(), "Rice".into());

        let frame = build_feature_frame(&schema, &map).unwrap();
        assert_eq!(frame.n_rows(), 1);
        assert_eq!(frame.numeric().get(&[0, 0]).unwrap(), 80.0);
        assert!(frame.numeric().get(&[0, 3]).unwrap().is_nan());
        assert_eq!(frame.categorical()[0][1].as_deref(), Some("Rice"));
        assert_eq!(frame.categorical()[0][0].as_deref(), Some("None"));
    }
}
