use crate::lookup::{safe_get, Record};
use crate::season::infer_season;
use cropyield_core::format_number;
use cropyield_inference::{FeatureMap, FeatureValue, Prediction, YieldPredictor};
use serde::Serialize;
use tracing::debug;

/// Rendered in place of a value the dataset does not hold.
pub const NOT_RECORDED: &str = "not recorded";

pub const DEFAULT_CONFIDENCE: &str = "75";

/// Yield used when the heuristic inputs cannot be parsed.
pub const HEURISTIC_FALLBACK: f64 = 25.0;

/// Where the `{yield}` value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum YieldSource {
    Recorded,
    Predicted,
    Heuristic,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillValues {
    pub district: Option<String>,
    pub crop: Option<String>,
    pub soil: Option<String>,
    pub fertilizer: Option<String>,
    pub rainfall: Option<String>,
    pub temperature: Option<String>,
    pub pest: Option<String>,
    pub season: Option<String>,
    pub month: Option<String>,
    pub nitrogen: Option<String>,
    pub phosphorus: Option<String>,
    pub potassium: Option<String>,
    pub ph: Option<String>,
    pub yield_value: String,
    pub yield_source: YieldSource,
    pub confidence: String,
}

fn given(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

impl FillValues {
    /// Values from a matched row (or none). Explicit `district`/`crop`
    /// arguments win over the row's.
    ///
    /// The yield is the row's recorded yield if it has one, else the model's
    /// prediction for the row, else [`estimate_yield`].
    pub fn from_record(
        row: Option<&Record<'_>>,
        district: Option<&str>,
        crop: Option<&str>,
        predictor: &YieldPredictor,
    ) -> Self {
        let month = safe_get(row, &["month"]);
        let season = safe_get(row, &["season"])
            .or_else(|| month.as_deref().and_then(infer_season).map(|s| s.to_string()));

        let mut values = FillValues {
            district: given(district).or_else(|| safe_get(row, &["district_name", "district"])),
            crop: given(crop).or_else(|| safe_get(row, &["crop"])),
            soil: safe_get(row, &["soil_color", "soil"]),
            fertilizer: safe_get(row, &["fertilizer"]),
            rainfall: safe_get(row, &["rainfall", "precipitation"]),
            temperature: safe_get(row, &["temperature"]),
            pest: safe_get(row, &["events", "pest"]),
            season,
            month,
            nitrogen: safe_get(row, &["nitrogen"]),
            phosphorus: safe_get(row, &["phosphorus"]),
            potassium: safe_get(row, &["potassium"]),
            ph: safe_get(row, &["p_h", "ph"]),
            yield_value: String::new(),
            yield_source: YieldSource::Recorded,
            confidence: safe_get(row, &["confidence"]).unwrap_or_else(|| DEFAULT_CONFIDENCE.to_string()),
        };

        match safe_get(row, &["yield"]) {
            Some(recorded) => values.yield_value = recorded,
            None => match predictor.predict(&values.feature_map()) {
                Prediction::Yield(v) => {
                    values.yield_value = format_number(v);
                    values.yield_source = YieldSource::Predicted;
                }
                Prediction::Unavailable => {
                    values.yield_value = format_number(estimate_yield(row));
                    values.yield_source = YieldSource::Heuristic;
                }
            },
        }
        debug!(source = ?values.yield_source, value = %values.yield_value, "yield filled");
        values
    }

    /// Stand-in values used when no dataset could be loaded.
    pub fn generic(district: Option<&str>, crop: Option<&str>) -> Self {
        let text = |s: &str| Some(s.to_string());
        FillValues {
            district: given(district).or_else(|| text("your district")),
            crop: given(crop).or_else(|| text("your crop")),
            soil: text("soil"),
            fertilizer: text("fertilizer"),
            rainfall: text("rainfall"),
            temperature: text("25"),
            pest: text("pest"),
            season: text("season"),
            month: None,
            nitrogen: text("N"),
            phosphorus: text("P"),
            potassium: text("K"),
            ph: text("7"),
            yield_value: "20".to_string(),
            yield_source: YieldSource::Generic,
            confidence: DEFAULT_CONFIDENCE.to_string(),
        }
    }

    /// Text for a template placeholder. Absent values and the markers
    /// `N/A`/`Unknown` render as [`NOT_RECORDED`].
    pub fn placeholder(&self, key: &str) -> Option<&str> {
        let value = match key {
            "district" => self.district.as_deref(),
            "crop" => self.crop.as_deref(),
            "soil" => self.soil.as_deref(),
            "fertilizer" => self.fertilizer.as_deref(),
            "rainfall" => self.rainfall.as_deref(),
            "temperature" => self.temperature.as_deref(),
            "pest" => self.pest.as_deref(),
            "season" => self.season.as_deref(),
            "month" => self.month.as_deref(),
            "nitrogen" => self.nitrogen.as_deref(),
            "phosphorus" => self.phosphorus.as_deref(),
            "potassium" => self.potassium.as_deref(),
            "ph" => self.ph.as_deref(),
            "yield" => Some(self.yield_value.as_str()),
            "confidence" => Some(self.confidence.as_str()),
            _ => return None,
        };
        match value {
            Some(v) if !matches!(v.trim(), "" | "N/A" | "Unknown") => Some(v),
            _ => Some(NOT_RECORDED),
        }
    }

    /// The row's features keyed by training column name.
    pub fn feature_map(&self) -> FeatureMap {
        let entries = [
            ("District_Name", &self.district),
            ("Crop", &self.crop),
            ("Season", &self.season),
            ("Month", &self.month),
            ("Rainfall", &self.rainfall),
            ("Temperature", &self.temperature),
            ("Nitrogen", &self.nitrogen),
            ("Phosphorus", &self.phosphorus),
            ("Potassium", &self.potassium),
            ("pH", &self.ph),
            ("Fertilizer", &self.fertilizer),
            ("Soil_color", &self.soil),
        ];
        entries
            .into_iter()
            .map(|(column, value)| {
                let value = value.clone().map_or(FeatureValue::Null, FeatureValue::Text);
                (column.to_string(), value)
            })
            .collect()
    }
}

/// Rough yield in quintals/acre from nitrogen, rainfall and temperature:
/// `n/2 + rain/100 + (30 - |temp - 25|)`, clamped to `[5, 60]` and rounded to
/// one decimal. Absent inputs default to `n = 0`, `rain = 0`, `temp = 25`.
pub fn estimate_yield(row: Option<&Record<'_>>) -> f64 {
    fn number(row: Option<&Record<'_>>, keys: &[&str], default: f64) -> Option<f64> {
        match safe_get(row, keys) {
            Some(text) => text.parse::<f64>().ok(),
            None => Some(default),
        }
    }

    let (Some(n), Some(rain), Some(temp)) = (
        number(row, &["nitrogen", "n"], 0.0),
        number(row, &["rainfall"], 0.0),
        number(row, &["temperature"], 25.0),
    ) else {
        return HEURISTIC_FALLBACK;
    };

    let base = n / 2.0 + rain / 100.0 + (30.0 - (temp - 25.0).abs());
    if base.is_nan() {
        return HEURISTIC_FALLBACK;
    }
    (base.clamp(5.0, 60.0) * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::RecordIndex;
    use approx::assert_abs_diff_eq;
    use cropyield_data::Dataset;

    const HEADERS: [&str; 9] = [
        "District_Name", "Crop", "Soil_color", "Nitrogen", "Rainfall", "Temperature", "Month", "Yield", "pH",
    ];

    fn index(rows: &[Vec<&str>]) -> RecordIndex {
        RecordIndex::new(Dataset::from_raw_rows(&HEADERS, rows))
    }

    #[test]
    fn test_estimate_yield_formula() {
        let idx = index(&[
            vec!["Pune", "Rice", "Black", "60", "1000", "27", "July", "", "6.5"],
            vec!["Pune", "Rice", "Black", "200", "5000", "25", "July", "", "6.5"],
            vec!["Pune", "Rice", "Black", "0", "0", "60", "July", "", "6.5"],
            vec!["Pune", "Rice", "Black", "high", "0", "25", "July", "", "6.5"],
        ]);
        // 30 + 10 + 28
        assert_abs_diff_eq!(estimate_yield(idx.record(0).as_ref()), 60.0);
        assert_abs_diff_eq!(estimate_yield(idx.record(1).as_ref()), 60.0);
        assert_abs_diff_eq!(estimate_yield(idx.record(2).as_ref()), 5.0);
        assert_abs_diff_eq!(estimate_yield(idx.record(3).as_ref()), HEURISTIC_FALLBACK);
        assert_abs_diff_eq!(estimate_yield(None), 30.0);
    }

    #[test]
    fn test_estimate_yield_rounds_to_one_decimal() {
        let idx = index(&[vec!["Pune", "Rice", "Black", "21", "333", "24", "July", "", "6.5"]]);
        // 10.5 + 3.33 + 29 = 42.83
        assert_abs_diff_eq!(estimate_yield(idx.record(0).as_ref()), 42.8, epsilon = 1e-12);
    }

    #[test]
    fn test_recorded_yield_wins() {
        let idx = index(&[vec!["Pune", "Rice", "Black", "60", "1000", "27", "July", "31.5", "6.5"]]);
        let row = idx.record(0);
        let values = FillValues::from_record(row.as_ref(), None, None, &YieldPredictor::unavailable("test"));
        assert_eq!(values.yield_value, "31.5");
        assert_eq!(values.yield_source, YieldSource::Recorded);
        assert_eq!(values.season.as_deref(), Some("Kharif"));
        assert_eq!(values.district.as_deref(), Some("Pune"));
    }

    #[test]
    fn test_unavailable_model_falls_back_to_heuristic() {
        let idx = index(&[vec!["Pune", "Rice", "Black", "60", "1000", "27", "February", "NA", "6.5"]]);
        let row = idx.record(0);
        let values =
            FillValues::from_record(row.as_ref(), Some("Satara"), None, &YieldPredictor::unavailable("no model"));
        assert_eq!(values.yield_source, YieldSource::Heuristic);
        assert_eq!(values.yield_value, "60");
        assert_eq!(values.season.as_deref(), Some("Rabi"));
        assert_eq!(values.district.as_deref(), Some("Satara"));
        assert_eq!(values.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_placeholders_mask_absent_values() {
        let mut values = FillValues::generic(None, Some("Wheat"));
        values.soil = None;
        values.pest = Some("Unknown".to_string());
        assert_eq!(values.placeholder("crop"), Some("Wheat"));
        assert_eq!(values.placeholder("district"), Some("your district"));
        assert_eq!(values.placeholder("soil"), Some(NOT_RECORDED));
        assert_eq!(values.placeholder("pest"), Some(NOT_RECORDED));
        assert_eq!(values.placeholder("yield"), Some("20"));
        assert_eq!(values.placeholder("alt_crops"), None);
    }

    #[test]
    fn test_feature_map_covers_every_column() {
        let values = FillValues::generic(Some("Pune"), None);
        let map = values.feature_map();
        for column in cropyield_core::NUMERIC_FEATURES.iter().chain(cropyield_core::CATEGORICAL_FEATURES.iter()) {
            assert!(map.contains_key(*column), "{column}");
        }
        assert_eq!(map["District_Name"], FeatureValue::Text("Pune".into()));
        assert_eq!(map["Month"], FeatureValue::Null);
    }
}
