use cropyield_core::FieldValue;
use cropyield_data::{DataError, Dataset};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Cell texts that [`safe_get`] treats as absent, compared case-insensitively.
const ABSENT_TEXT: [&str; 3] = ["nan", "none", "n/a"];

/// `" Soil Color"` becomes `soil_color`, whatever the CSV header spelling.
pub fn normalize_key(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// A dataset indexed by normalized column name.
#[derive(Debug, Clone)]
pub struct RecordIndex {
    dataset: Dataset,
    keys: HashMap<String, usize>,
}

impl RecordIndex {
    pub fn new(dataset: Dataset) -> Self {
        // later headers overwrite earlier ones with the same normalized name
        let keys = dataset
            .headers()
            .iter()
            .enumerate()
            .map(|(i, h)| (normalize_key(h), i))
            .collect();
        RecordIndex { dataset, keys }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        Ok(Self::new(Dataset::from_csv(path)?))
    }

    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn record(&self, i: usize) -> Option<Record<'_>> {
        self.dataset.rows().get(i).map(|cells| Record {
            keys: &self.keys,
            cells,
        })
    }

    /// Rows whose district and crop equal the given values, ignoring case and
    /// surrounding whitespace. A `None` or blank filter matches every row.
    pub fn matching(&self, district: Option<&str>, crop: Option<&str>) -> Vec<Record<'_>> {
        let district = district.map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase);
        let crop = crop.map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase);

        (0..self.len())
            .filter_map(|i| self.record(i))
            .filter(|r| district.as_deref().map_or(true, |d| r.matches("district_name", d)))
            .filter(|r| crop.as_deref().map_or(true, |c| r.matches("crop", c)))
            .collect()
    }

    /// A random row among the matches, or `None` if nothing matches.
    pub fn find_row<R: Rng + ?Sized>(
        &self,
        district: Option<&str>,
        crop: Option<&str>,
        rng: &mut R,
    ) -> Option<Record<'_>> {
        let candidates = self.matching(district, crop);
        debug!(?district, ?crop, matches = candidates.len(), "dataset lookup");
        candidates.choose(rng).copied()
    }
}

/// One dataset row, read through normalized column names.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    keys: &'a HashMap<String, usize>,
    cells: &'a [FieldValue],
}

impl<'a> Record<'a> {
    pub fn get(&self, key: &str) -> Option<&'a FieldValue> {
        self.keys.get(key).and_then(|&i| self.cells.get(i))
    }

    fn matches(&self, key: &str, lowered: &str) -> bool {
        self.get(key)
            .and_then(FieldValue::category_text)
            .map_or(false, |text| text.trim().to_lowercase() == lowered)
    }
}

/// Text of the first of `keys` that holds a real value.
pub fn safe_get(row: Option<&Record<'_>>, keys: &[&str]) -> Option<String> {
    let row = row?;
    keys.iter()
        .filter_map(|k| row.get(k).and_then(FieldValue::category_text))
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty() && !ABSENT_TEXT.contains(&text.to_lowercase().as_str()))
}
