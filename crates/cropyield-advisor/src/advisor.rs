use crate::advice::{prescriptive_advice, AdviceInputs};
use crate::fill::FillValues;
use crate::intent::{Intent, Language};
use crate::lookup::RecordIndex;
use crate::templates::{pick_template, render};
use cropyield_inference::YieldPredictor;
use rand::Rng;
use std::path::Path;
use tracing::{debug, info, warn};

/// Answers farmer questions from a reference dataset and a yield predictor.
/// Both are fixed at construction; a missing dataset switches replies to
/// generic wording.
#[derive(Debug, Clone)]
pub struct Advisor {
    records: Option<RecordIndex>,
    predictor: YieldPredictor,
}

impl Advisor {
    pub fn new(records: Option<RecordIndex>, predictor: YieldPredictor) -> Self {
        Advisor { records, predictor }
    }

    /// Load the reference dataset at `data_path`. A dataset that cannot be
    /// read is logged and replies fall back to generic wording.
    pub fn open<P: AsRef<Path>>(data_path: P, predictor: YieldPredictor) -> Self {
        let path = data_path.as_ref();
        let records = match RecordIndex::open(path) {
            Ok(records) => {
                info!(path = %path.display(), rows = records.len(), "advisor dataset loaded");
                Some(records)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "advisor dataset unavailable, using generic replies");
                None
            }
        };
        Advisor::new(records, predictor)
    }

    pub fn has_dataset(&self) -> bool {
        self.records.is_some()
    }

    pub fn predictor(&self) -> &YieldPredictor {
        &self.predictor
    }

    pub fn fill_values_with_rng<R: Rng + ?Sized>(
        &self,
        district: Option<&str>,
        crop: Option<&str>,
        rng: &mut R,
    ) -> FillValues {
        match &self.records {
            Some(records) => {
                let row = records.find_row(district, crop, rng);
                FillValues::from_record(row.as_ref(), district, crop, &self.predictor)
            }
            None => FillValues::generic(district, crop),
        }
    }

    /// One filled template for `intent` in `lang`.
    pub fn reply_with_rng<R: Rng + ?Sized>(
        &self,
        intent: Intent,
        lang: Language,
        district: Option<&str>,
        crop: Option<&str>,
        rng: &mut R,
    ) -> String {
        let values = self.fill_values_with_rng(district, crop, rng);
        let template = pick_template(intent, lang, rng);
        debug!(%intent, %lang, template, "rendering reply");
        render(template, |key| values.placeholder(key))
    }

    pub fn reply(&self, intent: Intent, lang: Language, district: Option<&str>, crop: Option<&str>) -> String {
        self.reply_with_rng(intent, lang, district, crop, &mut rand::thread_rng())
    }

    /// Prescriptive advice for a matched row. `None` when the row has no
    /// usable rainfall or temperature, or no dataset is loaded.
    pub fn advice_with_rng<R: Rng + ?Sized>(
        &self,
        district: Option<&str>,
        crop: Option<&str>,
        rng: &mut R,
    ) -> Option<String> {
        self.records.as_ref()?;
        let values = self.fill_values_with_rng(district, crop, rng);
        AdviceInputs::from_fill(&values).map(|input| prescriptive_advice(&input))
    }

    pub fn advice(&self, district: Option<&str>, crop: Option<&str>) -> Option<String> {
        self.advice_with_rng(district, crop, &mut rand::thread_rng())
    }
}
