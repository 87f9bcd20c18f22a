//! Farm advisor that turns an intent and language into a filled reply.
//!
//! Values come from a matching row of the reference dataset; the yield is the
//! row's recorded value, the model's prediction, or a rough heuristic, in
//! that order.

pub mod advice;
pub mod advisor;
pub mod fill;
pub mod intent;
pub mod lookup;
pub mod season;
pub mod templates;

pub use advice::{clean_reply, prescriptive_advice, AdviceInputs};
pub use advisor::Advisor;
pub use fill::{estimate_yield, FillValues, YieldSource, NOT_RECORDED};
pub use intent::{Intent, Language};
pub use lookup::{normalize_key, safe_get, Record, RecordIndex};
pub use season::{infer_season, month_number, Season};
pub use templates::{pick_template, render, templates_for};
