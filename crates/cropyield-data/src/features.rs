use crate::dataset::Dataset;
use crate::error::DataError;
use cropyield_core::{FeatureFrame, FeatureFrameBuilder, FeatureSchema, Tensor};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// Feature rows paired with their regression targets.
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub features: FeatureFrame,
    pub target: Tensor<f64>,
}

impl TrainingData {
    pub fn n_rows(&self) -> usize {
        self.features.n_rows()
    }

    pub fn select_rows(&self, indices: &[usize]) -> Result<Self, DataError> {
        Ok(TrainingData {
            features: self.features.select_rows(indices)?,
            target: self.target.select_rows(indices)?,
        })
    }
}

/// Build the feature frame for `schema`, keeping only rows whose target
/// parses as a finite number. Missing or unparseable numeric cells become
/// NaN; missing categorical cells become `None`.
pub fn build_training_data(
    dataset: &Dataset,
    schema: &FeatureSchema,
    target: &str,
) -> Result<TrainingData, DataError> {
    let target_idx = dataset
        .column_index(target)
        .ok_or_else(|| DataError::MissingTarget {
            target: target.to_string(),
            headers: dataset.headers().to_vec(),
        })?;
    let numeric_idx = resolve_columns(dataset, schema.numeric())?;
    let categorical_idx = resolve_columns(dataset, schema.categorical())?;

    let mut builder =
        FeatureFrameBuilder::with_capacity(numeric_idx.len(), categorical_idx.len(), dataset.len());
    let mut y = Vec::with_capacity(dataset.len());
    let mut dropped = 0usize;
    let mut numeric_row = vec![0.0; numeric_idx.len()];

    for row in dataset.rows() {
        let Some(target_value) = row[target_idx].as_finite() else {
            dropped += 1;
            continue;
        };
        for (slot, &idx) in numeric_row.iter_mut().zip(&numeric_idx) {
            *slot = row[idx].as_finite().unwrap_or(f64::NAN);
        }
        let categorical_row = categorical_idx
            .iter()
            .map(|&idx| row[idx].category_text())
            .collect();
        builder.push_row(&numeric_row, categorical_row)?;
        y.push(target_value);
    }

    if y.is_empty() {
        return Err(DataError::NoUsableRows);
    }
    debug!(kept = y.len(), dropped, "built training rows");

    Ok(TrainingData {
        features: builder.finish()?,
        target: Tensor::from_slice(&y),
    })
}

fn resolve_columns(dataset: &Dataset, names: &[String]) -> Result<Vec<usize>, DataError> {
    names
        .iter()
        .map(|name| {
            dataset
                .column_index(name)
                .ok_or_else(|| DataError::MissingColumn(name.clone()))
        })
        .collect()
}

/// Seeded sampling without replacement. A fraction of 1.0 or more returns
/// the data unchanged; smaller fractions keep `floor(n * fraction)` rows.
/// Sampling down to zero rows is [`DataError::NoUsableRows`].
pub fn sample_rows(data: &TrainingData, fraction: f64, seed: u64) -> Result<TrainingData, DataError> {
    let n = data.n_rows();
    if fraction >= 1.0 {
        return Ok(data.clone());
    }
    let k = ((n as f64 * fraction).floor() as usize).min(n);
    if k == 0 {
        return Err(DataError::NoUsableRows);
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let indices = rand::seq::index::sample(&mut rng, n, k).into_vec();
    info!(rows = k, of = n, "sampled training rows");
    data.select_rows(&indices)
}
