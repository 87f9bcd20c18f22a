use crate::error::TrainError;
use cropyield_core::{FeatureFrame, Tensor};
use cropyield_metrics::RegressionReport;
use cropyield_pipeline::Pipeline;
use tracing::info;

/// A fitted candidate and its held-out scores.
#[derive(Debug, Clone)]
pub struct TrainedCandidate {
    pub pipeline: Pipeline,
    pub evaluation: RegressionReport,
}

/// All fitted candidates plus the index of the selected one.
#[derive(Debug, Clone)]
pub struct Selection {
    pub candidates: Vec<TrainedCandidate>,
    pub selected: usize,
}

impl Selection {
    pub fn selected(&self) -> &TrainedCandidate {
        &self.candidates[self.selected]
    }

    pub fn into_selected(mut self) -> TrainedCandidate {
        self.candidates.swap_remove(self.selected)
    }
}

/// Index of the report with the strictly lowest RMSE, scanning in order.
/// An equal RMSE keeps the earlier candidate; NaN never wins.
pub fn select_best(reports: &[RegressionReport]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, report) in reports.iter().enumerate() {
        if report.rmse.is_nan() {
            continue;
        }
        match best {
            Some((_, rmse)) if report.rmse >= rmse => {}
            _ => best = Some((i, report.rmse)),
        }
    }
    best.map(|(i, _)| i)
}

/// Fit every candidate on the training split, score each on the held-out
/// split and select the lowest RMSE.
pub fn train_and_select(
    candidates: Vec<Pipeline>,
    x_train: &FeatureFrame,
    y_train: &Tensor<f64>,
    x_test: &FeatureFrame,
    y_test: &Tensor<f64>,
) -> Result<Selection, TrainError> {
    let mut trained = Vec::with_capacity(candidates.len());
    for mut pipeline in candidates {
        info!(kind = %pipeline.kind(), rows = x_train.n_rows(), "fitting candidate");
        pipeline.fit(x_train, y_train)?;
        let evaluation = RegressionReport::evaluate(y_test, &pipeline.predict(x_test)?)?;
        info!(
            kind = %pipeline.kind(),
            rmse = evaluation.rmse,
            mae = evaluation.mae,
            r2 = evaluation.r2,
            "evaluated candidate"
        );
        trained.push(TrainedCandidate { pipeline, evaluation });
    }

    let reports: Vec<RegressionReport> = trained.iter().map(|c| c.evaluation).collect();
    let selected = select_best(&reports).ok_or(TrainError::NoViableCandidate)?;
    info!(
        kind = %trained[selected].pipeline.kind(),
        rmse = trained[selected].evaluation.rmse,
        "selected candidate"
    );
    Ok(Selection {
        candidates: trained,
        selected,
    })
}
