//! Runs a configured list of metric checks and folds their verdicts.

use valence_core::types::ensure_same_index;
use valence_core::valence_labels::{
    is_insufficient_data, COMBINED_METRIC_CHECK_LABEL, LABEL_NORMAL,
};
use valence_core::{
    AnnotationSeries, AuxiliaryInput, CoreError, MetricCheck, MetricSeries, ValenceScore,
    ValenceScoreSeries,
};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::inputs::EvaluationInputs;
use crate::result::MetricEvaluationResult;

const NO_CHECKS_DESCRIPTION: &str = "No metric checks were configured.";

/// An ordered list of metric checks, reusable across any number of series.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEvaluationPipeline {
    metric_checks: Vec<MetricCheck>,
}

impl Default for MetricEvaluationPipeline {
    fn default() -> Self {
        Self::new(MetricCheck::default_checks())
    }
}

impl MetricEvaluationPipeline {
    pub fn new(metric_checks: Vec<MetricCheck>) -> Self {
        Self { metric_checks }
    }

    pub fn from_config(config: PipelineConfig) -> Self {
        Self::new(config.into_checks())
    }

    /// The same pipeline with `checks` run after the existing ones.
    pub fn with_appended_checks(mut self, checks: impl IntoIterator<Item = MetricCheck>) -> Self {
        self.metric_checks.extend(checks);
        self
    }

    pub fn metric_checks(&self) -> &[MetricCheck] {
        &self.metric_checks
    }

    /// Evaluate `series` with every configured check and combine the results.
    ///
    /// Fails before any check runs if the series is empty, if any supplied
    /// series has an internal null or a different index, or if a check is
    /// missing an input it requires.
    pub fn apply(
        &self,
        series: &MetricSeries,
        inputs: &EvaluationInputs,
    ) -> PipelineResult<MetricEvaluationResult> {
        if series.is_empty() {
            return Err(PipelineError::EmptySeries);
        }
        series.validate_contiguous("series")?;

        let default_annotations;
        let annotations = match &inputs.annotations {
            Some(annotations) => {
                ensure_same_index(
                    series.index(),
                    annotations.index(),
                    AuxiliaryInput::Annotations.name(),
                )?;
                annotations
            }
            None => {
                default_annotations = AnnotationSeries::empty_for(series.index());
                &default_annotations
            }
        };

        let auxiliary = inputs.borrow_with(annotations);
        for input in [AuxiliaryInput::Target, AuxiliaryInput::Forecast, AuxiliaryInput::Reference] {
            if let Some(numeric) = auxiliary.numeric(input) {
                ensure_same_index(series.index(), numeric.index(), input.name())?;
                numeric.validate_contiguous(input.name())?;
            }
        }
        self.validate_required_inputs(|input| auxiliary.has(input))?;

        let mut check_results = Vec::with_capacity(self.metric_checks.len());
        for check in &self.metric_checks {
            let scores = check.apply(series, &auxiliary)?;
            log_check_result(check, &scores);
            check_results.push(scores);
        }

        let combined = match ValenceScoreSeries::combine_all(&check_results)? {
            Some(combined) => combined,
            None => neutral_series(series)?,
        };
        if combined.index() != series.index() {
            return Err(PipelineError::InvalidOutput(format!(
                "combined valence scores cover {} periods but the series has {}",
                combined.len(),
                series.len()
            )));
        }

        if let Some(latest) = combined.last_record() {
            tracing::info!(
                periods = series.len(),
                checks = self.metric_checks.len(),
                score = latest.valence_score(),
                label = latest.valence_label(),
                "Metric evaluated"
            );
        }

        MetricEvaluationResult::new(series.clone(), combined, inputs.metadata.clone())
    }

    fn validate_required_inputs(
        &self,
        supplied: impl Fn(AuxiliaryInput) -> bool,
    ) -> PipelineResult<()> {
        for check in &self.metric_checks {
            if let Some(missing) = check.required_inputs().iter().find(|input| !supplied(**input)) {
                return Err(CoreError::MissingInput {
                    check: check.label(),
                    input: missing.name(),
                }
                .into());
            }
        }
        Ok(())
    }
}

fn log_check_result(check: &MetricCheck, scores: &ValenceScoreSeries) {
    let actionable = scores
        .scores()
        .iter()
        .filter(|score| score.valence_score() != 0.0)
        .count();
    tracing::debug!(check = check.label(), actionable, "Metric check applied");

    if scores
        .scores()
        .iter()
        .all(|score| is_insufficient_data(score.valence_description()))
    {
        tracing::warn!(
            check = check.label(),
            periods = scores.len(),
            "Metric check had insufficient data for every period"
        );
    }
}

/// All-neutral scores for a pipeline with no checks.
fn neutral_series(series: &MetricSeries) -> Result<ValenceScoreSeries, CoreError> {
    let neutral = ValenceScore::new(0.0, LABEL_NORMAL, NO_CHECKS_DESCRIPTION)
        .with_metric_check_label(COMBINED_METRIC_CHECK_LABEL);
    ValenceScoreSeries::new(series.index().to_vec(), vec![neutral; series.len()])
}
