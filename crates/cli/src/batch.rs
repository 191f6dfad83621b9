//! Batch documents: many metrics evaluated in one run.
//!
//! Input:
//!
//! ```json
//! {
//!   "pipeline": { "append_to_metric_checks": [{ "check": "realistic_range", "lower_bound": 0, "upper_bound": 1000 }] },
//!   "metrics": [
//!     {
//!       "name": "Daily signups",
//!       "url": "https://example.com/signups",
//!       "index": ["2050-01-01", "2050-01-02", "2050-01-03"],
//!       "values": [120, 131, null],
//!       "annotations": ["", "Promo email sent", null]
//!     }
//!   ]
//! }
//! ```
//!
//! `index` may be omitted for an ordinal `0..n` index. Auxiliary series
//! (`annotations`, `target`, `forecast`, `reference`) must match `values`
//! in length.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use valence_core::types::ordinal_index;
use valence_core::{AnnotationSeries, MetricSeries, Period};
use valence_pipeline::{
    EvaluationInputs, EvaluationRow, MetricEvaluationPipeline, PipelineConfig, ResultMetadata,
};

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct BatchInput {
    /// Check list for every metric; the default pipeline when absent.
    #[serde(default)]
    pub pipeline: Option<PipelineConfig>,
    pub metrics: Vec<MetricInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricInput {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub index: Option<Vec<Period>>,
    pub values: Vec<Option<f64>>,
    #[serde(default)]
    pub annotations: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub target: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub forecast: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub reference: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutput {
    pub results: Vec<MetricOutput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricOutput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// The most recent period's verdict.
    pub current: Option<EvaluationRow>,
    pub rows: Vec<EvaluationRow>,
}

impl MetricInput {
    /// Build the primary series and auxiliary inputs for one pipeline run.
    pub fn into_evaluation(self) -> Result<(MetricSeries, EvaluationInputs)> {
        let index = match self.index {
            Some(index) => index,
            None => ordinal_index(self.values.len()),
        };
        let numeric = |values: Vec<Option<f64>>, what: &str| {
            MetricSeries::new(index.clone(), values)
                .with_context(|| format!("invalid {what} series for metric '{}'", self.name))
        };

        let series = numeric(self.values, "value")?;
        let mut metadata = ResultMetadata::new(self.name.clone());
        if let Some(url) = self.url {
            metadata = metadata.with_url(url);
        }
        let mut inputs = EvaluationInputs::new().with_metadata(metadata);

        if let Some(notes) = self.annotations {
            let notes = notes.into_iter().map(Option::unwrap_or_default).collect();
            let annotations = AnnotationSeries::new(index.clone(), notes)
                .with_context(|| format!("invalid annotations for metric '{}'", self.name))?;
            inputs = inputs.with_annotations(annotations);
        }
        if let Some(values) = self.target {
            inputs = inputs.with_target(numeric(values, "target")?);
        }
        if let Some(values) = self.forecast {
            inputs = inputs.with_forecast(numeric(values, "forecast")?);
        }
        if let Some(values) = self.reference {
            inputs = inputs.with_reference(numeric(values, "reference")?);
        }

        Ok((series, inputs))
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

pub fn load_batch(path: &Path) -> Result<BatchInput> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read batch input {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse batch input {}", path.display()))
}

pub fn load_pipeline_config(path: &Path) -> Result<PipelineConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read pipeline config {}", path.display()))?;
    PipelineConfig::from_json_str(&raw)
        .with_context(|| format!("invalid pipeline config {}", path.display()))
}

// ---------------------------------------------------------------------------
// Running
// ---------------------------------------------------------------------------

/// Evaluate every metric in `batch`.
///
/// `pipeline_override` takes precedence over the document's own
/// `pipeline` section. The first failing metric aborts the run.
pub fn run_batch(
    batch: BatchInput,
    pipeline_override: Option<PipelineConfig>,
) -> Result<BatchOutput> {
    let config = pipeline_override.or(batch.pipeline).unwrap_or_default();
    let pipeline = MetricEvaluationPipeline::from_config(config);
    tracing::info!(
        metrics = batch.metrics.len(),
        checks = pipeline.metric_checks().len(),
        "Running batch"
    );

    let mut results = Vec::with_capacity(batch.metrics.len());
    for metric in batch.metrics {
        let name = metric.name.clone();
        let url = metric.url.clone();
        let (series, inputs) = metric.into_evaluation()?;

        let result = pipeline
            .apply(&series, &inputs)
            .with_context(|| format!("failed to evaluate metric '{name}'"))?;
        tracing::debug!(metric = %name, periods = series.len(), "Metric done");

        results.push(MetricOutput {
            name,
            url,
            current: result.current_record(),
            rows: result.to_rows(),
        });
    }

    Ok(BatchOutput { results })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(values: &[f64]) -> MetricInput {
        MetricInput {
            name: "Signups".into(),
            url: None,
            index: None,
            values: values.iter().copied().map(Some).collect(),
            annotations: None,
            target: None,
            forecast: None,
            reference: None,
        }
    }

    #[test]
    fn omitted_index_is_ordinal() {
        let (series, inputs) = metric(&[1.0, 2.0, 3.0]).into_evaluation().unwrap();
        assert_eq!(series.index(), ordinal_index(3).as_slice());
        assert_eq!(inputs.metadata.unwrap().name, "Signups");
    }

    #[test]
    fn null_annotations_read_as_empty() {
        let mut input = metric(&[1.0, 2.0]);
        input.annotations = Some(vec![None, Some("Launch".into())]);
        let (_, inputs) = input.into_evaluation().unwrap();
        let annotations = inputs.annotations.unwrap();
        assert_eq!(annotations.values(), &["".to_string(), "Launch".to_string()]);
    }

    #[test]
    fn short_target_rejected() {
        let mut input = metric(&[1.0, 2.0, 3.0]);
        input.target = Some(vec![Some(1.0)]);
        let err = input.into_evaluation().unwrap_err();
        assert!(err.to_string().contains("target"));
    }

    #[test]
    fn override_config_wins_over_document() {
        let batch = BatchInput {
            pipeline: Some(PipelineConfig::default()),
            metrics: vec![metric(&[1.0, 2.0])],
        };
        let only_annotations =
            PipelineConfig::from_json_str(r#"{"metric_checks": [{"check": "annotate_and_snooze"}]}"#)
                .unwrap();
        let output = run_batch(batch, Some(only_annotations)).unwrap();
        let current = output.results[0].current.as_ref().unwrap();
        assert_eq!(current.metric_check_label, "Annotate And Snooze Metric Check");
    }
}
