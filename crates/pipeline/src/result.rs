//! The evaluated metric and its flattened row projection.

use serde::Serialize;
use valence_core::types::ensure_same_index;
use valence_core::{MetricSeries, Period, ValenceScoreSeries};

use crate::error::PipelineResult;
use crate::inputs::ResultMetadata;

/// A metric series paired with its combined valence scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricEvaluationResult {
    data: MetricSeries,
    valence_score_series: ValenceScoreSeries,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<ResultMetadata>,
}

/// One period of a [`MetricEvaluationResult`], flattened for renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRow {
    #[serde(rename = "Period")]
    pub period: Period,
    #[serde(rename = "Period Value")]
    pub period_value: Option<f64>,
    #[serde(rename = "Valence Score")]
    pub valence_score: f64,
    #[serde(rename = "Valence Label")]
    pub valence_label: String,
    #[serde(rename = "Valence Description")]
    pub valence_description: String,
    #[serde(rename = "Priority Score")]
    pub priority_score: u32,
    #[serde(rename = "Is Override?")]
    pub is_override: bool,
    #[serde(rename = "Is Ambiguous?")]
    pub is_ambiguous: bool,
    #[serde(rename = "Metric Check Label")]
    pub metric_check_label: String,
}

impl MetricEvaluationResult {
    /// Pair data with scores. The two indices must match.
    pub fn new(
        data: MetricSeries,
        valence_score_series: ValenceScoreSeries,
        metadata: Option<ResultMetadata>,
    ) -> PipelineResult<Self> {
        ensure_same_index(
            data.index(),
            valence_score_series.index(),
            "MetricEvaluationResult data and valence scores",
        )?;
        Ok(Self {
            data,
            valence_score_series,
            metadata,
        })
    }

    pub fn data(&self) -> &MetricSeries {
        &self.data
    }

    pub fn valence_score_series(&self) -> &ValenceScoreSeries {
        &self.valence_score_series
    }

    pub fn metadata(&self) -> Option<&ResultMetadata> {
        self.metadata.as_ref()
    }

    /// One row per period, in index order.
    pub fn to_rows(&self) -> Vec<EvaluationRow> {
        self.data
            .iter()
            .zip(self.valence_score_series.scores())
            .map(|((period, value), score)| EvaluationRow {
                period: *period,
                period_value: *value,
                valence_score: score.valence_score(),
                valence_label: score.valence_label().to_string(),
                valence_description: score.valence_description().to_string(),
                priority_score: score.priority_score(),
                is_override: score.is_override(),
                is_ambiguous: score.is_ambiguous(),
                metric_check_label: score.metric_check_label().to_string(),
            })
            .collect()
    }

    /// The row for the most recent period.
    pub fn current_record(&self) -> Option<EvaluationRow> {
        self.to_rows().pop()
    }
}
