//! Auxiliary inputs handed to a pipeline run.

use serde::{Deserialize, Serialize};
use valence_core::{AnnotationSeries, AuxiliaryInputs, MetricSeries};

/// Display metadata carried through to the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ResultMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Optional series evaluated alongside the primary metric. Every supplied
/// series must share the metric's index exactly.
#[derive(Debug, Clone, Default)]
pub struct EvaluationInputs {
    pub annotations: Option<AnnotationSeries>,
    pub target: Option<MetricSeries>,
    pub forecast: Option<MetricSeries>,
    pub reference: Option<MetricSeries>,
    pub metadata: Option<ResultMetadata>,
}

impl EvaluationInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_annotations(mut self, annotations: AnnotationSeries) -> Self {
        self.annotations = Some(annotations);
        self
    }

    pub fn with_target(mut self, target: MetricSeries) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_forecast(mut self, forecast: MetricSeries) -> Self {
        self.forecast = Some(forecast);
        self
    }

    pub fn with_reference(mut self, reference: MetricSeries) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_metadata(mut self, metadata: ResultMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Borrow the numeric series, pairing them with the given annotations.
    pub(crate) fn borrow_with<'a>(
        &'a self,
        annotations: &'a AnnotationSeries,
    ) -> AuxiliaryInputs<'a> {
        AuxiliaryInputs {
            annotations: Some(annotations),
            target: self.target.as_ref(),
            forecast: self.forecast.as_ref(),
            reference: self.reference.as_ref(),
        }
    }
}
