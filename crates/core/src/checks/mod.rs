//! Metric checks.
//!
//! Each check is a configuration-only struct with an `apply` method that
//! turns a metric series into a [`ValenceScoreSeries`] on the same index.
//! Checks never mutate themselves, so one instance can be applied to any
//! number of series.
//!
//! [`MetricCheck`] is the closed set of variants the pipeline runs. Each
//! variant declares the auxiliary inputs it consumes through
//! [`MetricCheck::required_inputs`].

pub mod annotate_and_snooze;
pub mod change_in_steady_state;
pub mod compare_to_baseline;
pub mod manual_four_threshold;
pub mod realistic_range;
pub mod static_normal_range;
pub mod sudden_change;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use annotate_and_snooze::AnnotateAndSnoozeMetricCheck;
pub use change_in_steady_state::{ChangeInSteadyStateConfig, ChangeInSteadyStateMetricCheck};
pub use compare_to_baseline::{Baseline, CompareToBaselineConfig, CompareToBaselineMetricCheck};
pub use manual_four_threshold::{ManualFourThresholdConfig, ManualFourThresholdMetricCheck};
pub use realistic_range::{RealisticRangeConfig, RealisticRangeMetricCheck};
pub use static_normal_range::{StaticNormalRangeConfig, StaticNormalRangeMetricCheck};
pub use sudden_change::{SuddenChangeConfig, SuddenChangeMetricCheck};

use crate::error::CoreError;
use crate::types::{ensure_same_index, AnnotationSeries, MetricSeries};
use crate::valence_labels::{
    map_score_to_string, normalize_valence_score, valence_label_for, Directionality, LABEL_NORMAL,
    NO_DATA_DESCRIPTION,
};
use crate::valence_score::ValenceScore;
use crate::valence_score_series::ValenceScoreSeries;

// ---------------------------------------------------------------------------
// Auxiliary inputs
// ---------------------------------------------------------------------------

/// Optional series a check may consume alongside the metric itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuxiliaryInput {
    Annotations,
    Target,
    Forecast,
    Reference,
}

impl AuxiliaryInput {
    pub fn name(&self) -> &'static str {
        match self {
            AuxiliaryInput::Annotations => "annotations",
            AuxiliaryInput::Target => "target",
            AuxiliaryInput::Forecast => "forecast",
            AuxiliaryInput::Reference => "reference",
        }
    }
}

impl fmt::Display for AuxiliaryInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Borrowed auxiliary series handed to [`MetricCheck::apply`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AuxiliaryInputs<'a> {
    pub annotations: Option<&'a AnnotationSeries>,
    pub target: Option<&'a MetricSeries>,
    pub forecast: Option<&'a MetricSeries>,
    pub reference: Option<&'a MetricSeries>,
}

impl<'a> AuxiliaryInputs<'a> {
    /// Whether the named input was supplied.
    pub fn has(&self, input: AuxiliaryInput) -> bool {
        match input {
            AuxiliaryInput::Annotations => self.annotations.is_some(),
            other => self.numeric(other).is_some(),
        }
    }

    /// The numeric series for `input`. Always `None` for annotations.
    pub fn numeric(&self, input: AuxiliaryInput) -> Option<&'a MetricSeries> {
        match input {
            AuxiliaryInput::Annotations => None,
            AuxiliaryInput::Target => self.target,
            AuxiliaryInput::Forecast => self.forecast,
            AuxiliaryInput::Reference => self.reference,
        }
    }
}

// ---------------------------------------------------------------------------
// MetricCheck
// ---------------------------------------------------------------------------

/// The closed family of metric checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum MetricCheck {
    StaticNormalRange(StaticNormalRangeMetricCheck),
    SuddenChange(SuddenChangeMetricCheck),
    ChangeInSteadyState(ChangeInSteadyStateMetricCheck),
    ManualFourThreshold(ManualFourThresholdMetricCheck),
    RealisticRange(RealisticRangeMetricCheck),
    CompareToBaseline(CompareToBaselineMetricCheck),
    AnnotateAndSnooze(AnnotateAndSnoozeMetricCheck),
}

impl MetricCheck {
    /// The checks a pipeline runs when none are configured. Built fresh on
    /// every call.
    pub fn default_checks() -> Vec<MetricCheck> {
        vec![
            MetricCheck::StaticNormalRange(StaticNormalRangeMetricCheck::default()),
            MetricCheck::SuddenChange(SuddenChangeMetricCheck::default()),
            MetricCheck::AnnotateAndSnooze(AnnotateAndSnoozeMetricCheck::default()),
        ]
    }

    /// Human-readable check label stamped on every score it produces.
    pub fn label(&self) -> &'static str {
        match self {
            MetricCheck::StaticNormalRange(_) => static_normal_range::METRIC_CHECK_LABEL,
            MetricCheck::SuddenChange(_) => sudden_change::METRIC_CHECK_LABEL,
            MetricCheck::ChangeInSteadyState(_) => change_in_steady_state::METRIC_CHECK_LABEL,
            MetricCheck::ManualFourThreshold(_) => manual_four_threshold::METRIC_CHECK_LABEL,
            MetricCheck::RealisticRange(_) => realistic_range::METRIC_CHECK_LABEL,
            MetricCheck::CompareToBaseline(_) => compare_to_baseline::METRIC_CHECK_LABEL,
            MetricCheck::AnnotateAndSnooze(_) => annotate_and_snooze::METRIC_CHECK_LABEL,
        }
    }

    /// Auxiliary inputs this check cannot run without.
    pub fn required_inputs(&self) -> &'static [AuxiliaryInput] {
        match self {
            MetricCheck::AnnotateAndSnooze(_) => &[AuxiliaryInput::Annotations],
            MetricCheck::CompareToBaseline(check) => check.required_inputs(),
            _ => &[],
        }
    }

    /// Run the check. Fails if a required auxiliary input is missing or
    /// any input breaks the index and contiguity rules.
    pub fn apply(
        &self,
        series: &MetricSeries,
        inputs: &AuxiliaryInputs<'_>,
    ) -> Result<ValenceScoreSeries, CoreError> {
        if let Some(missing) = self.required_inputs().iter().find(|input| !inputs.has(**input)) {
            return Err(CoreError::MissingInput {
                check: self.label(),
                input: missing.name(),
            });
        }

        match self {
            MetricCheck::StaticNormalRange(check) => check.apply(series),
            MetricCheck::SuddenChange(check) => check.apply(series),
            MetricCheck::ChangeInSteadyState(check) => check.apply(series),
            MetricCheck::ManualFourThreshold(check) => check.apply(series),
            MetricCheck::RealisticRange(check) => check.apply(series),
            MetricCheck::CompareToBaseline(check) => {
                let baseline = check.baseline().input().and_then(|input| inputs.numeric(input));
                check.apply(series, baseline)
            }
            MetricCheck::AnnotateAndSnooze(check) => match inputs.annotations {
                Some(annotations) => {
                    ensure_same_index(series.index(), annotations.index(), "annotations")?;
                    check.apply(annotations)
                }
                None => Err(CoreError::MissingInput {
                    check: self.label(),
                    input: AuxiliaryInput::Annotations.name(),
                }),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Neutral score for a period with no value.
pub(crate) fn no_data_score(metric_check_label: &str, priority_score: u32) -> ValenceScore {
    neutral_score(NO_DATA_DESCRIPTION, metric_check_label, priority_score)
}

/// Neutral score with an explanatory description.
pub(crate) fn neutral_score(
    description: &str,
    metric_check_label: &str,
    priority_score: u32,
) -> ValenceScore {
    ValenceScore::new(0.0, LABEL_NORMAL, description)
        .with_metric_check_label(metric_check_label)
        .with_priority(priority_score)
}

/// Score a raw result under a directionality.
///
/// `descriptions` is indexed by the raw score's band (see
/// [`map_score_to_string`]) so the text says what happened to the number,
/// while the label says whether that is good.
pub(crate) fn directional_score(
    raw_score: f64,
    direction: Directionality,
    descriptions: [&str; 5],
    metric_check_label: &str,
    priority_score: u32,
) -> ValenceScore {
    let normalized = normalize_valence_score(raw_score, direction);
    ValenceScore::new(
        normalized.score,
        valence_label_for(normalized.score),
        map_score_to_string(raw_score, descriptions),
    )
    .with_ambiguous(normalized.is_ambiguous)
    .with_priority(priority_score)
    .with_metric_check_label(metric_check_label)
}

/// Validate the main metric series before a check runs.
pub(crate) fn validate_metric_input(series: &MetricSeries) -> Result<(), CoreError> {
    series.validate_contiguous("series")
}

/// Prefix a sentence with "Significantly", lower-casing its first letter.
pub(crate) fn significantly(description: &str) -> String {
    let mut chars = description.chars();
    match chars.next() {
        Some(first) => format!("Significantly {}{}", first.to_lowercase(), chars.as_str()),
        None => String::new(),
    }
}
