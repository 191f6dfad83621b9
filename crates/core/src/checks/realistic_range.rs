//! Realistic range check: a hard plausibility bound.
//!
//! A value outside `[lower_bound, upper_bound]` scores ±1 and is flagged
//! ambiguous, since it may be a data error rather than a real signal.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::MetricSeries;
use crate::valence_labels::LABEL_NORMAL;
use crate::valence_score::ValenceScore;
use crate::valence_score_series::ValenceScoreSeries;

use super::{no_data_score, validate_metric_input};

pub const METRIC_CHECK_LABEL: &str = "Realistic Range Metric Check";

/// Ranks ahead of the statistical checks so a plausibility breach is not
/// masked by them.
pub const DEFAULT_REALISTIC_RANGE_PRIORITY: u32 = 1;

pub const LABEL_ABOVE_REALISTIC_RANGE: &str = "Above Realistic Range";
pub const LABEL_BELOW_REALISTIC_RANGE: &str = "Below Realistic Range";

/// Tunable parameters for [`RealisticRangeMetricCheck`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealisticRangeConfig {
    pub lower_bound: f64,
    pub upper_bound: f64,
    #[serde(default = "default_priority")]
    pub priority_score: u32,
}

fn default_priority() -> u32 {
    DEFAULT_REALISTIC_RANGE_PRIORITY
}

impl RealisticRangeConfig {
    pub fn new(lower_bound: f64, upper_bound: f64) -> Self {
        Self {
            lower_bound,
            upper_bound,
            priority_score: DEFAULT_REALISTIC_RANGE_PRIORITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RealisticRangeConfig", into = "RealisticRangeConfig")]
pub struct RealisticRangeMetricCheck {
    config: RealisticRangeConfig,
}

impl RealisticRangeMetricCheck {
    pub fn try_new(config: RealisticRangeConfig) -> Result<Self, CoreError> {
        Self::try_from(config)
    }

    pub fn config(&self) -> &RealisticRangeConfig {
        &self.config
    }

    pub fn apply(&self, series: &MetricSeries) -> Result<ValenceScoreSeries, CoreError> {
        validate_metric_input(series)?;

        let scores = series
            .values()
            .iter()
            .map(|value| match value {
                Some(value) => self.score(*value),
                None => no_data_score(METRIC_CHECK_LABEL, self.config.priority_score),
            })
            .collect();

        Ok(ValenceScoreSeries::from_parts(series.index(), scores))
    }

    fn score(&self, value: f64) -> ValenceScore {
        let score = if value > self.config.upper_bound {
            ValenceScore::new(
                1.0,
                LABEL_ABOVE_REALISTIC_RANGE,
                "Result is higher than makes sense for this metric.",
            )
            .with_ambiguous(true)
        } else if value < self.config.lower_bound {
            ValenceScore::new(
                -1.0,
                LABEL_BELOW_REALISTIC_RANGE,
                "Result is lower than makes sense for this metric.",
            )
            .with_ambiguous(true)
        } else {
            ValenceScore::new(0.0, LABEL_NORMAL, "Result makes sense for this metric.")
        };
        score
            .with_priority(self.config.priority_score)
            .with_metric_check_label(METRIC_CHECK_LABEL)
    }
}

impl TryFrom<RealisticRangeConfig> for RealisticRangeMetricCheck {
    type Error = CoreError;

    fn try_from(config: RealisticRangeConfig) -> Result<Self, Self::Error> {
        if !config.lower_bound.is_finite() || !config.upper_bound.is_finite() {
            return Err(CoreError::Configuration(
                "realistic range bounds must be finite numbers".to_string(),
            ));
        }
        if config.lower_bound >= config.upper_bound {
            return Err(CoreError::Configuration(format!(
                "lower_bound ({}) must be less than upper_bound ({})",
                config.lower_bound, config.upper_bound
            )));
        }
        Ok(Self { config })
    }
}

impl From<RealisticRangeMetricCheck> for RealisticRangeConfig {
    fn from(check: RealisticRangeMetricCheck) -> Self {
        check.config
    }
}
