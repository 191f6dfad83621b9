//! Change in steady state check.
//!
//! Tracks how many consecutive periods the metric has stayed on one side
//! of its own window mean. A run of `l1_threshold` periods is actionable;
//! the score ramps from 0.01 to 1 between `l1_threshold` and `l2_threshold`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::threshold_validation::validate_window;
use crate::types::MetricSeries;
use crate::valence_labels::Directionality;
use crate::valence_score::DEFAULT_PRIORITY_SCORE;
use crate::valence_score_series::ValenceScoreSeries;
use crate::window::{window_mean, Window};

use super::{directional_score, neutral_score, no_data_score, validate_metric_input};

pub const METRIC_CHECK_LABEL: &str = "Change in Steady State Check";

const NOT_ENOUGH_DATA: &str = "Not enough data to calculate the historical mean.";
const DESCRIPTIONS: [&str; 5] = [
    "Significant drop in steady state below historical mean.",
    "Drop in steady state below historical mean.",
    "No significant change from historical mean.",
    "Rise in steady state above historical mean.",
    "Significant rise in steady state above historical mean.",
];

/// Tunable parameters for [`ChangeInSteadyStateMetricCheck`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeInSteadyStateConfig {
    pub is_higher_better: bool,
    pub is_lower_better: bool,
    pub is_rolling_window: bool,
    pub rolling_periods: usize,
    pub minimum_periods: usize,
    /// Run length at which the check becomes actionable.
    pub l1_threshold: u32,
    /// Run length at which the score saturates.
    pub l2_threshold: u32,
    pub priority_score: u32,
}

impl Default for ChangeInSteadyStateConfig {
    fn default() -> Self {
        Self {
            is_higher_better: true,
            is_lower_better: false,
            is_rolling_window: true,
            rolling_periods: 14,
            minimum_periods: 1,
            l1_threshold: 7,
            l2_threshold: 9,
            priority_score: DEFAULT_PRIORITY_SCORE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ChangeInSteadyStateConfig", into = "ChangeInSteadyStateConfig")]
pub struct ChangeInSteadyStateMetricCheck {
    config: ChangeInSteadyStateConfig,
    direction: Directionality,
}

impl ChangeInSteadyStateMetricCheck {
    pub fn try_new(config: ChangeInSteadyStateConfig) -> Result<Self, CoreError> {
        Self::try_from(config)
    }

    pub fn config(&self) -> &ChangeInSteadyStateConfig {
        &self.config
    }

    pub fn apply(&self, series: &MetricSeries) -> Result<ValenceScoreSeries, CoreError> {
        validate_metric_input(series)?;

        let config = &self.config;
        let window = Window::from_config(config.is_rolling_window, config.rolling_periods);
        let values = series.values();
        let means = window_mean(values, window, config.minimum_periods);

        let mut run: i64 = 0;
        let mut scores = Vec::with_capacity(values.len());
        for (value, mean) in values.iter().zip(&means) {
            let (Some(value), Some(mean)) = (value, mean) else {
                run = 0;
                scores.push(match value {
                    None => no_data_score(METRIC_CHECK_LABEL, config.priority_score),
                    Some(_) => {
                        neutral_score(NOT_ENOUGH_DATA, METRIC_CHECK_LABEL, config.priority_score)
                    }
                });
                continue;
            };

            run = next_run(run, side_of_mean(*value, *mean));
            let raw = self.raw_score(run);
            scores.push(directional_score(
                raw,
                self.direction,
                DESCRIPTIONS,
                METRIC_CHECK_LABEL,
                config.priority_score,
            ));
        }

        Ok(ValenceScoreSeries::from_parts(series.index(), scores))
    }

    fn raw_score(&self, run: i64) -> f64 {
        let length = run.unsigned_abs() as f64;
        let l1 = f64::from(self.config.l1_threshold);
        let l2 = f64::from(self.config.l2_threshold);
        if length < l1 {
            return 0.0;
        }
        let magnitude = (0.01 + (length - l1) / (l2 - l1)).min(1.0);
        magnitude * run.signum() as f64
    }
}

/// -1 below the mean, 1 above, 0 on it.
fn side_of_mean(value: f64, mean: f64) -> i64 {
    if value > mean {
        1
    } else if value < mean {
        -1
    } else {
        0
    }
}

/// Extend a run on the same side, restart it on a flip, clear it on the mean.
fn next_run(run: i64, side: i64) -> i64 {
    match side {
        0 => 0,
        _ if run.signum() == side => run + side,
        _ => side,
    }
}

impl Default for ChangeInSteadyStateMetricCheck {
    fn default() -> Self {
        Self {
            config: ChangeInSteadyStateConfig::default(),
            direction: Directionality::HigherIsBetter,
        }
    }
}

impl TryFrom<ChangeInSteadyStateConfig> for ChangeInSteadyStateMetricCheck {
    type Error = CoreError;

    fn try_from(config: ChangeInSteadyStateConfig) -> Result<Self, Self::Error> {
        let direction =
            Directionality::from_flags(config.is_higher_better, config.is_lower_better)?;
        validate_window(config.is_rolling_window, config.rolling_periods, config.minimum_periods)?;
        if config.l1_threshold == 0 {
            return Err(CoreError::Configuration(
                "l1_threshold must be at least 1".to_string(),
            ));
        }
        if config.l1_threshold >= config.l2_threshold {
            return Err(CoreError::Configuration(format!(
                "l1_threshold ({}) must be less than l2_threshold ({})",
                config.l1_threshold, config.l2_threshold
            )));
        }
        Ok(Self { config, direction })
    }
}

impl From<ChangeInSteadyStateMetricCheck> for ChangeInSteadyStateConfig {
    fn from(check: ChangeInSteadyStateMetricCheck) -> Self {
        check.config
    }
}
