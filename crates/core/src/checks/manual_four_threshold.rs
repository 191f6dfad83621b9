//! Manual four-threshold check.
//!
//! Four caller-supplied thresholds split the value axis into
//! extraordinarily low, low, normal, high and extraordinarily high bands.
//! The score is ±1 at or beyond the outer thresholds, 0 inside
//! `[threshold_2, threshold_3]`, and ramps from ±0.01 in between.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::threshold_validation::validate_strictly_increasing;
use crate::types::MetricSeries;
use crate::valence_labels::Directionality;
use crate::valence_score::DEFAULT_PRIORITY_SCORE;
use crate::valence_score_series::ValenceScoreSeries;

use super::{directional_score, no_data_score, significantly, validate_metric_input};

pub const METRIC_CHECK_LABEL: &str = "Manual Four Threshold Check";

const LOWER: &str = "Lower than normal based on manual thresholds.";
const NORMAL: &str = "Within the range of normal based on manual thresholds.";
const HIGHER: &str = "Higher than normal based on manual thresholds.";

/// Tunable parameters for [`ManualFourThresholdMetricCheck`]. The four
/// thresholds have no defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualFourThresholdConfig {
    /// Upper bound of extraordinarily low.
    pub threshold_1: f64,
    /// Lower bound of normal.
    pub threshold_2: f64,
    /// Upper bound of normal.
    pub threshold_3: f64,
    /// Lower bound of extraordinarily high.
    pub threshold_4: f64,
    #[serde(default = "default_true")]
    pub is_higher_better: bool,
    #[serde(default)]
    pub is_lower_better: bool,
    #[serde(default = "default_priority")]
    pub priority_score: u32,
}

fn default_true() -> bool {
    true
}

fn default_priority() -> u32 {
    DEFAULT_PRIORITY_SCORE
}

impl ManualFourThresholdConfig {
    /// Thresholds with the default directionality and priority.
    pub fn new(threshold_1: f64, threshold_2: f64, threshold_3: f64, threshold_4: f64) -> Self {
        Self {
            threshold_1,
            threshold_2,
            threshold_3,
            threshold_4,
            is_higher_better: true,
            is_lower_better: false,
            priority_score: DEFAULT_PRIORITY_SCORE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ManualFourThresholdConfig", into = "ManualFourThresholdConfig")]
pub struct ManualFourThresholdMetricCheck {
    config: ManualFourThresholdConfig,
    direction: Directionality,
}

impl ManualFourThresholdMetricCheck {
    pub fn try_new(config: ManualFourThresholdConfig) -> Result<Self, CoreError> {
        Self::try_from(config)
    }

    pub fn config(&self) -> &ManualFourThresholdConfig {
        &self.config
    }

    pub fn apply(&self, series: &MetricSeries) -> Result<ValenceScoreSeries, CoreError> {
        validate_metric_input(series)?;

        let significantly_lower = significantly(LOWER);
        let significantly_higher = significantly(HIGHER);
        let descriptions = [
            significantly_lower.as_str(),
            LOWER,
            NORMAL,
            HIGHER,
            significantly_higher.as_str(),
        ];

        let scores = series
            .values()
            .iter()
            .map(|value| match value {
                Some(value) => directional_score(
                    self.raw_score(*value),
                    self.direction,
                    descriptions,
                    METRIC_CHECK_LABEL,
                    self.config.priority_score,
                ),
                None => no_data_score(METRIC_CHECK_LABEL, self.config.priority_score),
            })
            .collect();

        Ok(ValenceScoreSeries::from_parts(series.index(), scores))
    }

    fn raw_score(&self, value: f64) -> f64 {
        let ManualFourThresholdConfig {
            threshold_1: t1,
            threshold_2: t2,
            threshold_3: t3,
            threshold_4: t4,
            ..
        } = self.config;

        if value <= t1 {
            -1.0
        } else if value < t2 {
            (-0.01 - (t2 - value) / (t2 - t1)).max(-1.0)
        } else if value >= t4 {
            1.0
        } else if value > t3 {
            (0.01 + (value - t3) / (t4 - t3)).min(1.0)
        } else {
            0.0
        }
    }
}

impl TryFrom<ManualFourThresholdConfig> for ManualFourThresholdMetricCheck {
    type Error = CoreError;

    fn try_from(config: ManualFourThresholdConfig) -> Result<Self, Self::Error> {
        let direction =
            Directionality::from_flags(config.is_higher_better, config.is_lower_better)?;
        validate_strictly_increasing(&[
            ("threshold_1", config.threshold_1),
            ("threshold_2", config.threshold_2),
            ("threshold_3", config.threshold_3),
            ("threshold_4", config.threshold_4),
        ])?;
        Ok(Self { config, direction })
    }
}

impl From<ManualFourThresholdMetricCheck> for ManualFourThresholdConfig {
    fn from(check: ManualFourThresholdMetricCheck) -> Self {
        check.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valence_labels::{LABEL_UNUSUALLY_BAD, LABEL_UNUSUALLY_GOOD, LABEL_WORSE_THAN_NORMAL};
    use assert_matches::assert_matches;

    fn check() -> ManualFourThresholdMetricCheck {
        let config = ManualFourThresholdConfig::new(10.0, 20.0, 30.0, 40.0);
        ManualFourThresholdMetricCheck::try_new(config).unwrap()
    }

    #[test]
    fn scores_inside_and_beyond_outer_thresholds() {
        let result = check().apply(&MetricSeries::from_values([25.0, 5.0, 45.0])).unwrap();
        let scores: Vec<f64> = result.scores().iter().map(|s| s.valence_score()).collect();
        assert_eq!(scores, vec![0.0, -1.0, 1.0]);
        assert_eq!(result.scores()[1].valence_label(), LABEL_UNUSUALLY_BAD);
        assert_eq!(result.scores()[2].valence_label(), LABEL_UNUSUALLY_GOOD);
        assert_eq!(
            result.scores()[2].valence_description(),
            "Significantly higher than normal based on manual thresholds."
        );
    }

    #[test]
    fn inner_band_has_floor_magnitude() {
        let result = check().apply(&MetricSeries::from_values([15.0, 20.0, 30.0, 35.0])).unwrap();
        let scores: Vec<f64> = result.scores().iter().map(|s| s.valence_score()).collect();
        assert!((scores[0] + 0.51).abs() < 1e-9);
        assert_eq!(scores[1], 0.0);
        assert_eq!(scores[2], 0.0);
        assert!((scores[3] - 0.51).abs() < 1e-9);
        assert_eq!(result.scores()[0].valence_label(), LABEL_WORSE_THAN_NORMAL);
        assert_eq!(
            result.scores()[0].valence_description(),
            "Lower than normal based on manual thresholds."
        );
    }

    #[test]
    fn just_below_outer_threshold_stays_below_one() {
        let score = check().raw_score(39.99);
        assert!(score > 0.99 && score <= 1.0);
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let result = ManualFourThresholdMetricCheck::try_new(ManualFourThresholdConfig::new(
            10.0, 30.0, 20.0, 40.0,
        ));
        assert_matches!(result, Err(CoreError::Configuration(_)));
    }

    #[test]
    fn deserializes_with_defaults() {
        let check: ManualFourThresholdMetricCheck = serde_json::from_str(
            r#"{"threshold_1": 1, "threshold_2": 2, "threshold_3": 3, "threshold_4": 4}"#,
        )
        .unwrap();
        assert!(check.config().is_higher_better);
        assert_eq!(check.config().priority_score, DEFAULT_PRIORITY_SCORE);
    }
}
