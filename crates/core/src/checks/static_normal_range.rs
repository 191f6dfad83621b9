//! Static normal range check (Shewhart control limits).
//!
//! The central measure is the window mean of the metric. Dispersion is the
//! window mean of prior successive absolute differences, each clipped to a
//! window quantile so a single outlier cannot inflate it. Values beyond
//! `central ± l1 · dispersion` are actionable; the score reaches ±1 at
//! `central ± l2 · dispersion`.
//!
//! Assumes the metric is roughly level within the window.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::threshold_validation::{
    validate_levels, validate_positive, validate_unit_range, validate_window,
};
use crate::types::MetricSeries;
use crate::valence_labels::{interpolate_breach, Directionality};
use crate::valence_score::{ValenceScore, DEFAULT_PRIORITY_SCORE};
use crate::valence_score_series::ValenceScoreSeries;
use crate::window::{absolute_differences, shift, window_mean, window_quantile_higher, Window};

use super::{directional_score, neutral_score, no_data_score, significantly, validate_metric_input};

pub const METRIC_CHECK_LABEL: &str = "Static Normal Range Check";

const NOT_ENOUGH_DATA: &str = "Not enough data to calculate the normal range.";
const LOWER: &str = "Lower than normal based on historical values.";
const NORMAL: &str = "Within the range of normal based on historical values.";
const HIGHER: &str = "Higher than normal based on historical values.";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunable parameters for [`StaticNormalRangeMetricCheck`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticNormalRangeConfig {
    pub is_higher_better: bool,
    pub is_lower_better: bool,
    pub is_rolling_window: bool,
    pub rolling_periods: usize,
    /// Observations a window needs before any statistic is reported.
    pub minimum_periods: usize,
    pub l1_normal_range_constant: f64,
    pub l2_normal_range_constant: f64,
    /// Quantile above which successive differences are clipped while
    /// learning the dispersion. 1.0 clips to the window maximum.
    pub maximum_learning_differences_quantile: f64,
    pub priority_score: u32,
}

impl Default for StaticNormalRangeConfig {
    fn default() -> Self {
        Self {
            is_higher_better: true,
            is_lower_better: false,
            is_rolling_window: true,
            rolling_periods: 12,
            minimum_periods: 8,
            l1_normal_range_constant: 2.66,
            l2_normal_range_constant: 3.99,
            maximum_learning_differences_quantile: 1.0,
            priority_score: DEFAULT_PRIORITY_SCORE,
        }
    }
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StaticNormalRangeConfig", into = "StaticNormalRangeConfig")]
pub struct StaticNormalRangeMetricCheck {
    config: StaticNormalRangeConfig,
    direction: Directionality,
}

impl StaticNormalRangeMetricCheck {
    pub fn try_new(config: StaticNormalRangeConfig) -> Result<Self, CoreError> {
        Self::try_from(config)
    }

    pub fn config(&self) -> &StaticNormalRangeConfig {
        &self.config
    }

    pub fn apply(&self, series: &MetricSeries) -> Result<ValenceScoreSeries, CoreError> {
        validate_metric_input(series)?;

        let config = &self.config;
        let window = Window::from_config(config.is_rolling_window, config.rolling_periods);
        let values = series.values();

        let central = window_mean(values, window, config.minimum_periods);

        // Differences up to the prior period only.
        let differences = shift(&absolute_differences(values), 1);
        let ceilings = window_quantile_higher(
            &differences,
            window,
            config.minimum_periods,
            config.maximum_learning_differences_quantile,
        );
        let clipped: Vec<Option<f64>> = differences
            .iter()
            .zip(&ceilings)
            .map(|(difference, ceiling)| match (difference, ceiling) {
                (Some(d), Some(c)) => Some(d.min(*c)),
                (d, _) => *d,
            })
            .collect();
        let dispersion = window_mean(&clipped, window, config.minimum_periods);

        let scores = values
            .iter()
            .enumerate()
            .map(|(position, value)| {
                let Some(value) = value else {
                    return no_data_score(METRIC_CHECK_LABEL, config.priority_score);
                };
                match (central[position], dispersion[position]) {
                    (Some(center), Some(spread)) => {
                        let raw = interpolate_breach(
                            *value,
                            center - config.l2_normal_range_constant * spread,
                            center - config.l1_normal_range_constant * spread,
                            center + config.l1_normal_range_constant * spread,
                            center + config.l2_normal_range_constant * spread,
                        );
                        self.score(raw)
                    }
                    _ => neutral_score(NOT_ENOUGH_DATA, METRIC_CHECK_LABEL, config.priority_score),
                }
            })
            .collect();

        Ok(ValenceScoreSeries::from_parts(series.index(), scores))
    }

    fn score(&self, raw: f64) -> ValenceScore {
        let significantly_lower = significantly(LOWER);
        let significantly_higher = significantly(HIGHER);
        directional_score(
            raw,
            self.direction,
            [&significantly_lower, LOWER, NORMAL, HIGHER, &significantly_higher],
            METRIC_CHECK_LABEL,
            self.config.priority_score,
        )
    }
}

impl Default for StaticNormalRangeMetricCheck {
    fn default() -> Self {
        Self {
            config: StaticNormalRangeConfig::default(),
            direction: Directionality::HigherIsBetter,
        }
    }
}

impl TryFrom<StaticNormalRangeConfig> for StaticNormalRangeMetricCheck {
    type Error = CoreError;

    fn try_from(config: StaticNormalRangeConfig) -> Result<Self, Self::Error> {
        let direction =
            Directionality::from_flags(config.is_higher_better, config.is_lower_better)?;
        validate_window(config.is_rolling_window, config.rolling_periods, config.minimum_periods)?;
        validate_positive(config.l1_normal_range_constant, "l1_normal_range_constant")?;
        validate_levels(
            config.l1_normal_range_constant,
            config.l2_normal_range_constant,
            "l1_normal_range_constant",
            "l2_normal_range_constant",
        )?;
        validate_unit_range(
            config.maximum_learning_differences_quantile,
            "maximum_learning_differences_quantile",
        )?;
        Ok(Self { config, direction })
    }
}

impl From<StaticNormalRangeMetricCheck> for StaticNormalRangeConfig {
    fn from(check: StaticNormalRangeMetricCheck) -> Self {
        check.config
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valence_labels::{
        LABEL_NORMAL, LABEL_UNUSUALLY_BAD, LABEL_UNUSUALLY_GOOD, NO_DATA_DESCRIPTION,
    };
    use assert_matches::assert_matches;

    fn small_window() -> StaticNormalRangeMetricCheck {
        StaticNormalRangeMetricCheck::try_new(StaticNormalRangeConfig {
            rolling_periods: 6,
            minimum_periods: 3,
            ..Default::default()
        })
        .unwrap()
    }

    // -- configuration --------------------------------------------------------

    #[test]
    fn rejects_inverted_levels() {
        let result = StaticNormalRangeMetricCheck::try_new(StaticNormalRangeConfig {
            l1_normal_range_constant: 4.0,
            l2_normal_range_constant: 3.0,
            ..Default::default()
        });
        assert_matches!(result, Err(CoreError::Configuration(_)));
    }

    #[test]
    fn rejects_contradictory_direction() {
        let result = StaticNormalRangeMetricCheck::try_new(StaticNormalRangeConfig {
            is_lower_better: true,
            ..Default::default()
        });
        assert_matches!(result, Err(CoreError::Configuration(_)));
    }

    #[test]
    fn rejects_quantile_outside_unit_range() {
        let result = StaticNormalRangeMetricCheck::try_new(StaticNormalRangeConfig {
            maximum_learning_differences_quantile: 1.5,
            ..Default::default()
        });
        assert_matches!(result, Err(CoreError::Configuration(_)));
    }

    // -- apply ----------------------------------------------------------------

    #[test]
    fn constant_series_is_normal() {
        let series = MetricSeries::from_values(vec![5.0; 20]);
        let result = StaticNormalRangeMetricCheck::default().apply(&series).unwrap();
        assert_eq!(result.len(), 20);
        assert_eq!(result.index(), series.index());
        for score in result.scores() {
            assert_eq!(score.valence_score(), 0.0);
            assert_eq!(score.valence_label(), LABEL_NORMAL);
        }
        assert_eq!(
            result.scores()[19].valence_description(),
            "Within the range of normal based on historical values."
        );
    }

    #[test]
    fn warm_up_reports_not_enough_data() {
        let series = MetricSeries::from_values(vec![5.0; 20]);
        let result = StaticNormalRangeMetricCheck::default().apply(&series).unwrap();
        assert_eq!(result.scores()[0].valence_description(), NOT_ENOUGH_DATA);
        assert_eq!(result.scores()[0].metric_check_label(), METRIC_CHECK_LABEL);
    }

    #[test]
    fn spike_is_unusually_good_when_higher_is_better() {
        let series = MetricSeries::from_values([10.0, 11.0, 10.0, 11.0, 10.0, 11.0, 40.0]);
        let result = small_window().apply(&series).unwrap();
        let last = result.last_record().unwrap();
        assert_eq!(last.valence_score(), 1.0);
        assert_eq!(last.valence_label(), LABEL_UNUSUALLY_GOOD);
        assert_eq!(
            last.valence_description(),
            "Significantly higher than normal based on historical values."
        );
    }

    #[test]
    fn spike_is_unusually_bad_when_lower_is_better() {
        let check = StaticNormalRangeMetricCheck::try_new(StaticNormalRangeConfig {
            is_higher_better: false,
            is_lower_better: true,
            rolling_periods: 6,
            minimum_periods: 3,
            ..Default::default()
        })
        .unwrap();
        let series = MetricSeries::from_values([10.0, 11.0, 10.0, 11.0, 10.0, 11.0, 40.0]);
        let last = check.apply(&series).unwrap().last_record().cloned().unwrap();
        assert_eq!(last.valence_score(), -1.0);
        assert_eq!(last.valence_label(), LABEL_UNUSUALLY_BAD);
        assert_eq!(
            last.valence_description(),
            "Significantly higher than normal based on historical values."
        );
    }

    #[test]
    fn neither_direction_is_always_ambiguous() {
        let check = StaticNormalRangeMetricCheck::try_new(StaticNormalRangeConfig {
            is_higher_better: false,
            is_lower_better: false,
            rolling_periods: 6,
            minimum_periods: 3,
            ..Default::default()
        })
        .unwrap();

        let flat = check.apply(&MetricSeries::from_values(vec![5.0; 20])).unwrap();
        let last = flat.last_record().unwrap();
        assert_eq!(last.valence_score(), 0.0);
        assert!(last.is_ambiguous());

        let spike = MetricSeries::from_values([10.0, 11.0, 10.0, 11.0, 10.0, 11.0, 40.0]);
        let last = check.apply(&spike).unwrap().last_record().cloned().unwrap();
        assert_eq!(last.valence_score(), -1.0);
        assert_eq!(last.valence_label(), LABEL_UNUSUALLY_BAD);
        assert!(last.is_ambiguous());
    }

    // -- learning quantile ----------------------------------------------------

    /// Alternating 10/11 with an old outlier at 22 and a moderate jump at 29.
    fn outlier_then_jump() -> MetricSeries {
        let mut values: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        values[22] = 40.0;
        values[29] = 18.0;
        MetricSeries::from_values(values)
    }

    #[test]
    fn unclipped_outlier_masks_later_breach() {
        let result = StaticNormalRangeMetricCheck::default()
            .apply(&outlier_then_jump())
            .unwrap();
        assert_eq!(result.last_record().unwrap().valence_score(), 0.0);
    }

    #[test]
    fn clipped_learning_differences_expose_breach() {
        let check = StaticNormalRangeMetricCheck::try_new(StaticNormalRangeConfig {
            maximum_learning_differences_quantile: 0.5,
            ..Default::default()
        })
        .unwrap();
        let result = check.apply(&outlier_then_jump()).unwrap();
        assert_eq!(result.last_record().unwrap().valence_score(), 1.0);
    }

    // -- expanding window -----------------------------------------------------

    #[test]
    fn expanding_window_remembers_early_outlier() {
        let mut values: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        values[3] = 40.0;
        values[4] = 10.0;
        values[29] = 16.0;
        let series = MetricSeries::from_values(values);

        let expanding = StaticNormalRangeMetricCheck::try_new(StaticNormalRangeConfig {
            is_rolling_window: false,
            ..Default::default()
        })
        .unwrap()
        .apply(&series)
        .unwrap();
        assert_eq!(expanding.len(), 30);
        assert_eq!(expanding.index(), series.index());
        assert_eq!(expanding.scores()[8].valence_description(), NOT_ENOUGH_DATA);
        assert_ne!(expanding.scores()[9].valence_description(), NOT_ENOUGH_DATA);
        assert_eq!(expanding.last_record().unwrap().valence_score(), 0.0);

        let rolling = StaticNormalRangeMetricCheck::default().apply(&series).unwrap();
        assert_eq!(rolling.last_record().unwrap().valence_score(), 1.0);
    }

    #[test]
    fn trailing_nulls_have_no_data() {
        let series = MetricSeries::from_optional_values(vec![Some(1.0), Some(2.0), None]);
        let result = StaticNormalRangeMetricCheck::default().apply(&series).unwrap();
        assert_eq!(result.scores()[2].valence_description(), NO_DATA_DESCRIPTION);
    }

    #[test]
    fn internal_null_rejected() {
        let series = MetricSeries::from_optional_values(vec![Some(1.0), None, Some(2.0)]);
        assert_matches!(
            StaticNormalRangeMetricCheck::default().apply(&series),
            Err(CoreError::NonContiguous { position: 1, .. })
        );
    }
}
