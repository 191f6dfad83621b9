//! Sudden change check (XmR moving-range chart).
//!
//! Scores the period-over-period change against the window mean of prior
//! absolute changes (the moving range). A change beyond `l1 · moving range`
//! is actionable and saturates at `l2 · moving range`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::threshold_validation::{validate_levels, validate_positive, validate_window};
use crate::types::MetricSeries;
use crate::valence_labels::{interpolate_breach, Directionality};
use crate::valence_score::DEFAULT_PRIORITY_SCORE;
use crate::valence_score_series::ValenceScoreSeries;
use crate::window::{absolute_differences, differences, shift, window_mean, Window};

use super::{directional_score, neutral_score, no_data_score, validate_metric_input};

pub const METRIC_CHECK_LABEL: &str = "Sudden Change Check";

const NOT_ENOUGH_DATA: &str = "Not enough data to calculate if change in prior period is significant.";
const DESCRIPTIONS: [&str; 5] = [
    "Sudden significant drop in value over prior period.",
    "Sudden drop in value over prior period.",
    "No significant change from prior period.",
    "Sudden spike in value over prior period.",
    "Sudden significant spike in value over prior period.",
];

/// Tunable parameters for [`SuddenChangeMetricCheck`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuddenChangeConfig {
    pub is_higher_better: bool,
    pub is_lower_better: bool,
    pub is_rolling_window: bool,
    pub rolling_periods: usize,
    pub minimum_periods: usize,
    pub l1_check_constant: f64,
    pub l2_check_constant: f64,
    pub priority_score: u32,
}

impl Default for SuddenChangeConfig {
    fn default() -> Self {
        Self {
            is_higher_better: true,
            is_lower_better: false,
            is_rolling_window: true,
            rolling_periods: 12,
            minimum_periods: 7,
            l1_check_constant: 3.27,
            l2_check_constant: 4.905,
            priority_score: DEFAULT_PRIORITY_SCORE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SuddenChangeConfig", into = "SuddenChangeConfig")]
pub struct SuddenChangeMetricCheck {
    config: SuddenChangeConfig,
    direction: Directionality,
}

impl SuddenChangeMetricCheck {
    pub fn try_new(config: SuddenChangeConfig) -> Result<Self, CoreError> {
        Self::try_from(config)
    }

    pub fn config(&self) -> &SuddenChangeConfig {
        &self.config
    }

    pub fn apply(&self, series: &MetricSeries) -> Result<ValenceScoreSeries, CoreError> {
        validate_metric_input(series)?;

        let config = &self.config;
        let window = Window::from_config(config.is_rolling_window, config.rolling_periods);
        let values = series.values();

        let changes = differences(values);
        // The current change must not widen its own baseline.
        let moving_range = window_mean(
            &shift(&absolute_differences(values), 1),
            window,
            config.minimum_periods,
        );

        let scores = values
            .iter()
            .enumerate()
            .map(|(position, value)| {
                if value.is_none() {
                    return no_data_score(METRIC_CHECK_LABEL, config.priority_score);
                }
                match (changes[position], moving_range[position]) {
                    (Some(change), Some(range)) => {
                        let l1 = config.l1_check_constant * range;
                        let l2 = config.l2_check_constant * range;
                        let raw = interpolate_breach(change, -l2, -l1, l1, l2);
                        directional_score(
                            raw,
                            self.direction,
                            DESCRIPTIONS,
                            METRIC_CHECK_LABEL,
                            config.priority_score,
                        )
                    }
                    _ => neutral_score(NOT_ENOUGH_DATA, METRIC_CHECK_LABEL, config.priority_score),
                }
            })
            .collect();

        Ok(ValenceScoreSeries::from_parts(series.index(), scores))
    }
}

impl Default for SuddenChangeMetricCheck {
    fn default() -> Self {
        Self {
            config: SuddenChangeConfig::default(),
            direction: Directionality::HigherIsBetter,
        }
    }
}

impl TryFrom<SuddenChangeConfig> for SuddenChangeMetricCheck {
    type Error = CoreError;

    fn try_from(config: SuddenChangeConfig) -> Result<Self, Self::Error> {
        let direction =
            Directionality::from_flags(config.is_higher_better, config.is_lower_better)?;
        validate_window(config.is_rolling_window, config.rolling_periods, config.minimum_periods)?;
        validate_positive(config.l1_check_constant, "l1_check_constant")?;
        validate_levels(
            config.l1_check_constant,
            config.l2_check_constant,
            "l1_check_constant",
            "l2_check_constant",
        )?;
        Ok(Self { config, direction })
    }
}

impl From<SuddenChangeMetricCheck> for SuddenChangeConfig {
    fn from(check: SuddenChangeMetricCheck) -> Self {
        check.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valence_labels::{LABEL_NORMAL, LABEL_UNUSUALLY_GOOD};
    use assert_matches::assert_matches;

    fn small_window() -> SuddenChangeMetricCheck {
        SuddenChangeMetricCheck::try_new(SuddenChangeConfig {
            rolling_periods: 4,
            minimum_periods: 2,
            ..Default::default()
        })
        .unwrap()
    }

    fn spike_series() -> MetricSeries {
        let mut values = vec![1.0; 11];
        values.push(10.0);
        MetricSeries::from_values(values)
    }

    #[test]
    fn final_spike_saturates() {
        let result = small_window().apply(&spike_series()).unwrap();
        let last = result.last_record().unwrap();
        assert_eq!(last.valence_score(), 1.0);
        assert_eq!(last.valence_label(), LABEL_UNUSUALLY_GOOD);
        assert_eq!(
            last.valence_description(),
            "Sudden significant spike in value over prior period."
        );
    }

    #[test]
    fn flat_periods_are_neutral() {
        let result = small_window().apply(&spike_series()).unwrap();
        for score in &result.scores()[3..11] {
            assert_eq!(score.valence_score(), 0.0);
            assert_eq!(score.valence_label(), LABEL_NORMAL);
            assert_eq!(score.valence_description(), "No significant change from prior period.");
        }
    }

    #[test]
    fn warm_up_reports_not_enough_data() {
        let result = small_window().apply(&spike_series()).unwrap();
        for score in &result.scores()[..3] {
            assert_eq!(score.valence_score(), 0.0);
            assert_eq!(score.valence_description(), NOT_ENOUGH_DATA);
        }
    }

    #[test]
    fn drop_is_bad_when_higher_is_better() {
        let series = MetricSeries::from_values([10.0, 11.0, 10.0, 11.0, 10.0, 11.0, 10.0, 5.0]);
        let check = SuddenChangeMetricCheck::try_new(SuddenChangeConfig {
            minimum_periods: 3,
            ..Default::default()
        })
        .unwrap();
        let last = check.apply(&series).unwrap().last_record().cloned().unwrap();
        // Moving range 1, so a drop of 5 is past 4.905.
        assert_eq!(last.valence_score(), -1.0);
        assert_eq!(
            last.valence_description(),
            "Sudden significant drop in value over prior period."
        );
    }

    #[test]
    fn moderate_change_interpolates() {
        // Moving range 1, change 4: (4 - 3.27) / (4.905 - 3.27).
        let series = MetricSeries::from_values([10.0, 11.0, 10.0, 11.0, 10.0, 11.0, 15.0]);
        let check = SuddenChangeMetricCheck::try_new(SuddenChangeConfig {
            minimum_periods: 3,
            ..Default::default()
        })
        .unwrap();
        let last = check.apply(&series).unwrap().last_record().cloned().unwrap();
        let expected = (4.0 - 3.27) / (4.905 - 3.27);
        assert!((last.valence_score() - expected).abs() < 1e-9);
        assert_eq!(last.valence_description(), "Sudden spike in value over prior period.");
    }

    #[test]
    fn expanding_window_keeps_early_jump_in_moving_range() {
        let mut values: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        values[3] = 30.0;
        values[29] = 16.0;
        let series = MetricSeries::from_values(values);

        let expanding = SuddenChangeMetricCheck::try_new(SuddenChangeConfig {
            is_rolling_window: false,
            ..Default::default()
        })
        .unwrap()
        .apply(&series)
        .unwrap();
        assert_eq!(expanding.len(), 30);
        assert_eq!(expanding.index(), series.index());
        assert_eq!(expanding.scores()[7].valence_description(), NOT_ENOUGH_DATA);
        assert_ne!(expanding.scores()[8].valence_description(), NOT_ENOUGH_DATA);
        assert_eq!(expanding.last_record().unwrap().valence_score(), 0.0);

        let rolling = SuddenChangeMetricCheck::default().apply(&series).unwrap();
        assert_eq!(rolling.last_record().unwrap().valence_score(), 1.0);
    }

    #[test]
    fn rejects_inverted_levels() {
        let result = SuddenChangeMetricCheck::try_new(SuddenChangeConfig {
            l1_check_constant: 5.0,
            l2_check_constant: 4.0,
            ..Default::default()
        });
        assert_matches!(result, Err(CoreError::Configuration(_)));
    }
}
