//! Compare-to-baseline check.
//!
//! Percent deviation from a baseline against a symmetric tolerance. The
//! baseline is either a constant or one of the auxiliary series (target,
//! forecast, reference). Scores are -1, 0 or +1 only.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::threshold_validation::validate_non_negative;
use crate::types::{ensure_same_index, MetricSeries};
use crate::valence_labels::Directionality;
use crate::valence_score::DEFAULT_PRIORITY_SCORE;
use crate::valence_score_series::ValenceScoreSeries;

use super::{
    directional_score, neutral_score, no_data_score, validate_metric_input, AuxiliaryInput,
};

pub const METRIC_CHECK_LABEL: &str = "Compare to Baseline Metric Check";

const NO_BASELINE: &str = "No baseline for this period.";
const LOWER: &str = "Lower than the baseline by more than the allowed tolerance.";
const NORMAL: &str = "Within the allowed tolerance of the baseline.";
const HIGHER: &str = "Higher than the baseline by more than the allowed tolerance.";

/// Where the baseline for each period comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Baseline {
    Constant(f64),
    Target,
    Forecast,
    Reference,
}

impl Default for Baseline {
    fn default() -> Self {
        Baseline::Constant(0.0)
    }
}

impl Baseline {
    /// The auxiliary series this baseline reads, if any.
    pub fn input(&self) -> Option<AuxiliaryInput> {
        match self {
            Baseline::Constant(_) => None,
            Baseline::Target => Some(AuxiliaryInput::Target),
            Baseline::Forecast => Some(AuxiliaryInput::Forecast),
            Baseline::Reference => Some(AuxiliaryInput::Reference),
        }
    }

    pub fn constant(&self) -> Option<f64> {
        match self {
            Baseline::Constant(value) => Some(*value),
            _ => None,
        }
    }
}

/// Tunable parameters for [`CompareToBaselineMetricCheck`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareToBaselineConfig {
    pub baseline: Baseline,
    /// Allowed deviation as a fraction of the baseline, e.g. 0.1 for ±10%.
    pub threshold_pct: f64,
    pub is_higher_better: bool,
    pub is_lower_better: bool,
    pub priority_score: u32,
}

impl Default for CompareToBaselineConfig {
    fn default() -> Self {
        Self {
            baseline: Baseline::default(),
            threshold_pct: 0.1,
            is_higher_better: true,
            is_lower_better: false,
            priority_score: DEFAULT_PRIORITY_SCORE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CompareToBaselineConfig", into = "CompareToBaselineConfig")]
pub struct CompareToBaselineMetricCheck {
    config: CompareToBaselineConfig,
    direction: Directionality,
}

impl CompareToBaselineMetricCheck {
    pub fn try_new(config: CompareToBaselineConfig) -> Result<Self, CoreError> {
        Self::try_from(config)
    }

    pub fn config(&self) -> &CompareToBaselineConfig {
        &self.config
    }

    pub fn baseline(&self) -> Baseline {
        self.config.baseline
    }

    pub fn required_inputs(&self) -> &'static [AuxiliaryInput] {
        match self.config.baseline {
            Baseline::Constant(_) => &[],
            Baseline::Target => &[AuxiliaryInput::Target],
            Baseline::Forecast => &[AuxiliaryInput::Forecast],
            Baseline::Reference => &[AuxiliaryInput::Reference],
        }
    }

    /// Score `series` against the configured baseline. `baseline_series` is
    /// required when the baseline is not a constant and ignored otherwise.
    pub fn apply(
        &self,
        series: &MetricSeries,
        baseline_series: Option<&MetricSeries>,
    ) -> Result<ValenceScoreSeries, CoreError> {
        validate_metric_input(series)?;

        let baselines: Vec<Option<f64>> = match self.config.baseline.input() {
            None => vec![self.config.baseline.constant(); series.len()],
            Some(input) => {
                let baseline_series = baseline_series.ok_or(CoreError::MissingInput {
                    check: METRIC_CHECK_LABEL,
                    input: input.name(),
                })?;
                ensure_same_index(series.index(), baseline_series.index(), input.name())?;
                baseline_series.validate_contiguous(input.name())?;
                baseline_series.values().to_vec()
            }
        };

        let priority = self.config.priority_score;
        let scores = series
            .values()
            .iter()
            .zip(&baselines)
            .map(|(value, baseline)| match (value, baseline) {
                (None, _) => no_data_score(METRIC_CHECK_LABEL, priority),
                (Some(_), None) => neutral_score(NO_BASELINE, METRIC_CHECK_LABEL, priority),
                (Some(value), Some(baseline)) => directional_score(
                    self.raw_score(*value, *baseline),
                    self.direction,
                    [LOWER, LOWER, NORMAL, HIGHER, HIGHER],
                    METRIC_CHECK_LABEL,
                    priority,
                ),
            })
            .collect();

        Ok(ValenceScoreSeries::from_parts(series.index(), scores))
    }

    fn raw_score(&self, value: f64, baseline: f64) -> f64 {
        if value == baseline {
            return 0.0;
        }
        // Against a zero baseline every difference is a full breach.
        let deviation = if baseline == 0.0 {
            (value - baseline).signum() * f64::INFINITY
        } else {
            (value - baseline) / baseline.abs()
        };
        if deviation > self.config.threshold_pct {
            1.0
        } else if deviation < -self.config.threshold_pct {
            -1.0
        } else {
            0.0
        }
    }
}

impl Default for CompareToBaselineMetricCheck {
    fn default() -> Self {
        Self {
            config: CompareToBaselineConfig::default(),
            direction: Directionality::HigherIsBetter,
        }
    }
}

impl TryFrom<CompareToBaselineConfig> for CompareToBaselineMetricCheck {
    type Error = CoreError;

    fn try_from(config: CompareToBaselineConfig) -> Result<Self, Self::Error> {
        let direction =
            Directionality::from_flags(config.is_higher_better, config.is_lower_better)?;
        validate_non_negative(config.threshold_pct, "threshold_pct")?;
        if let Baseline::Constant(value) = config.baseline {
            if !value.is_finite() {
                return Err(CoreError::Configuration(format!(
                    "constant baseline must be a finite number, got {value}"
                )));
            }
        }
        Ok(Self { config, direction })
    }
}

impl From<CompareToBaselineMetricCheck> for CompareToBaselineConfig {
    fn from(check: CompareToBaselineMetricCheck) -> Self {
        check.config
    }
}
