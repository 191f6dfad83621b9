//! JSON pipeline configuration.
//!
//! ```json
//! {
//!   "metric_checks": [{ "check": "static_normal_range", "rolling_periods": 6 }],
//!   "append_to_metric_checks": [{ "check": "realistic_range", "lower_bound": 0, "upper_bound": 100 }]
//! }
//! ```
//!
//! Omitting `metric_checks` keeps the default check list; an empty array
//! runs no checks at all.

use serde::{Deserialize, Serialize};
use valence_core::MetricCheck;

use crate::error::PipelineResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "MetricCheck::default_checks")]
    pub metric_checks: Vec<MetricCheck>,
    /// Extra checks run after `metric_checks`.
    #[serde(default)]
    pub append_to_metric_checks: Vec<MetricCheck>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            metric_checks: MetricCheck::default_checks(),
            append_to_metric_checks: Vec::new(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> PipelineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// All checks in run order.
    pub fn into_checks(self) -> Vec<MetricCheck> {
        let mut checks = self.metric_checks;
        checks.extend(self.append_to_metric_checks);
        checks
    }
}
