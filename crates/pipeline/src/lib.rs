//! Metric evaluation pipeline.
//!
//! - [`MetricEvaluationPipeline`]: runs configured checks against a metric
//!   and its auxiliary series and folds their verdicts into one.
//! - [`EvaluationInputs`]: the optional annotation, target, forecast and
//!   reference series for one run.
//! - [`MetricEvaluationResult`]: the metric, its combined scores, and the
//!   flattened [`EvaluationRow`] view renderers consume.
//! - [`PipelineConfig`]: JSON configuration of the check list.

pub mod config;
pub mod error;
pub mod inputs;
pub mod pipeline;
pub mod result;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use inputs::{EvaluationInputs, ResultMetadata};
pub use pipeline::MetricEvaluationPipeline;
pub use result::{EvaluationRow, MetricEvaluationResult};
