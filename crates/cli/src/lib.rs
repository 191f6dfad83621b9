//! `valence-cli` library -- batch evaluation of metric series.
//!
//! Reads a JSON document describing one or more metrics, runs each through
//! a [`valence_pipeline::MetricEvaluationPipeline`], and renders the
//! per-period verdicts as JSON.
//!
//! - [`batch`]: input/output document types and the batch runner.
//! - [`config`]: environment-driven settings for the binary.

pub mod batch;
pub mod config;
