//! Metric health scoring.
//!
//! This crate holds the pure scoring logic, with no I/O:
//!
//! - [`types`]: the period index and [`MetricSeries`] / [`AnnotationSeries`].
//! - [`ValenceScore`] and the [`combine`] algebra that merges verdicts.
//! - [`ValenceScoreSeries`]: one score per period, combinable on a shared index.
//! - [`checks`]: the closed [`MetricCheck`] family.
//! - [`window`]: rolling and expanding statistics the checks are built on.

pub mod checks;
pub mod error;
pub mod threshold_validation;
pub mod types;
pub mod valence_labels;
pub mod valence_score;
pub mod valence_score_series;
pub mod window;

pub use checks::{AuxiliaryInput, AuxiliaryInputs, MetricCheck};
pub use error::CoreError;
pub use types::{AnnotationSeries, MetricSeries, Period, Series};
pub use valence_score::{combine, combine_all, ValenceScore};
pub use valence_score_series::ValenceScoreSeries;
