//! Valence label vocabulary, directionality, and score normalization.
//!
//! Checks compute a *raw* score whose sign follows the metric (positive means
//! the value went up). Normalization turns that into a *valence* score whose
//! sign means good or bad for this metric. Descriptions are picked from the
//! raw sign, labels from the normalized score.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Label constants
// ---------------------------------------------------------------------------

/// Check label used when a score was built without naming its origin.
pub const UNSPECIFIED_METRIC_CHECK_LABEL: &str = "Unspecified Metric Check";
/// Check label of a score synthesized from two others.
pub const COMBINED_METRIC_CHECK_LABEL: &str = "Combined Metric Check";
/// Valence label of a synthesized score whose inputs disagree.
pub const AMBIGUOUS_VALENCE_LABEL: &str = "Ambiguous";

pub const LABEL_UNUSUALLY_BAD: &str = "Unusually Bad";
pub const LABEL_WORSE_THAN_NORMAL: &str = "Worse than Normal";
pub const LABEL_NORMAL: &str = "In a Normal Range";
pub const LABEL_BETTER_THAN_NORMAL: &str = "Better than Normal";
pub const LABEL_UNUSUALLY_GOOD: &str = "Unusually Good";

/// Default labels, ordered from most negative to most positive bucket.
pub const VALENCE_LABELS: [&str; 5] = [
    LABEL_UNUSUALLY_BAD,
    LABEL_WORSE_THAN_NORMAL,
    LABEL_NORMAL,
    LABEL_BETTER_THAN_NORMAL,
    LABEL_UNUSUALLY_GOOD,
];

/// Description used for periods with no value.
pub const NO_DATA_DESCRIPTION: &str = "No data for this period.";
/// Leading words of every "window not yet full" description.
pub const INSUFFICIENT_DATA_PREFIX: &str = "Not enough data";

/// Whether a description marks a period the check could not evaluate.
pub fn is_insufficient_data(description: &str) -> bool {
    description == NO_DATA_DESCRIPTION || description.starts_with(INSUFFICIENT_DATA_PREFIX)
}

// ---------------------------------------------------------------------------
// Mapping helpers
// ---------------------------------------------------------------------------

/// Bucket a score into one of five bands:
/// `<= -1`, `(-1, 0)`, `0`, `(0, 1)`, `>= 1`.
pub fn score_bucket(score: f64) -> usize {
    if score <= -1.0 {
        0
    } else if score < 0.0 {
        1
    } else if score == 0.0 {
        2
    } else if score < 1.0 {
        3
    } else {
        4
    }
}

/// Pick one of five strings by score band (see [`score_bucket`]).
pub fn map_score_to_string<'a>(score: f64, labels: [&'a str; 5]) -> &'a str {
    labels[score_bucket(score)]
}

/// The default valence label for a normalized score.
pub fn valence_label_for(score: f64) -> &'static str {
    map_score_to_string(score, VALENCE_LABELS)
}

/// Pick `[negative, zero, positive]` by the sign of `score`.
pub fn map_sign_to_string<'a>(score: f64, labels: [&'a str; 3]) -> &'a str {
    if score < 0.0 {
        labels[0]
    } else if score > 0.0 {
        labels[2]
    } else {
        labels[1]
    }
}

/// Linear breach score against a pair of two-level bands.
///
/// Returns 0 inside `[lower_l1, upper_l1]`, interpolates linearly between
/// the L1 and L2 thresholds, and saturates at ±1 at or beyond L2. A
/// zero-width band saturates immediately.
pub fn interpolate_breach(
    value: f64,
    lower_l2: f64,
    lower_l1: f64,
    upper_l1: f64,
    upper_l2: f64,
) -> f64 {
    if value < lower_l1 {
        if value <= lower_l2 {
            -1.0
        } else {
            ((value - lower_l1) / (lower_l1 - lower_l2)).max(-1.0)
        }
    } else if value > upper_l1 {
        if value >= upper_l2 {
            1.0
        } else {
            ((value - upper_l1) / (upper_l2 - upper_l1)).min(1.0)
        }
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Directionality
// ---------------------------------------------------------------------------

/// Which direction of movement counts as good for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directionality {
    HigherIsBetter,
    LowerIsBetter,
    /// Neither direction is good; any departure from normal is flagged
    /// as bad, and every score is ambiguous.
    Neither,
}

impl Directionality {
    /// Resolve the two configuration flags. Both set is contradictory.
    pub fn from_flags(is_higher_better: bool, is_lower_better: bool) -> Result<Self, CoreError> {
        match (is_higher_better, is_lower_better) {
            (true, false) => Ok(Self::HigherIsBetter),
            (false, true) => Ok(Self::LowerIsBetter),
            (false, false) => Ok(Self::Neither),
            (true, true) => Err(CoreError::Configuration(
                "is_higher_better and is_lower_better cannot both be true".to_string(),
            )),
        }
    }
}

/// A raw score after directionality has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedScore {
    pub score: f64,
    pub is_ambiguous: bool,
}

/// Flip the raw score so that "good" is always positive.
pub fn normalize_valence_score(raw_score: f64, direction: Directionality) -> NormalizedScore {
    match direction {
        Directionality::HigherIsBetter => NormalizedScore {
            score: raw_score,
            is_ambiguous: false,
        },
        Directionality::LowerIsBetter => NormalizedScore {
            score: if raw_score == 0.0 { 0.0 } else { -raw_score },
            is_ambiguous: false,
        },
        Directionality::Neither => NormalizedScore {
            score: if raw_score == 0.0 { 0.0 } else { -raw_score.abs() },
            is_ambiguous: true,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
