//! One check's verdict for one period, and the algebra for combining verdicts.
//!
//! [`combine`] resolves two scores into one:
//!
//! 1. Two overrides: the lower `priority_score` wins; on a tie a new
//!    ambiguous override is synthesized with the larger raw score.
//! 2. One override: it wins.
//! 3. Different effective priority: the lower one wins. A zero score has no
//!    effective priority, so a neutral check never suppresses an actionable one.
//! 4. Same effective priority: a new score is synthesized from the operand
//!    with the larger magnitude, flagged ambiguous if the operands disagree
//!    in sign.
//!
//! A winner is returned as a copy of itself carrying the original scores of
//! both operands as children. Synthesized scores carry them too.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::CoreError;
use crate::valence_labels::{
    AMBIGUOUS_VALENCE_LABEL, COMBINED_METRIC_CHECK_LABEL, UNSPECIFIED_METRIC_CHECK_LABEL,
};

/// Default authority ranking for a check result. Lower wins.
pub const DEFAULT_PRIORITY_SCORE: u32 = 3;
/// Default token used to join merged descriptions.
pub const DEFAULT_TEXT_SEPARATOR: &str = " - ";

// ---------------------------------------------------------------------------
// ValenceScore
// ---------------------------------------------------------------------------

/// A directional verdict for one period.
///
/// The sign of `valence_score` says good (positive) or bad (negative); its
/// magnitude is confidence or severity, not a metric unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValenceScore {
    valence_score: f64,
    valence_label: String,
    valence_description: String,
    priority_score: u32,
    is_override: bool,
    is_ambiguous: bool,
    metric_check_label: String,
    text_separator: String,
    child_valence_scores: Vec<ValenceScore>,
}

impl ValenceScore {
    /// Create a score with default priority and no override or ambiguity.
    pub fn new(
        valence_score: f64,
        valence_label: impl Into<String>,
        valence_description: impl Into<String>,
    ) -> Self {
        Self {
            valence_score,
            valence_label: valence_label.into(),
            valence_description: valence_description.into(),
            priority_score: DEFAULT_PRIORITY_SCORE,
            is_override: false,
            is_ambiguous: false,
            metric_check_label: UNSPECIFIED_METRIC_CHECK_LABEL.to_string(),
            text_separator: DEFAULT_TEXT_SEPARATOR.to_string(),
            child_valence_scores: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority_score: u32) -> Self {
        self.priority_score = priority_score;
        self
    }

    pub fn with_override(mut self, is_override: bool) -> Self {
        self.is_override = is_override;
        self
    }

    pub fn with_ambiguous(mut self, is_ambiguous: bool) -> Self {
        self.is_ambiguous = is_ambiguous;
        self
    }

    pub fn with_metric_check_label(mut self, label: impl Into<String>) -> Self {
        self.metric_check_label = label.into();
        self
    }

    pub fn with_text_separator(mut self, separator: impl Into<String>) -> Self {
        self.text_separator = separator.into();
        self
    }

    /// Attach child scores. Children may not have children of their own.
    pub fn with_child_valence_scores(
        mut self,
        children: Vec<ValenceScore>,
    ) -> Result<Self, CoreError> {
        if let Some(position) = children
            .iter()
            .position(|c| !c.child_valence_scores.is_empty())
        {
            return Err(CoreError::Validation(format!(
                "child valence score at position {position} has children of its own; \
                 arbitrary nesting of ValenceScore is forbidden"
            )));
        }
        self.child_valence_scores = children;
        Ok(self)
    }

    /// The same score with its children dropped.
    pub fn without_children(&self) -> Self {
        Self {
            child_valence_scores: Vec::new(),
            ..self.clone()
        }
    }

    pub fn valence_score(&self) -> f64 {
        self.valence_score
    }

    pub fn valence_score_magnitude(&self) -> f64 {
        self.valence_score.abs()
    }

    pub fn valence_label(&self) -> &str {
        &self.valence_label
    }

    pub fn valence_description(&self) -> &str {
        &self.valence_description
    }

    pub fn priority_score(&self) -> u32 {
        self.priority_score
    }

    pub fn is_override(&self) -> bool {
        self.is_override
    }

    pub fn is_ambiguous(&self) -> bool {
        self.is_ambiguous
    }

    pub fn metric_check_label(&self) -> &str {
        &self.metric_check_label
    }

    pub fn text_separator(&self) -> &str {
        &self.text_separator
    }

    pub fn child_valence_scores(&self) -> &[ValenceScore] {
        &self.child_valence_scores
    }

    /// Combine with another score. See [`combine`].
    pub fn combine(&self, other: &ValenceScore) -> ValenceScore {
        combine(self, other)
    }

    /// Priority used when neither operand overrides. `None` ranks last.
    fn effective_priority(&self) -> Option<u32> {
        (self.valence_score != 0.0).then_some(self.priority_score)
    }

    /// The un-combined scores this score stands for: its children if it has
    /// any, otherwise itself.
    fn original_scores(&self) -> Vec<ValenceScore> {
        if self.child_valence_scores.is_empty() {
            vec![self.clone()]
        } else {
            self.child_valence_scores.clone()
        }
    }

    fn description_parts(&self) -> impl Iterator<Item = &str> {
        self.valence_description
            .split(self.text_separator.as_str())
            .map(str::trim)
            .filter(|part| !part.is_empty())
    }

    fn adopt(&self, children: Vec<ValenceScore>) -> ValenceScore {
        Self {
            child_valence_scores: children,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Combination
// ---------------------------------------------------------------------------

/// Combine two scores for the same period into one authoritative score.
///
/// The result does not depend on operand order, and folding any number of
/// scores gives the same verdict (score, label, flags, description) in any
/// order. Magnitude ties between equal-priority scores go to the larger raw
/// score, then to the lexicographically smaller valence label. When the
/// operands use different text separators, the merged description is
/// joined with the lexicographically smaller one.
pub fn combine(a: &ValenceScore, b: &ValenceScore) -> ValenceScore {
    let mut children = a.original_scores();
    children.extend(b.original_scores());

    match (a.is_override, b.is_override) {
        (true, true) => match a.priority_score.cmp(&b.priority_score) {
            Ordering::Less => a.adopt(children),
            Ordering::Greater => b.adopt(children),
            Ordering::Equal => ValenceScore {
                valence_score: a.valence_score.max(b.valence_score),
                valence_label: AMBIGUOUS_VALENCE_LABEL.to_string(),
                valence_description: merge_descriptions(a, b),
                priority_score: a.priority_score,
                is_override: true,
                is_ambiguous: true,
                metric_check_label: COMBINED_METRIC_CHECK_LABEL.to_string(),
                text_separator: merged_separator(a, b).to_string(),
                child_valence_scores: children,
            },
        },
        (true, false) => a.adopt(children),
        (false, true) => b.adopt(children),
        (false, false) => match compare_effective_priority(a, b) {
            Ordering::Less => a.adopt(children),
            Ordering::Greater => b.adopt(children),
            Ordering::Equal => {
                let dominant = dominant_by_magnitude(a, b);
                let is_ambiguous = a.is_ambiguous
                    || b.is_ambiguous
                    || a.valence_score * b.valence_score < 0.0;
                ValenceScore {
                    valence_score: dominant.valence_score,
                    valence_label: if is_ambiguous {
                        AMBIGUOUS_VALENCE_LABEL.to_string()
                    } else {
                        dominant.valence_label.clone()
                    },
                    valence_description: merge_descriptions(a, b),
                    priority_score: a.priority_score.min(b.priority_score),
                    is_override: false,
                    is_ambiguous,
                    metric_check_label: COMBINED_METRIC_CHECK_LABEL.to_string(),
                    text_separator: merged_separator(a, b).to_string(),
                    child_valence_scores: children,
                }
            }
        },
    }
}

/// Fold any number of scores with [`combine`]. `None` for an empty input.
pub fn combine_all<'a>(scores: impl IntoIterator<Item = &'a ValenceScore>) -> Option<ValenceScore> {
    let mut iter = scores.into_iter();
    let first = iter.next()?.clone();
    Some(iter.fold(first, |acc, score| combine(&acc, score)))
}

fn compare_effective_priority(a: &ValenceScore, b: &ValenceScore) -> Ordering {
    match (a.effective_priority(), b.effective_priority()) {
        (Some(pa), Some(pb)) => pa.cmp(&pb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn dominant_by_magnitude<'a>(a: &'a ValenceScore, b: &'a ValenceScore) -> &'a ValenceScore {
    let ordering = a
        .valence_score_magnitude()
        .total_cmp(&b.valence_score_magnitude())
        .then_with(|| a.valence_score.total_cmp(&b.valence_score))
        .then_with(|| b.valence_label.cmp(&a.valence_label));
    match ordering {
        Ordering::Less => b,
        _ => a,
    }
}

/// The lexicographically smaller of the two operands' separators.
fn merged_separator<'a>(a: &'a ValenceScore, b: &'a ValenceScore) -> &'a str {
    a.text_separator.as_str().min(b.text_separator.as_str())
}

/// Union of both descriptions' parts, de-duplicated and sorted.
fn merge_descriptions(a: &ValenceScore, b: &ValenceScore) -> String {
    let parts: BTreeSet<&str> = a.description_parts().chain(b.description_parts()).collect();
    parts.into_iter().collect::<Vec<_>>().join(merged_separator(a, b))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
