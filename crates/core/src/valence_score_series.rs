//! A [`ValenceScore`] for every period of a series.

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{ensure_same_index, validate_index, Period};
use crate::valence_score::{combine, ValenceScore};

/// Ordered valence scores, indexed identically to the data they describe.
///
/// Produced by a single metric check or by combining several. Two series
/// can only be combined when their indices hold the same periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValenceScoreSeries {
    index: Vec<Period>,
    scores: Vec<ValenceScore>,
}

impl ValenceScoreSeries {
    pub fn new(index: Vec<Period>, scores: Vec<ValenceScore>) -> Result<Self, CoreError> {
        if index.len() != scores.len() {
            return Err(CoreError::Validation(format!(
                "index has {} periods but {} valence scores were supplied",
                index.len(),
                scores.len()
            )));
        }
        validate_index(&index)?;
        Ok(Self { index, scores })
    }

    /// Build from an index that the caller already validated.
    pub(crate) fn from_parts(index: &[Period], scores: Vec<ValenceScore>) -> Self {
        debug_assert_eq!(index.len(), scores.len());
        Self {
            index: index.to_vec(),
            scores,
        }
    }

    pub fn index(&self) -> &[Period] {
        &self.index
    }

    pub fn scores(&self) -> &[ValenceScore] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Period, &ValenceScore)> {
        self.index.iter().zip(self.scores.iter())
    }

    /// The score for the most recent period.
    pub fn last_record(&self) -> Option<&ValenceScore> {
        self.scores.last()
    }

    /// Combine period by period. Fails if the indices differ.
    pub fn combine(&self, other: &ValenceScoreSeries) -> Result<ValenceScoreSeries, CoreError> {
        ensure_same_index(
            &self.index,
            &other.index,
            "ValenceScoreSeries can only be combined with an identical index",
        )?;
        let scores = self
            .scores
            .iter()
            .zip(other.scores.iter())
            .map(|(a, b)| combine(a, b))
            .collect();
        Ok(Self {
            index: self.index.clone(),
            scores,
        })
    }

    /// Left-fold several series with [`ValenceScoreSeries::combine`].
    /// `Ok(None)` for an empty input.
    pub fn combine_all<'a>(
        series: impl IntoIterator<Item = &'a ValenceScoreSeries>,
    ) -> Result<Option<ValenceScoreSeries>, CoreError> {
        let mut iter = series.into_iter();
        let Some(first) = iter.next() else {
            return Ok(None);
        };
        iter.try_fold(first.clone(), |acc, next| acc.combine(next))
            .map(Some)
    }
}

impl fmt::Display for ValenceScoreSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValenceScoreSeries with {} periods.", self.len())?;
        if let (Some(period), Some(last)) = (self.index.last(), self.scores.last()) {
            write!(
                f,
                " The most recent period index is {period}. The most recent ValenceScore is {} from {}.",
                last.valence_label(),
                last.metric_check_label()
            )?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
