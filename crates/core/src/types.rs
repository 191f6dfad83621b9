//! Period index and time-indexed series types.
//!
//! A [`Series`] pairs an ordered, unique [`Period`] index with one value per
//! period. Numeric metric data uses `Option<f64>` values so that leading and
//! trailing gaps can be represented; annotations use plain strings.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Period
// ---------------------------------------------------------------------------

/// One period label in a series index: either a calendar date or an integer.
///
/// Serialized untagged, so `3` reads as an ordinal and `"2050-01-01"` as a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Period {
    Ordinal(i64),
    Date(NaiveDate),
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Ordinal(n) => write!(f, "{n}"),
            Period::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<i64> for Period {
    fn from(n: i64) -> Self {
        Period::Ordinal(n)
    }
}

impl From<NaiveDate> for Period {
    fn from(d: NaiveDate) -> Self {
        Period::Date(d)
    }
}

/// Build an ordinal index `0..len`.
pub fn ordinal_index(len: usize) -> Vec<Period> {
    (0..len as i64).map(Period::Ordinal).collect()
}

/// Validate that an index is strictly increasing (which implies unique).
pub fn validate_index(index: &[Period]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(index.len());
    for (position, period) in index.iter().enumerate() {
        if !seen.insert(*period) {
            return Err(CoreError::Validation(format!(
                "duplicate period {period} at position {position}"
            )));
        }
        if position > 0 && index[position - 1] > *period {
            return Err(CoreError::Validation(format!(
                "period {period} at position {position} is out of order"
            )));
        }
    }
    Ok(())
}

/// Require two indices to hold the same periods in the same order.
pub fn ensure_same_index(
    left: &[Period],
    right: &[Period],
    context: &str,
) -> Result<(), CoreError> {
    if left.len() != right.len() {
        return Err(CoreError::IndexMismatch(format!(
            "{context}: index lengths differ ({} vs {})",
            left.len(),
            right.len()
        )));
    }
    if let Some(position) = left.iter().zip(right).position(|(l, r)| l != r) {
        return Err(CoreError::IndexMismatch(format!(
            "{context}: periods differ at position {position} ({} vs {})",
            left[position], right[position]
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// An ordered collection of values keyed by period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series<T> {
    index: Vec<Period>,
    values: Vec<T>,
}

/// A numeric metric series. `None` marks a missing period.
pub type MetricSeries = Series<Option<f64>>;

/// A free-text annotation series. An empty string means "no annotation".
pub type AnnotationSeries = Series<String>;

impl<T> Series<T> {
    /// Create a series, validating that the index is unique, ordered, and
    /// the same length as `values`.
    pub fn new(index: Vec<Period>, values: Vec<T>) -> Result<Self, CoreError> {
        if index.len() != values.len() {
            return Err(CoreError::Validation(format!(
                "index has {} periods but {} values were supplied",
                index.len(),
                values.len()
            )));
        }
        validate_index(&index)?;
        Ok(Self { index, values })
    }

    pub fn index(&self) -> &[Period] {
        &self.index
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(period, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&Period, &T)> {
        self.index.iter().zip(self.values.iter())
    }

    /// Build a new series on the same index by mapping every value.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Series<U> {
        Series {
            index: self.index.clone(),
            values: self.values.iter().map(f).collect(),
        }
    }
}

impl MetricSeries {
    /// Build a series over an ordinal index from plain numbers.
    /// `NaN` values are treated as missing.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let values: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| if v.is_nan() { None } else { Some(v) })
            .collect();
        Self {
            index: ordinal_index(values.len()),
            values,
        }
    }

    /// Build a series over an ordinal index from optional numbers.
    pub fn from_optional_values(values: Vec<Option<f64>>) -> Self {
        let values: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        Self {
            index: ordinal_index(values.len()),
            values,
        }
    }

    /// Require that no null appears between the first and last non-null values.
    ///
    /// Leading and trailing nulls are allowed: a forecast may start late and
    /// actuals may end early.
    pub fn validate_contiguous(&self, name: &str) -> Result<(), CoreError> {
        let first = self.values.iter().position(Option::is_some);
        let last = self.values.iter().rposition(Option::is_some);
        if let (Some(first), Some(last)) = (first, last) {
            if let Some(offset) = self.values[first..=last].iter().position(Option::is_none) {
                return Err(CoreError::NonContiguous {
                    name: name.to_string(),
                    position: first + offset,
                });
            }
        }
        Ok(())
    }
}

impl AnnotationSeries {
    /// An all-empty annotation series aligned to `index`.
    pub fn empty_for(index: &[Period]) -> Self {
        Self {
            index: index.to_vec(),
            values: vec![String::new(); index.len()],
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn date(s: &str) -> Period {
        Period::Date(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
    }

    // -- Series::new ----------------------------------------------------------

    #[test]
    fn new_rejects_length_mismatch() {
        let result = MetricSeries::new(ordinal_index(3), vec![Some(1.0)]);
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn new_rejects_duplicate_periods() {
        let index = vec![date("2050-01-01"), date("2050-01-01")];
        let result = MetricSeries::new(index, vec![Some(1.0), Some(2.0)]);
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn new_rejects_unordered_periods() {
        let index = vec![Period::Ordinal(2), Period::Ordinal(1)];
        let result = MetricSeries::new(index, vec![Some(1.0), Some(2.0)]);
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn from_values_treats_nan_as_missing() {
        let s = MetricSeries::from_values([1.0, f64::NAN, 3.0]);
        assert_eq!(s.values(), &[Some(1.0), None, Some(3.0)]);
        assert_eq!(s.index(), ordinal_index(3).as_slice());
    }

    // -- validate_contiguous --------------------------------------------------

    #[test]
    fn leading_and_trailing_nulls_are_allowed() {
        let s = MetricSeries::from_optional_values(vec![None, Some(1.0), Some(2.0), None]);
        assert!(s.validate_contiguous("s").is_ok());
    }

    #[test]
    fn all_null_series_is_contiguous() {
        let s = MetricSeries::from_optional_values(vec![None, None]);
        assert!(s.validate_contiguous("s").is_ok());
    }

    #[test]
    fn internal_null_is_rejected_with_position() {
        let s = MetricSeries::from_optional_values(vec![None, Some(1.0), None, Some(2.0)]);
        assert_matches!(
            s.validate_contiguous("target"),
            Err(CoreError::NonContiguous { position: 2, .. })
        );
    }

    // -- ensure_same_index ----------------------------------------------------

    #[test]
    fn same_index_accepts_independently_built_indices() {
        assert!(ensure_same_index(&ordinal_index(4), &ordinal_index(4), "test").is_ok());
    }

    #[test]
    fn same_index_rejects_shifted_periods() {
        let shifted: Vec<Period> = (10..14).map(Period::Ordinal).collect();
        assert_matches!(
            ensure_same_index(&ordinal_index(4), &shifted, "test"),
            Err(CoreError::IndexMismatch(_))
        );
    }

    // -- Period ---------------------------------------------------------------

    #[test]
    fn period_deserializes_untagged() {
        let periods: Vec<Period> = serde_json::from_str(r#"[3, "2050-01-02"]"#).unwrap();
        assert_eq!(periods, vec![Period::Ordinal(3), date("2050-01-02")]);
        assert_eq!(periods[1].to_string(), "2050-01-02");
    }
}
