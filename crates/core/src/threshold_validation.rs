//! Shared configuration validation helpers.
//!
//! Provides reusable range and ordering checks used by the metric check
//! constructors. Every failure is a `CoreError::Configuration`.

use crate::error::CoreError;

/// Validate that a value falls within `[0.0, 1.0]`.
pub fn validate_unit_range(value: f64, name: &str) -> Result<(), CoreError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CoreError::Configuration(format!(
            "{name} must be between 0.0 and 1.0, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a value is finite and strictly positive.
pub fn validate_positive(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::Configuration(format!(
            "{name} must be a positive number, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a value is finite and not negative.
pub fn validate_non_negative(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Configuration(format!(
            "{name} must be zero or greater, got {value}"
        )));
    }
    Ok(())
}

/// Validate that the inner (L1) constant is strictly below the outer (L2) one.
pub fn validate_levels(l1: f64, l2: f64, l1_name: &str, l2_name: &str) -> Result<(), CoreError> {
    if l1 >= l2 || l1.is_nan() || l2.is_nan() {
        return Err(CoreError::Configuration(format!(
            "{l1_name} ({l1}) must be less than {l2_name} ({l2})"
        )));
    }
    Ok(())
}

/// Validate that named thresholds are finite and strictly increasing.
pub fn validate_strictly_increasing(thresholds: &[(&str, f64)]) -> Result<(), CoreError> {
    for (name, value) in thresholds {
        if !value.is_finite() {
            return Err(CoreError::Configuration(format!(
                "{name} must be a finite number, got {value}"
            )));
        }
    }
    for pair in thresholds.windows(2) {
        let (lower_name, lower) = pair[0];
        let (upper_name, upper) = pair[1];
        if lower >= upper {
            return Err(CoreError::Configuration(format!(
                "thresholds must be strictly increasing: {lower_name} ({lower}) >= {upper_name} ({upper})"
            )));
        }
    }
    Ok(())
}

/// Validate a rolling-window configuration.
///
/// `rolling_periods` only matters for rolling windows but must still be
/// non-zero; `minimum_periods` may not exceed a rolling window's length.
pub fn validate_window(
    is_rolling_window: bool,
    rolling_periods: usize,
    minimum_periods: usize,
) -> Result<(), CoreError> {
    if rolling_periods == 0 {
        return Err(CoreError::Configuration(
            "rolling_periods must be at least 1".to_string(),
        ));
    }
    if minimum_periods == 0 {
        return Err(CoreError::Configuration(
            "minimum_periods must be at least 1".to_string(),
        ));
    }
    if is_rolling_window && minimum_periods > rolling_periods {
        return Err(CoreError::Configuration(format!(
            "minimum_periods ({minimum_periods}) cannot exceed rolling_periods ({rolling_periods})"
        )));
    }
    Ok(())
}
