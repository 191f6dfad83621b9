//! Rolling and expanding window statistics over gappy numeric sequences.
//!
//! Every function returns one output per input position. A statistic is
//! `None` until its window holds at least `minimum_periods` non-null values.

/// The span of history a statistic looks at for each period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// The current period and the `n - 1` before it.
    Rolling(usize),
    /// Every period from the start up to and including the current one.
    Expanding,
}

impl Window {
    pub fn from_config(is_rolling_window: bool, rolling_periods: usize) -> Self {
        if is_rolling_window {
            Window::Rolling(rolling_periods)
        } else {
            Window::Expanding
        }
    }

    fn start(&self, position: usize) -> usize {
        match self {
            Window::Rolling(n) => (position + 1).saturating_sub(*n),
            Window::Expanding => 0,
        }
    }
}

fn window_values(values: &[Option<f64>], window: Window, position: usize) -> Vec<f64> {
    values[window.start(position)..=position]
        .iter()
        .flatten()
        .copied()
        .collect()
}

/// Mean over each window.
///
/// Expanding windows keep a running sum. Rolling windows are summed afresh
/// so that values leaving the window cannot accumulate rounding error.
pub fn window_mean(
    values: &[Option<f64>],
    window: Window,
    minimum_periods: usize,
) -> Vec<Option<f64>> {
    match window {
        Window::Expanding => {
            let mut sum = 0.0;
            let mut count = 0;
            values
                .iter()
                .map(|value| {
                    if let Some(value) = value {
                        sum += value;
                        count += 1;
                    }
                    mean_of(sum, count, minimum_periods)
                })
                .collect()
        }
        Window::Rolling(_) => (0..values.len())
            .map(|position| {
                let observed = window_values(values, window, position);
                mean_of(observed.iter().sum(), observed.len(), minimum_periods)
            })
            .collect(),
    }
}

fn mean_of(sum: f64, count: usize, minimum_periods: usize) -> Option<f64> {
    if count == 0 || count < minimum_periods {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Quantile over each window, taking the *higher* of the two bracketing
/// observations instead of interpolating between them.
///
/// The window is kept sorted as it slides, so no period re-sorts its history.
pub fn window_quantile_higher(
    values: &[Option<f64>],
    window: Window,
    minimum_periods: usize,
    quantile: f64,
) -> Vec<Option<f64>> {
    let mut sorted: Vec<f64> = Vec::new();
    values
        .iter()
        .enumerate()
        .map(|(position, value)| {
            if let Some(value) = value {
                let at = sorted.partition_point(|held| held.total_cmp(value).is_lt());
                sorted.insert(at, *value);
            }
            if let Window::Rolling(n) = window {
                if let Some(leaving) = position.checked_sub(n).and_then(|source| values[source]) {
                    let at = sorted.partition_point(|held| held.total_cmp(&leaving).is_lt());
                    if at < sorted.len() {
                        sorted.remove(at);
                    }
                }
            }
            quantile_higher(&sorted, minimum_periods, quantile)
        })
        .collect()
}

fn quantile_higher(sorted: &[f64], minimum_periods: usize, quantile: f64) -> Option<f64> {
    if sorted.is_empty() || sorted.len() < minimum_periods {
        return None;
    }
    let rank = (quantile * (sorted.len() - 1) as f64).ceil() as usize;
    Some(sorted[rank.min(sorted.len() - 1)])
}

/// Absolute difference between each value and the one before it.
pub fn absolute_differences(values: &[Option<f64>]) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|position| match position {
            0 => None,
            _ => match (values[position - 1], values[position]) {
                (Some(prev), Some(curr)) => Some((curr - prev).abs()),
                _ => None,
            },
        })
        .collect()
}

/// Signed difference between each value and the one before it.
pub fn differences(values: &[Option<f64>]) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|position| match position {
            0 => None,
            _ => match (values[position - 1], values[position]) {
                (Some(prev), Some(curr)) => Some(curr - prev),
                _ => None,
            },
        })
        .collect()
}

/// Shift values `periods` positions later, filling the start with `None`.
pub fn shift(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|position| position.checked_sub(periods).and_then(|source| values[source]))
        .collect()
}
