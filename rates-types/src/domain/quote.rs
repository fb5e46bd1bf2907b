//! Point-in-time rates and percentage change arithmetic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single rate as reported by the provider for a given day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub rate: f64,
}

/// A live exchange rate plus its change over the previous calendar day.
///
/// `rate` is the amount of `to` received for 1 unit of `from`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub rate: f64,
    pub delta_pct: Option<f64>,
}

impl Quote {
    pub fn new(rate: f64, delta_pct: Option<f64>) -> Self {
        Self { rate, delta_pct }
    }
}

/// Percentage change going from `previous` to `current`.
///
/// Returns `None` when either side is zero or NaN.
pub fn pct_change(previous: f64, current: f64) -> Option<f64> {
    if previous.is_nan() || current.is_nan() || previous == 0.0 || current == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

/// Formats a percentage with two decimals, prefixing gains with `+`.
pub fn format_delta(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{:.2}%", delta)
    } else {
        format!("{:.2}%", delta)
    }
}

/// Formats a converted amount: two decimals from 1 upwards, eight below.
pub fn format_value(value: f64) -> String {
    if value.abs() >= 1.0 {
        format!("{:.2}", value)
    } else {
        format!("{:.8}", value)
    }
}
