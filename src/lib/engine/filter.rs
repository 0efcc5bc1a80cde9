//! Threshold filters for per-analysis coverage and proportion values.
//!
//! Parsers report either a measured value or one of two sentinels. [`FilterValue`]
//! captures that domain and [`ThresholdFilter`] maps every value onto exactly one
//! [`FilterOutcome`]:
//!
//! | value              | passed | symbol |
//! |--------------------|--------|--------|
//! | not applicable `-` | true   | `-`    |
//! | missing `?`        | false  | `?`    |
//! | `v >= threshold`   | true   | `Y`    |
//! | `v < threshold`    | false  | `N`    |
//!
//! Reference-only inputs (FASTA-like sources) carry no depth information, so
//! not applicable never disqualifies a call.

use crate::core::error::{Result, VtmError};
use std::fmt;
use std::str::FromStr;

/// A coverage or proportion value as reported by a parsing collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterValue {
    /// No value was reported for this kind of source.
    NotApplicable,
    /// The position was absent from the source.
    Missing,
    /// A measured non-negative depth or fraction.
    Value(f64),
}

impl FilterValue {
    /// Wrap a measured value, rejecting NaN, infinities and negatives.
    pub fn measured(value: f64) -> Result<Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(FilterValue::Value(value))
        } else {
            Err(VtmError::InvalidFilterValue {
                value: value.to_string(),
            })
        }
    }
}

impl FromStr for FilterValue {
    type Err = VtmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "-" => Ok(FilterValue::NotApplicable),
            "?" => Ok(FilterValue::Missing),
            other => other
                .parse::<f64>()
                .map_err(|_| VtmError::InvalidFilterValue {
                    value: other.to_string(),
                })
                .and_then(FilterValue::measured),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::NotApplicable => write!(f, "-"),
            FilterValue::Missing => write!(f, "?"),
            FilterValue::Value(v) => write!(f, "{}", v),
        }
    }
}

/// Result of evaluating one filter for one analysis at one locus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOutcome {
    pub passed: bool,
    pub symbol: char,
}

impl FilterOutcome {
    const NOT_APPLICABLE: FilterOutcome = FilterOutcome { passed: true, symbol: '-' };
    const MISSING: FilterOutcome = FilterOutcome { passed: false, symbol: '?' };
    const PASS: FilterOutcome = FilterOutcome { passed: true, symbol: 'Y' };
    const FAIL: FilterOutcome = FilterOutcome { passed: false, symbol: 'N' };
}

/// A minimum-value filter with a threshold fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdFilter {
    threshold: f64,
}

impl ThresholdFilter {
    /// Create a filter named `field` for error reporting.
    ///
    /// The threshold must be finite and positive.
    pub fn new(field: &str, threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(VtmError::ThresholdValidation {
                field: field.to_string(),
                value: threshold,
            });
        }
        Ok(Self { threshold })
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Decide whether `value` passes this filter.
    #[inline(always)]
    pub fn evaluate(&self, value: FilterValue) -> FilterOutcome {
        match value {
            FilterValue::NotApplicable => FilterOutcome::NOT_APPLICABLE,
            FilterValue::Missing => FilterOutcome::MISSING,
            FilterValue::Value(v) if v >= self.threshold => FilterOutcome::PASS,
            FilterValue::Value(_) => FilterOutcome::FAIL,
        }
    }
}
