//! Axis ranges: the time window on x and optional bounds on y.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use crate::core::{
    constants::TF_PLOT,
    error::ConfigError,
    timecalc::seconds_between,
};

/// Displayed time range. `start < end` holds for every value of this type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ConfigError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(ConfigError::InvalidWindow { start, end })
        }
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Exact width, for equality tests.
    #[inline]
    #[must_use]
    pub fn width(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Width in seconds, always positive.
    #[inline]
    #[must_use]
    pub fn span_seconds(&self) -> f64 {
        seconds_between(self.start, self.end)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.start.format(TF_PLOT),
            self.end.format(TF_PLOT)
        )
    }
}

/// Y-axis bounds; `None` lets the backend auto-scale that side.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct YRange {
    pub low: Option<f64>,
    pub high: Option<f64>,
}

impl YRange {
    pub const AUTO: Self = Self {
        low: None,
        high: None,
    };

    #[inline]
    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.low.is_none() && self.high.is_none()
    }
}

impl fmt::Display for YRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        write!(f, "{}:{}", side(self.low), side(self.high))
    }
}
