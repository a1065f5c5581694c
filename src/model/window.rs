//! Date windows and availability state
//!
//! Dates are day numbers. Windows are inclusive on both ends.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A day number
pub type Day = u32;

/// Inclusive `[start, end]` range of days.
///
/// Construction guarantees `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    start: Day,
    end: Day,
}

impl DateWindow {
    /// Create a window, or `None` if `start > end`
    pub fn new(start: Day, end: Day) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// First day of the window
    pub fn start(&self) -> Day {
        self.start
    }

    /// Last day of the window
    pub fn end(&self) -> Day {
        self.end
    }

    /// Returns true if the two windows share at least one day
    pub fn intersects(&self, other: &DateWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Matching state of an inventory listing or route.
///
/// `Reserved` is terminal: a reserved item never matches again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Reserved,
}

impl Availability {
    pub fn is_available(self) -> bool {
        self == Availability::Available
    }

    pub fn from_flag(available: bool) -> Self {
        if available {
            Availability::Available
        } else {
            Availability::Reserved
        }
    }
}
