//! Power domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Instantaneous board power draw in watts
///
/// Kept as a float for display; zone lookups use [`PowerDraw::whole_watts`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct PowerDraw(f64);

impl PowerDraw {
    /// Create a new power draw from watts
    pub const fn from_watts(watts: f64) -> Self {
        Self(watts)
    }

    /// Create a new power draw from milliwatts
    pub fn from_milliwatts(mw: u32) -> Self {
        Self(f64::from(mw) / 1000.0)
    }

    /// Get the power draw in watts
    #[inline]
    pub const fn as_watts(&self) -> f64 {
        self.0
    }

    /// Power draw truncated toward zero to an integer wattage
    pub fn whole_watts(&self) -> i32 {
        self.0.trunc() as i32
    }
}

impl fmt::Display for PowerDraw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}W", self.0)
    }
}
