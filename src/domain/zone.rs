//! Fan zone tables
//!
//! A zone maps a half-open input range (watts or °C) onto a percent range.
//! Tables are validated on construction (fail-fast pattern): zones must be
//! contiguous, non-overlapping and monotonically increasing in both input
//! and output.

use super::StatusLabel;
use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// How a percent is interpolated inside a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Integer arithmetic with truncating division
    #[default]
    Truncating,
    /// Floating point, rounded to the nearest percent
    Smooth,
}

/// One band of a zone table, covering inputs in `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanZone {
    pub start: i32,
    pub end: i32,
    pub percent_low: u8,
    pub percent_high: u8,
    pub label: StatusLabel,
}

impl FanZone {
    pub const fn new(
        start: i32,
        end: i32,
        percent_low: u8,
        percent_high: u8,
        label: StatusLabel,
    ) -> Self {
        Self {
            start,
            end,
            percent_low,
            percent_high,
            label,
        }
    }

    /// Whether `value` falls inside this zone
    pub fn contains(&self, value: i32) -> bool {
        value >= self.start && value < self.end
    }

    /// Percent at `value`, which must lie inside the zone
    pub fn percent_at(&self, value: i32, interpolation: Interpolation) -> u8 {
        let offset = i64::from(value - self.start);
        let span = i64::from(self.end - self.start);
        let rise = i64::from(self.percent_high) - i64::from(self.percent_low);

        let delta = match interpolation {
            Interpolation::Truncating => offset * rise / span,
            Interpolation::Smooth => (offset as f64 * rise as f64 / span as f64).round() as i64,
        };

        (i64::from(self.percent_low) + delta).clamp(0, 100) as u8
    }
}

/// Result of looking a value up in a zone table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneLookup {
    /// Below the first zone
    Below,
    /// Inside a zone
    Within { zone: FanZone, percent: u8 },
    /// At or above the end of the last zone
    Above { zone: FanZone, percent: u8 },
}

/// Ordered, validated set of zones
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FanZoneTable {
    zones: Vec<FanZone>,
}

impl FanZoneTable {
    /// Create a validated zone table
    ///
    /// # Errors
    /// Returns `DomainError::InvalidZoneTable` when the zones are empty,
    /// inverted, overlapping, discontiguous or not monotonic.
    pub fn new(zones: Vec<FanZone>) -> Result<Self, DomainError> {
        if zones.is_empty() {
            return Err(DomainError::InvalidZoneTable(
                "at least one zone is required".to_string(),
            ));
        }

        for (i, zone) in zones.iter().enumerate() {
            if zone.start >= zone.end {
                return Err(DomainError::InvalidZoneTable(format!(
                    "zone {} has start {} not below end {}",
                    i, zone.start, zone.end
                )));
            }
            if zone.percent_low > zone.percent_high || zone.percent_high > 100 {
                return Err(DomainError::InvalidZoneTable(format!(
                    "zone {} has invalid percent range {}-{}",
                    i, zone.percent_low, zone.percent_high
                )));
            }
        }

        for (i, pair) in zones.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.end != next.start {
                return Err(DomainError::InvalidZoneTable(format!(
                    "zones {} and {} are not contiguous ({} != {})",
                    i,
                    i + 1,
                    prev.end,
                    next.start
                )));
            }
            if prev.percent_high > next.percent_low {
                return Err(DomainError::InvalidZoneTable(format!(
                    "zone {} output {}% exceeds zone {} output {}%",
                    i,
                    prev.percent_high,
                    i + 1,
                    next.percent_low
                )));
            }
        }

        Ok(Self { zones })
    }

    /// Look up the zone and percent for an input value
    pub fn lookup(&self, value: i32, interpolation: Interpolation) -> ZoneLookup {
        let first = self.first();
        let last = self.last();

        if value < first.start {
            return ZoneLookup::Below;
        }
        if value >= last.end {
            return ZoneLookup::Above {
                zone: *last,
                percent: last.percent_high,
            };
        }

        // Contiguity guarantees a hit
        let zone = self
            .zones
            .iter()
            .find(|z| z.contains(value))
            .unwrap_or(last);

        ZoneLookup::Within {
            zone: *zone,
            percent: zone.percent_at(value, interpolation),
        }
    }

    pub fn zones(&self) -> &[FanZone] {
        &self.zones
    }

    /// Lowest zone
    pub fn first(&self) -> &FanZone {
        &self.zones[0]
    }

    /// Highest zone
    pub fn last(&self) -> &FanZone {
        &self.zones[self.zones.len() - 1]
    }

    /// Power zones in watts
    pub fn default_power() -> Self {
        Self {
            zones: vec![
                FanZone::new(30, 150, 30, 40, StatusLabel::Light),
                FanZone::new(150, 300, 40, 60, StatusLabel::Moderate),
                FanZone::new(300, 450, 60, 80, StatusLabel::Heavy),
                FanZone::new(450, 550, 80, 100, StatusLabel::High),
            ],
        }
    }

    /// Temperature zones in °C
    pub fn default_temperature() -> Self {
        Self {
            zones: vec![
                FanZone::new(50, 60, 50, 75, StatusLabel::Warm),
                FanZone::new(60, 70, 75, 100, StatusLabel::Hot),
            ],
        }
    }
}
