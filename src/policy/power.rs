//! Power-scaled policy
//!
//! Chassis fan speed follows board power draw. Power rises the moment a
//! load starts, well before the die temperature does.

use super::{FanPolicy, PolicyKind, PolicyLimits};
use crate::domain::{ControlDecision, FanZoneTable, StatusLabel, TelemetrySample, ZoneLookup};

/// Fan target from integer-truncated power draw
#[derive(Debug, Clone)]
pub struct PowerScaledPolicy {
    zones: FanZoneTable,
    limits: PolicyLimits,
}

impl PowerScaledPolicy {
    pub fn new(zones: FanZoneTable, limits: PolicyLimits) -> Self {
        Self { zones, limits }
    }

    pub fn zones(&self) -> &FanZoneTable {
        &self.zones
    }
}

impl Default for PowerScaledPolicy {
    fn default() -> Self {
        Self::new(FanZoneTable::default_power(), PolicyLimits::default())
    }
}

impl FanPolicy for PowerScaledPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Power
    }

    fn decide(&self, sample: &TelemetrySample) -> ControlDecision {
        if let Some(decision) = self.limits.emergency_override(sample) {
            return decision;
        }

        let watts = sample.power_draw.whole_watts();
        match self.zones.lookup(watts, self.limits.interpolation) {
            ZoneLookup::Below => self
                .limits
                .decision(self.zones.first().percent_low, StatusLabel::Idle),
            ZoneLookup::Within { zone, percent } => self.limits.decision(percent, zone.label),
            ZoneLookup::Above { percent, .. } => {
                self.limits.decision(percent, StatusLabel::Maximum)
            }
        }
    }
}
