//! Temperature-scaled policy
//!
//! Below the first zone the chassis fans mirror the GPU's own fan reading.

use super::{FanPolicy, PolicyKind, PolicyLimits};
use crate::domain::{ControlDecision, FanZoneTable, StatusLabel, TelemetrySample, ZoneLookup};

/// Fan target from GPU core temperature
#[derive(Debug, Clone)]
pub struct TemperatureScaledPolicy {
    zones: FanZoneTable,
    limits: PolicyLimits,
}

impl TemperatureScaledPolicy {
    pub fn new(zones: FanZoneTable, limits: PolicyLimits) -> Self {
        Self { zones, limits }
    }

    pub fn zones(&self) -> &FanZoneTable {
        &self.zones
    }
}

impl Default for TemperatureScaledPolicy {
    fn default() -> Self {
        Self::new(FanZoneTable::default_temperature(), PolicyLimits::default())
    }
}

impl FanPolicy for TemperatureScaledPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Temperature
    }

    fn decide(&self, sample: &TelemetrySample) -> ControlDecision {
        if let Some(decision) = self.limits.emergency_override(sample) {
            return decision;
        }

        let celsius = sample.temperature.as_celsius();
        match self.zones.lookup(celsius, self.limits.interpolation) {
            ZoneLookup::Below => self.limits.decision(
                sample.fan_speed.as_percentage(),
                StatusLabel::GpuControlled,
            ),
            ZoneLookup::Within { zone, percent } | ZoneLookup::Above { zone, percent } => {
                self.limits.decision(percent, zone.label)
            }
        }
    }
}
