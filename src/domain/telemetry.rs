//! GPU telemetry sample

use super::{FanSpeed, PowerDraw, Temperature};
use serde::Serialize;
use std::fmt;

/// VRAM usage in MiB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct MemoryUsage {
    pub used_mib: u64,
    pub total_mib: u64,
}

impl MemoryUsage {
    pub fn new(used_mib: u64, total_mib: u64) -> Self {
        Self {
            used_mib,
            total_mib,
        }
    }
}

impl fmt::Display for MemoryUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} MiB", self.used_mib, self.total_mib)
    }
}

/// One poll of the GPU sensors
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetrySample {
    /// GPU core temperature
    pub temperature: Temperature,
    /// GPU's own fan speed as reported by the driver
    pub fan_speed: FanSpeed,
    /// Board power draw
    pub power_draw: PowerDraw,
    /// VRAM usage
    pub memory: MemoryUsage,
}

impl TelemetrySample {
    pub fn new(
        temperature: Temperature,
        fan_speed: FanSpeed,
        power_draw: PowerDraw,
        memory: MemoryUsage,
    ) -> Self {
        Self {
            temperature,
            fan_speed,
            power_draw,
            memory,
        }
    }
}
