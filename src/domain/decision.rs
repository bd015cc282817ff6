//! Control decision produced by a fan policy

use super::Pwm;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which band of the policy produced a decision
///
/// Purely informational; never feeds back into control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLabel {
    /// Temperature at or above the emergency threshold
    EmergencyOverride,
    Maximum,
    High,
    Heavy,
    Moderate,
    Light,
    Idle,
    Hot,
    Warm,
    /// Chassis fans follow the GPU's own fan reading
    GpuControlled,
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusLabel::EmergencyOverride => "EMERGENCY",
            StatusLabel::Maximum => "Maximum",
            StatusLabel::High => "High",
            StatusLabel::Heavy => "Heavy",
            StatusLabel::Moderate => "Moderate",
            StatusLabel::Light => "Light",
            StatusLabel::Idle => "Idle",
            StatusLabel::Hot => "Hot",
            StatusLabel::Warm => "Warm",
            StatusLabel::GpuControlled => "GPU-controlled",
        };
        f.write_str(s)
    }
}

/// Target fan output for one control cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlDecision {
    /// PWM duty to write, already clamped into the configured band
    pub target_pwm: Pwm,
    /// Percent computed by the policy (0-100)
    pub target_percent: u8,
    pub status: StatusLabel,
    pub override_active: bool,
}

impl ControlDecision {
    /// Full duty regardless of anything else
    pub fn emergency(max: Pwm) -> Self {
        Self {
            target_pwm: max,
            target_percent: 100,
            status: StatusLabel::EmergencyOverride,
            override_active: true,
        }
    }
}
