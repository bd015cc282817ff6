//! Fan control policies
//!
//! A policy maps one telemetry sample onto a control decision. Policies are
//! pure and deterministic; both variants share the temperature emergency
//! override, which is checked before any zone logic.

pub mod power;
pub mod temperature;

pub use power::PowerScaledPolicy;
pub use temperature::TemperatureScaledPolicy;

use crate::config::ControlSettings;
use crate::domain::{
    ControlDecision, Interpolation, Pwm, PwmRange, StatusLabel, TelemetrySample, Temperature,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which input drives the chassis fans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Board power draw; reacts before temperature catches up
    #[default]
    Power,
    /// GPU core temperature
    Temperature,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Power => write!(f, "power-scaled"),
            PolicyKind::Temperature => write!(f, "temperature-scaled"),
        }
    }
}

/// Limits shared by every policy variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyLimits {
    /// At or above this temperature fans go to full duty
    pub emergency_temp: Temperature,
    pub pwm: PwmRange,
    pub interpolation: Interpolation,
}

impl Default for PolicyLimits {
    fn default() -> Self {
        Self {
            emergency_temp: Temperature::new(70),
            pwm: PwmRange::default(),
            interpolation: Interpolation::default(),
        }
    }
}

impl PolicyLimits {
    /// Emergency decision if the sample is too hot
    pub fn emergency_override(&self, sample: &TelemetrySample) -> Option<ControlDecision> {
        if sample.temperature >= self.emergency_temp {
            Some(ControlDecision::emergency(self.pwm.max()))
        } else {
            None
        }
    }

    /// Build a regular decision from a policy percent
    pub fn decision(&self, percent: u8, status: StatusLabel) -> ControlDecision {
        ControlDecision {
            target_pwm: self.pwm.clamp(Pwm::from_percent(percent)),
            target_percent: percent,
            status,
            override_active: false,
        }
    }
}

/// Maps telemetry to a fan target
pub trait FanPolicy: Send + Sync {
    /// Which variant this is
    fn kind(&self) -> PolicyKind;

    /// Compute the decision for one sample
    fn decide(&self, sample: &TelemetrySample) -> ControlDecision;
}

/// Build the policy selected in the settings
pub fn from_settings(settings: &ControlSettings) -> Box<dyn FanPolicy> {
    match settings.policy {
        PolicyKind::Power => Box::new(PowerScaledPolicy::new(
            settings.power_zones.clone(),
            settings.limits,
        )),
        PolicyKind::Temperature => Box::new(TemperatureScaledPolicy::new(
            settings.temperature_zones.clone(),
            settings.limits,
        )),
    }
}
