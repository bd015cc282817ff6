//! Fan-related domain types
//!
//! Provides validated types for fan speed, PWM duty and hwmon fan channels.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fan speed percentage (0-100)
///
/// Validated on construction to ensure the value is within valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FanSpeed(u8);

impl FanSpeed {
    /// Minimum valid fan speed
    pub const MIN: u8 = 0;
    /// Maximum valid fan speed
    pub const MAX: u8 = 100;

    /// Create a new FanSpeed with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidFanSpeed` if value > 100
    pub fn new(value: u8) -> Result<Self, DomainError> {
        if value > Self::MAX {
            return Err(DomainError::InvalidFanSpeed(value));
        }
        Ok(Self(value))
    }

    /// Get the speed as a percentage value (0-100)
    #[inline]
    pub const fn as_percentage(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for FanSpeed {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FanSpeed> for u8 {
    fn from(speed: FanSpeed) -> Self {
        speed.0
    }
}

/// Raw PWM duty value as written to a `pwmN` register (0-255)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pwm(u8);

impl Pwm {
    /// Fully stopped
    pub const OFF: Pwm = Pwm(0);
    /// Full duty
    pub const FULL: Pwm = Pwm(255);

    /// Create a PWM value
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Convert a percentage to a PWM value, rounding to nearest
    ///
    /// Percentages above 100 saturate at full duty.
    pub fn from_percent(percent: u8) -> Self {
        let percent = u32::from(percent.min(FanSpeed::MAX));
        Self(((percent * 255 + 50) / 100) as u8)
    }

    /// Get the raw register value
    #[inline]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Pwm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allowed PWM band for chassis fans
///
/// The floor keeps fans from stalling; the ceiling is normally full duty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PwmRange {
    min: Pwm,
    max: Pwm,
}

impl PwmRange {
    /// Create a validated PWM range
    pub fn new(min: u8, max: u8) -> Result<Self, DomainError> {
        if min > max {
            return Err(DomainError::InvalidPwmRange { min, max });
        }
        Ok(Self {
            min: Pwm(min),
            max: Pwm(max),
        })
    }

    /// Clamp a PWM value into the band
    pub fn clamp(&self, pwm: Pwm) -> Pwm {
        pwm.clamp(self.min, self.max)
    }

    pub fn min(&self) -> Pwm {
        self.min
    }

    pub fn max(&self) -> Pwm {
        self.max
    }
}

impl Default for PwmRange {
    /// 77 (about 30%) to 255
    fn default() -> Self {
        Self {
            min: Pwm(77),
            max: Pwm::FULL,
        }
    }
}

/// A hwmon fan channel number (1-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ChannelId(u8);

impl ChannelId {
    /// First channel number
    pub const FIRST: u8 = 1;
    /// Last channel number
    pub const LAST: u8 = 7;

    /// Create a validated channel id
    pub fn new(value: u8) -> Result<Self, DomainError> {
        if !(Self::FIRST..=Self::LAST).contains(&value) {
            return Err(DomainError::InvalidChannel(value));
        }
        Ok(Self(value))
    }

    /// All channels 1 through 7
    pub fn all() -> Vec<ChannelId> {
        (Self::FIRST..=Self::LAST).map(ChannelId).collect()
    }

    #[inline]
    pub const fn number(&self) -> u8 {
        self.0
    }

    /// Name of the mode register, e.g. `pwm3_enable`
    pub fn enable_register(&self) -> String {
        format!("pwm{}_enable", self.0)
    }

    /// Name of the duty register, e.g. `pwm3`
    pub fn pwm_register(&self) -> String {
        format!("pwm{}", self.0)
    }

    /// Name of the tachometer register, e.g. `fan3_input`
    pub fn rpm_register(&self) -> String {
        format!("fan{}_input", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fan{}", self.0)
    }
}

impl TryFrom<u8> for ChannelId {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChannelId> for u8 {
    fn from(id: ChannelId) -> Self {
        id.0
    }
}

/// Fan channel control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMode {
    /// Duty set by `pwmN`
    Manual,
    /// Board firmware controls the fan
    #[default]
    Automatic,
}

impl ChannelMode {
    /// Value written to `pwmN_enable`
    pub const fn register_value(&self) -> u8 {
        match self {
            ChannelMode::Manual => 1,
            ChannelMode::Automatic => 5,
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelMode::Manual => write!(f, "Manual"),
            ChannelMode::Automatic => write!(f, "Automatic"),
        }
    }
}

/// Last state written to one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActuatorState {
    pub channel: ChannelId,
    pub mode: ChannelMode,
    pub pwm: Pwm,
}

/// Tachometer reading for one responsive channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelRpm {
    pub channel: ChannelId,
    pub rpm: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_speed_valid() {
        assert!(FanSpeed::new(0).is_ok());
        assert!(FanSpeed::new(50).is_ok());
        assert!(FanSpeed::new(100).is_ok());
    }

    #[test]
    fn test_fan_speed_invalid() {
        assert!(FanSpeed::new(101).is_err());
        assert!(FanSpeed::new(255).is_err());
    }

    #[test]
    fn test_fan_speed_display() {
        let speed = FanSpeed::new(75).unwrap();
        assert_eq!(speed.to_string(), "75%");
    }

    #[test]
    fn test_pwm_from_percent_rounds() {
        assert_eq!(Pwm::from_percent(0).value(), 0);
        assert_eq!(Pwm::from_percent(30).value(), 77);
        assert_eq!(Pwm::from_percent(60).value(), 153);
        assert_eq!(Pwm::from_percent(100).value(), 255);
        assert_eq!(Pwm::from_percent(150).value(), 255);
    }

    #[test]
    fn test_pwm_range_clamp() {
        let range = PwmRange::default();
        assert_eq!(range.clamp(Pwm::OFF).value(), 77);
        assert_eq!(range.clamp(Pwm::new(128)).value(), 128);
        assert_eq!(range.clamp(Pwm::FULL).value(), 255);
    }

    #[test]
    fn test_pwm_range_invalid() {
        assert_eq!(
            PwmRange::new(200, 100),
            Err(DomainError::InvalidPwmRange { min: 200, max: 100 })
        );
    }

    #[test]
    fn test_channel_id_bounds() {
        assert!(ChannelId::new(0).is_err());
        assert!(ChannelId::new(1).is_ok());
        assert!(ChannelId::new(7).is_ok());
        assert!(ChannelId::new(8).is_err());
        assert_eq!(ChannelId::all().len(), 7);
    }

    #[test]
    fn test_channel_register_names() {
        let ch = ChannelId::new(3).unwrap();
        assert_eq!(ch.enable_register(), "pwm3_enable");
        assert_eq!(ch.pwm_register(), "pwm3");
        assert_eq!(ch.rpm_register(), "fan3_input");
    }

    #[test]
    fn test_channel_mode_register_values() {
        assert_eq!(ChannelMode::Manual.register_value(), 1);
        assert_eq!(ChannelMode::Automatic.register_value(), 5);
    }
}
