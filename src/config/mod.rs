//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::domain::{ChannelId, FanZone, FanZoneTable, Interpolation, PwmRange, Temperature};
use crate::error::ConfigError;
use crate::policy::{PolicyKind, PolicyLimits};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default hwmon directory for the board's Super I/O chip
pub const DEFAULT_HWMON_PATH: &str = "/sys/class/hwmon/hwmon2";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Emergency threshold and PWM band
    pub safety: SafetyConfig,
    /// Telemetry source settings
    pub sensor: SensorConfig,
    /// PWM output settings
    pub actuator: ActuatorConfig,
    /// Zones for the power-scaled policy (watts)
    pub power_zones: Vec<FanZone>,
    /// Zones for the temperature-scaled policy (°C)
    pub temperature_zones: Vec<FanZone>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            safety: SafetyConfig::default(),
            sensor: SensorConfig::default(),
            actuator: ActuatorConfig::default(),
            power_zones: FanZoneTable::default_power().zones().to_vec(),
            temperature_zones: FanZoneTable::default_temperature().zones().to_vec(),
        }
    }
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,
    /// Dry run mode
    pub dry_run: bool,
    /// Control loop interval in seconds
    pub interval_seconds: u64,
    /// Policy variant
    pub policy: PolicyKind,
    /// Interpolation inside zones
    pub interpolation: Interpolation,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            dry_run: false,
            interval_seconds: 5,
            policy: PolicyKind::Power,
            interpolation: Interpolation::Truncating,
        }
    }
}

/// Safety limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Full duty at or above this GPU temperature
    pub emergency_temp_celsius: i32,
    /// Lowest PWM ever written in manual mode
    pub pwm_min: u8,
    /// Highest PWM ever written
    pub pwm_max: u8,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            emergency_temp_celsius: 70,
            pwm_min: 77,
            pwm_max: 255,
        }
    }
}

/// Telemetry backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SensorBackend {
    /// Query the `nvidia-smi` CLI
    #[default]
    Smi,
    /// Query NVML in-process
    Nvml,
}

/// Telemetry source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub backend: SensorBackend,
    /// Program used by the `smi` backend
    pub command: String,
    /// GPU to sample
    pub gpu_index: u32,
    /// Upper bound on one query
    pub timeout_seconds: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            backend: SensorBackend::Smi,
            command: "nvidia-smi".to_string(),
            gpu_index: 0,
            timeout_seconds: 3,
        }
    }
}

/// PWM output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// hwmon directory holding `pwmN`, `pwmN_enable` and `fanN_input`
    pub hwmon_path: PathBuf,
    /// Channels to drive
    pub channels: Vec<u8>,
    /// Refuse to start unless running as root
    pub require_root: bool,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            hwmon_path: PathBuf::from(DEFAULT_HWMON_PATH),
            channels: (ChannelId::FIRST..=ChannelId::LAST).collect(),
            require_root: true,
        }
    }
}

impl ActuatorConfig {
    /// Validated channel list
    pub fn channel_ids(&self) -> Result<Vec<ChannelId>, ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "actuator.channels".to_string(),
                message: "at least one channel is required".to_string(),
            });
        }

        let mut ids = self
            .channels
            .iter()
            .map(|&c| ChannelId::new(c))
            .collect::<Result<Vec<_>, _>>()?;
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

/// Resolved telemetry source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorSettings {
    pub backend: SensorBackend,
    pub command: String,
    pub gpu_index: u32,
    pub timeout: Duration,
}

impl Default for SensorSettings {
    fn default() -> Self {
        let sensor = SensorConfig::default();
        Self {
            backend: sensor.backend,
            command: sensor.command,
            gpu_index: sensor.gpu_index,
            timeout: Duration::from_secs(sensor.timeout_seconds),
        }
    }
}

/// Validated, immutable settings handed to the control loop
///
/// Samplers, actuators and policies are all built from this.
#[derive(Debug, Clone)]
pub struct ControlSettings {
    pub policy: PolicyKind,
    pub limits: PolicyLimits,
    pub power_zones: FanZoneTable,
    pub temperature_zones: FanZoneTable,
    pub interval: Duration,
    pub sensor: SensorSettings,
    pub hwmon_path: PathBuf,
    pub channels: Vec<ChannelId>,
    pub require_root: bool,
    pub dry_run: bool,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            policy: PolicyKind::Power,
            limits: PolicyLimits::default(),
            power_zones: FanZoneTable::default_power(),
            temperature_zones: FanZoneTable::default_temperature(),
            interval: Duration::from_secs(5),
            sensor: SensorSettings::default(),
            hwmon_path: PathBuf::from(DEFAULT_HWMON_PATH),
            channels: ChannelId::all(),
            require_root: true,
            dry_run: false,
        }
    }
}

impl Config {
    /// Validate and convert into control settings
    pub fn control_settings(&self) -> Result<ControlSettings, ConfigError> {
        if self.general.interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "general.interval_seconds".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let limits = PolicyLimits {
            emergency_temp: Temperature::new(self.safety.emergency_temp_celsius),
            pwm: PwmRange::new(self.safety.pwm_min, self.safety.pwm_max)?,
            interpolation: self.general.interpolation,
        };

        Ok(ControlSettings {
            policy: self.general.policy,
            limits,
            power_zones: FanZoneTable::new(self.power_zones.clone())?,
            temperature_zones: FanZoneTable::new(self.temperature_zones.clone())?,
            interval: Duration::from_secs(self.general.interval_seconds),
            sensor: SensorSettings {
                backend: self.sensor.backend,
                command: self.sensor.command.clone(),
                gpu_index: self.sensor.gpu_index,
                timeout: Duration::from_secs(self.sensor.timeout_seconds.max(1)),
            },
            hwmon_path: self.actuator.hwmon_path.clone(),
            channels: self.actuator.channel_ids()?,
            require_root: self.actuator.require_root,
            dry_run: self.general.dry_run,
        })
    }
}
