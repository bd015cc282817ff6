//! Chassis fan actuator layer
//!
//! Provides trait-based abstractions over the PWM outputs for testability.

pub mod sysfs;
pub mod traits;

pub use sysfs::SysfsActuator;
pub use traits::{ApplyReport, FanActuator};

use crate::config::ControlSettings;

/// Build the sysfs actuator for the configured hwmon directory
pub fn from_settings(settings: &ControlSettings) -> SysfsActuator {
    SysfsActuator::new(settings.hwmon_path.clone(), settings.channels.clone())
        .with_require_root(settings.require_root)
        .with_dry_run(settings.dry_run)
}
