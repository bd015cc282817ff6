//! Telemetry sensor layer
//!
//! Provides trait-based abstractions over the GPU query backends for testability.

pub mod command;
pub mod nvml;
pub mod traits;

pub use command::CommandSampler;
pub use nvml::NvmlSampler;
pub use traits::{parse_record, TelemetrySampler};

use crate::config::{ControlSettings, SensorBackend};
use crate::error::SensorError;

/// Build the sampler selected in the settings
pub fn from_settings(
    settings: &ControlSettings,
) -> Result<Box<dyn TelemetrySampler>, SensorError> {
    let sensor = &settings.sensor;
    let sampler: Box<dyn TelemetrySampler> = match sensor.backend {
        SensorBackend::Smi => Box::new(CommandSampler::nvidia_smi(
            sensor.command.clone(),
            sensor.gpu_index,
            sensor.timeout,
        )),
        SensorBackend::Nvml => Box::new(NvmlSampler::new(sensor.gpu_index)?),
    };

    log::debug!("Telemetry source: {}", sampler.describe());
    Ok(sampler)
}
