//! NVML telemetry backend
//!
//! Reads the same fields as the command backend through nvml-wrapper,
//! avoiding a process spawn every cycle.

use crate::domain::{FanSpeed, MemoryUsage, PowerDraw, TelemetrySample, Temperature};
use crate::error::SensorError;
use crate::sensor::traits::TelemetrySampler;

use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
use nvml_wrapper::Nvml;

const MIB: u64 = 1024 * 1024;

/// Telemetry sampler backed by NVML
pub struct NvmlSampler {
    nvml: Nvml,
    gpu_index: u32,
}

impl NvmlSampler {
    /// Initialize NVML for one GPU
    pub fn new(gpu_index: u32) -> Result<Self, SensorError> {
        let nvml = Nvml::init().map_err(|e| match e {
            nvml_wrapper::error::NvmlError::LibloadingError(_) => {
                SensorError::Nvml("NVML library not found. Is the NVIDIA driver installed?".into())
            }
            nvml_wrapper::error::NvmlError::DriverNotLoaded => {
                SensorError::Nvml("NVIDIA driver not loaded".to_string())
            }
            other => SensorError::Nvml(other.to_string()),
        })?;

        Ok(Self { nvml, gpu_index })
    }

    fn convert_error(err: nvml_wrapper::error::NvmlError) -> SensorError {
        use nvml_wrapper::error::NvmlError as NE;
        match err {
            NE::NotSupported => SensorError::Nvml("query not supported by this GPU".to_string()),
            NE::GpuLost => SensorError::Nvml("GPU is lost or has become inaccessible".to_string()),
            other => SensorError::Nvml(other.to_string()),
        }
    }
}

impl TelemetrySampler for NvmlSampler {
    fn sample(&mut self) -> Result<TelemetrySample, SensorError> {
        let device = self
            .nvml
            .device_by_index(self.gpu_index)
            .map_err(Self::convert_error)?;

        let temp = device
            .temperature(TemperatureSensor::Gpu)
            .map_err(Self::convert_error)?;
        let fan = device.fan_speed(0).map_err(Self::convert_error)?;
        let power_mw = device.power_usage().map_err(Self::convert_error)?;
        let mem = device.memory_info().map_err(Self::convert_error)?;

        let fan_speed = u8::try_from(fan)
            .ok()
            .and_then(|f| FanSpeed::new(f).ok())
            .ok_or_else(|| SensorError::InvalidField {
                field: "fan.speed",
                value: fan.to_string(),
            })?;

        Ok(TelemetrySample::new(
            Temperature::from(temp),
            fan_speed,
            PowerDraw::from_milliwatts(power_mw),
            MemoryUsage::new(mem.used / MIB, mem.total / MIB),
        ))
    }

    fn describe(&self) -> String {
        format!("NVML GPU {}", self.gpu_index)
    }
}
