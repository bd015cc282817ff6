//! Trait definitions for telemetry sources
//!
//! These traits abstract over the GPU query backend to enable testing with mocks.

use crate::domain::{FanSpeed, MemoryUsage, PowerDraw, TelemetrySample, Temperature};
use crate::error::SensorError;

/// Field names in query order
pub const FIELDS: [&str; 5] = [
    "temperature.gpu",
    "fan.speed",
    "power.draw",
    "memory.used",
    "memory.total",
];

/// Source of GPU telemetry
pub trait TelemetrySampler {
    /// Read one sample
    ///
    /// Any error means no sample this cycle; callers retry on the next one.
    fn sample(&mut self) -> Result<TelemetrySample, SensorError>;

    /// Short human-readable description of the source
    fn describe(&self) -> String;
}

impl<T: TelemetrySampler + ?Sized> TelemetrySampler for Box<T> {
    fn sample(&mut self) -> Result<TelemetrySample, SensorError> {
        (**self).sample()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Parse one `temperature, fan, power, mem_used, mem_total` record
///
/// Only the first non-empty line is considered. Fields are trimmed before
/// parsing.
pub fn parse_record(output: &str) -> Result<TelemetrySample, SensorError> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or(SensorError::EmptyOutput)?;

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != FIELDS.len() {
        return Err(SensorError::Malformed {
            record: line.to_string(),
            expected: FIELDS.len(),
            got: fields.len(),
        });
    }

    let temperature: i32 = parse_field(FIELDS[0], fields[0])?;
    let fan: u8 = parse_field(FIELDS[1], fields[1])?;
    let power: f64 = parse_field(FIELDS[2], fields[2])?;
    let used: u64 = parse_field(FIELDS[3], fields[3])?;
    let total: u64 = parse_field(FIELDS[4], fields[4])?;

    let fan_speed = FanSpeed::new(fan).map_err(|_| invalid(FIELDS[1], fields[1]))?;
    if !power.is_finite() {
        return Err(invalid(FIELDS[2], fields[2]));
    }

    Ok(TelemetrySample::new(
        Temperature::new(temperature),
        fan_speed,
        PowerDraw::from_watts(power),
        MemoryUsage::new(used, total),
    ))
}

fn parse_field<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, SensorError> {
    value.parse().map_err(|_| invalid(field, value))
}

fn invalid(field: &'static str, value: &str) -> SensorError {
    SensorError::InvalidField {
        field,
        value: value.to_string(),
    }
}
