//! Unified error types for gpufan
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Process lacks the privilege to write the PWM registers (fatal)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The hwmon directory does not exist (fatal)
    #[error("Fan control boundary unavailable: {} does not exist", path.display())]
    BoundaryUnavailable { path: PathBuf },

    /// Telemetry could not be read this cycle (recoverable)
    #[error("Sensor unavailable: {0}")]
    SensorUnavailable(#[from] SensorError),

    /// Error from the PWM actuator
    #[error("Actuator error: {0}")]
    Actuator(#[from] ActuatorError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from domain type validation
    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Lift a failed actuator verification into its fatal top-level form
    pub fn from_verify(err: ActuatorError) -> Self {
        match err {
            ActuatorError::PermissionDenied(msg) => AppError::PermissionDenied(msg),
            ActuatorError::BoundaryMissing { path } => AppError::BoundaryUnavailable { path },
            other => AppError::Actuator(other),
        }
    }

    /// Whether this error must abort the process before the control loop starts
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::PermissionDenied(_)
                | AppError::BoundaryUnavailable { .. }
                | AppError::Config(_)
        )
    }
}

/// Errors from the telemetry sensor boundary
///
/// Every variant means "no sample this cycle"; the control loop retries.
#[derive(Error, Debug)]
pub enum SensorError {
    /// The query produced no output
    #[error("sensor query returned empty output")]
    EmptyOutput,

    /// The record did not have the expected number of fields
    #[error("malformed sensor record '{record}': expected {expected} fields, got {got}")]
    Malformed {
        record: String,
        expected: usize,
        got: usize,
    },

    /// A field could not be parsed as a number
    #[error("invalid value for {field}: '{value}'")]
    InvalidField { field: &'static str, value: String },

    /// The query did not finish in time
    #[error("sensor query timed out after {0:?}")]
    Timeout(Duration),

    /// The query command could not be started
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The query command exited unsuccessfully
    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// NVML query failed
    #[error("NVML error: {0}")]
    Nvml(String),
}

/// Errors from the PWM actuator boundary
#[derive(Error, Debug)]
pub enum ActuatorError {
    /// Writing a register failed
    #[error("failed to write {value} to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        value: u8,
        #[source]
        source: std::io::Error,
    },

    /// The hwmon directory is missing
    #[error("hwmon path {} not found", path.display())]
    BoundaryMissing { path: PathBuf },

    /// The process may not write the registers
    #[error("{0}")]
    PermissionDenied(String),

    /// No channel accepted the command
    #[error("all {0} fan channels failed")]
    AllChannelsFailed(usize),
}

/// Errors from domain type validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid fan speed value (must be 0-100)
    #[error("Invalid fan speed: {0}% (must be 0-100)")]
    InvalidFanSpeed(u8),

    /// Invalid hwmon channel number
    #[error("Invalid fan channel: {0} (must be 1-7)")]
    InvalidChannel(u8),

    /// Invalid PWM bounds
    #[error("Invalid PWM range: min {min} is greater than max {max}")]
    InvalidPwmRange { min: u8, max: u8 },

    /// Zone table violates ordering/continuity rules
    #[error("Invalid zone table: {0}")]
    InvalidZoneTable(String),

    /// Invalid value provided
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Domain validation failed while building settings
    #[error("Invalid configuration: {0}")]
    Domain(#[from] DomainError),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_display() {
        let err = DomainError::InvalidFanSpeed(150);
        assert_eq!(err.to_string(), "Invalid fan speed: 150% (must be 0-100)");
    }

    #[test]
    fn test_boundary_error_display() {
        let err = AppError::BoundaryUnavailable {
            path: PathBuf::from("/sys/class/hwmon/hwmon9"),
        };
        assert!(err.to_string().contains("/sys/class/hwmon/hwmon9"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_sensor_error_is_recoverable() {
        let err: AppError = SensorError::EmptyOutput.into();
        assert!(matches!(err, AppError::SensorUnavailable(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_invalid_field_display() {
        let err = SensorError::InvalidField {
            field: "power.draw",
            value: "[N/A]".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value for power.draw: '[N/A]'");
    }

    #[test]
    fn test_from_verify_lifts_fatal_variants() {
        let err = AppError::from_verify(ActuatorError::PermissionDenied("uid 1000".to_string()));
        assert!(matches!(err, AppError::PermissionDenied(_)));

        let err = AppError::from_verify(ActuatorError::AllChannelsFailed(7));
        assert!(matches!(err, AppError::Actuator(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_error_conversion() {
        let domain_err = DomainError::InvalidChannel(9);
        let app_err: AppError = domain_err.into();
        assert!(matches!(app_err, AppError::Domain(_)));
    }
}
