//! gpufan - GPU-telemetry driven chassis fan control library
//!
//! This library samples GPU telemetry, maps it to a chassis fan duty with
//! a zone policy and writes the result to the motherboard's hwmon PWM
//! registers.
//!
//! # Modules
//!
//! - [`actuator`]: hwmon PWM register writer
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Domain models with validation
//! - [`error`]: Error types
//! - [`policy`]: Fan control policies
//! - [`sensor`]: GPU telemetry samplers
//! - [`services`]: Control loop supervisor and shutdown signalling

pub mod actuator;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod policy;
pub mod sensor;
pub mod services;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
