//! Domain models for gpufan
//!
//! This module contains all domain types with validation.
//! Types are validated on construction (fail-fast pattern).

pub mod decision;
pub mod fan;
pub mod power;
pub mod telemetry;
pub mod thermal;
pub mod zone;

pub use decision::{ControlDecision, StatusLabel};
pub use fan::{ActuatorState, ChannelId, ChannelMode, ChannelRpm, FanSpeed, Pwm, PwmRange};
pub use power::PowerDraw;
pub use telemetry::{MemoryUsage, TelemetrySample};
pub use thermal::Temperature;
pub use zone::{FanZone, FanZoneTable, Interpolation, ZoneLookup};
