//! Trait definitions for fan outputs

use crate::domain::{ChannelId, ChannelRpm, ControlDecision};
use crate::error::ActuatorError;
use serde::Serialize;

/// Outcome of applying one decision across all channels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Channels written this cycle
    pub applied: Vec<ChannelId>,
    /// Channels already holding the target state
    pub unchanged: Vec<ChannelId>,
    /// Channels whose write failed
    pub failed: Vec<ChannelId>,
}

impl ApplyReport {
    /// Whether every channel holds the target
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Chassis fan output driver
///
/// Writes are strictly sequential; implementations need no locking.
pub trait FanActuator {
    /// Check privileges and that the output boundary exists
    fn verify(&self) -> Result<(), ActuatorError>;

    /// Put every channel in manual mode at the decision's PWM
    ///
    /// A failing channel is logged and skipped. Errors only when no channel
    /// took the command.
    fn apply(&mut self, decision: &ControlDecision) -> Result<ApplyReport, ActuatorError>;

    /// Hand every channel back to automatic control; safe to repeat
    fn restore_automatic(&mut self) -> Result<(), ActuatorError>;

    /// Best-effort RPM readings; silent or unreadable channels are omitted
    fn read_rpm(&self) -> Vec<ChannelRpm>;

    /// Channels driven by this actuator
    fn channels(&self) -> &[ChannelId];
}

impl<T: FanActuator + ?Sized> FanActuator for Box<T> {
    fn verify(&self) -> Result<(), ActuatorError> {
        (**self).verify()
    }

    fn apply(&mut self, decision: &ControlDecision) -> Result<ApplyReport, ActuatorError> {
        (**self).apply(decision)
    }

    fn restore_automatic(&mut self) -> Result<(), ActuatorError> {
        (**self).restore_automatic()
    }

    fn read_rpm(&self) -> Vec<ChannelRpm> {
        (**self).read_rpm()
    }

    fn channels(&self) -> &[ChannelId] {
        (**self).channels()
    }
}
