//! Mock implementations for testing
//!
//! Provides a scripted sampler, a recording actuator and a counting policy
//! for unit testing without real hardware.

use crate::actuator::{ApplyReport, FanActuator};
use crate::domain::{
    ChannelId, ChannelMode, ChannelRpm, ControlDecision, FanSpeed, MemoryUsage, PowerDraw,
    TelemetrySample, Temperature,
};
use crate::error::{ActuatorError, SensorError};
use crate::policy::{FanPolicy, PolicyKind};
use crate::sensor::TelemetrySampler;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Build a sample from plain numbers
pub fn sample(temp: i32, watts: f64, fan: u8) -> TelemetrySample {
    TelemetrySample::new(
        Temperature::new(temp),
        FanSpeed::new(fan).unwrap(),
        PowerDraw::from_watts(watts),
        MemoryUsage::new(2048, 24576),
    )
}

/// Sampler returning scripted results, then repeating a fallback
#[derive(Debug)]
pub struct MockSampler {
    script: VecDeque<Result<TelemetrySample, SensorError>>,
    fallback: TelemetrySample,
    calls: usize,
}

impl MockSampler {
    /// Sampler that always returns `fallback`
    pub fn new(fallback: TelemetrySample) -> Self {
        Self {
            script: VecDeque::new(),
            fallback,
            calls: 0,
        }
    }

    /// Builder: queue a result to return before the fallback
    pub fn then(mut self, result: Result<TelemetrySample, SensorError>) -> Self {
        self.script.push_back(result);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl TelemetrySampler for MockSampler {
    fn sample(&mut self) -> Result<TelemetrySample, SensorError> {
        self.calls += 1;
        self.script.pop_front().unwrap_or(Ok(self.fallback))
    }

    fn describe(&self) -> String {
        "mock sampler".to_string()
    }
}

/// Actuator recording every call in memory
#[derive(Debug)]
pub struct MockActuator {
    channels: Vec<ChannelId>,
    modes: HashMap<ChannelId, ChannelMode>,
    applied: Vec<ControlDecision>,
    restore_calls: usize,
    verify_error: Option<fn() -> ActuatorError>,
    failing: Vec<ChannelId>,
    rpm: Vec<ChannelRpm>,
}

impl MockActuator {
    /// Actuator with all seven channels in automatic mode
    pub fn new() -> Self {
        let channels = ChannelId::all();
        let modes = channels
            .iter()
            .map(|&c| (c, ChannelMode::Automatic))
            .collect();
        Self {
            channels,
            modes,
            applied: Vec::new(),
            restore_calls: 0,
            verify_error: None,
            failing: Vec::new(),
            rpm: Vec::new(),
        }
    }

    /// Builder: make `verify` fail with the given error
    pub fn with_verify_error(mut self, error: fn() -> ActuatorError) -> Self {
        self.verify_error = Some(error);
        self
    }

    /// Builder: make writes to these channels fail
    pub fn with_failing(mut self, channels: Vec<ChannelId>) -> Self {
        self.failing = channels;
        self
    }

    /// Builder: tachometer readings to report
    pub fn with_rpm(mut self, rpm: Vec<ChannelRpm>) -> Self {
        self.rpm = rpm;
        self
    }

    pub fn applied(&self) -> &[ControlDecision] {
        &self.applied
    }

    pub fn restore_calls(&self) -> usize {
        self.restore_calls
    }

    pub fn mode(&self, channel: ChannelId) -> Option<ChannelMode> {
        self.modes.get(&channel).copied()
    }
}

impl Default for MockActuator {
    fn default() -> Self {
        Self::new()
    }
}

impl FanActuator for MockActuator {
    fn verify(&self) -> Result<(), ActuatorError> {
        match self.verify_error {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }

    fn apply(&mut self, decision: &ControlDecision) -> Result<ApplyReport, ActuatorError> {
        self.applied.push(*decision);

        let mut report = ApplyReport::default();
        for &channel in &self.channels {
            if self.failing.contains(&channel) {
                report.failed.push(channel);
            } else {
                self.modes.insert(channel, ChannelMode::Manual);
                report.applied.push(channel);
            }
        }

        if report.failed.len() == self.channels.len() {
            return Err(ActuatorError::AllChannelsFailed(self.channels.len()));
        }
        Ok(report)
    }

    fn restore_automatic(&mut self) -> Result<(), ActuatorError> {
        self.restore_calls += 1;
        for &channel in &self.channels {
            self.modes.insert(channel, ChannelMode::Automatic);
        }
        Ok(())
    }

    fn read_rpm(&self) -> Vec<ChannelRpm> {
        self.rpm.clone()
    }

    fn channels(&self) -> &[ChannelId] {
        &self.channels
    }
}

/// Policy wrapper counting `decide` calls
pub struct CountingPolicy<P> {
    inner: P,
    calls: Arc<AtomicUsize>,
}

impl<P: FanPolicy> CountingPolicy<P> {
    /// Wrap a policy; the returned counter is shared with the wrapper
    pub fn new(inner: P) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl<P: FanPolicy> FanPolicy for CountingPolicy<P> {
    fn kind(&self) -> PolicyKind {
        self.inner.kind()
    }

    fn decide(&self, sample: &TelemetrySample) -> ControlDecision {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.decide(sample)
    }
}
