//! Control loop supervisor
//!
//! Orchestrates the control loop: sample, decide, apply and report at a
//! fixed interval, then hand the fans back to the board on shutdown.

use crate::actuator::{ApplyReport, FanActuator};
use crate::domain::{ChannelRpm, ControlDecision, TelemetrySample};
use crate::error::AppError;
use crate::policy::FanPolicy;
use crate::sensor::TelemetrySampler;
use crate::services::ShutdownSignal;

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Lifecycle of the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SupervisorState {
    Initializing,
    Running,
    ShuttingDown,
    Terminated,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorState::Initializing => write!(f, "initializing"),
            SupervisorState::Running => write!(f, "running"),
            SupervisorState::ShuttingDown => write!(f, "shutting down"),
            SupervisorState::Terminated => write!(f, "terminated"),
        }
    }
}

/// Configuration for the supervisor
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Interval between control cycles
    pub interval: Duration,
    /// Whether to exit after one cycle
    pub single_use: bool,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            single_use: false,
        }
    }
}

/// Everything one cycle observed and did
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub timestamp: DateTime<Local>,
    pub sample: TelemetrySample,
    pub decision: ControlDecision,
    pub apply: ApplyReport,
    pub rpm: Vec<ChannelRpm>,
}

/// Control loop state machine
pub struct Supervisor<S, A> {
    config: SupervisorConfig,
    policy: Box<dyn FanPolicy>,
    sampler: S,
    actuator: A,
    shutdown: ShutdownSignal,
    state: SupervisorState,
}

impl<S: TelemetrySampler, A: FanActuator> Supervisor<S, A> {
    /// Create a new supervisor in the `Initializing` state
    pub fn new(
        config: SupervisorConfig,
        policy: Box<dyn FanPolicy>,
        sampler: S,
        actuator: A,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            config,
            policy,
            sampler,
            actuator,
            shutdown,
            state: SupervisorState::Initializing,
        }
    }

    /// Verify privileges and the actuator boundary, then enter `Running`
    ///
    /// # Errors
    /// `PermissionDenied` or `BoundaryUnavailable`; both are fatal.
    pub fn initialize(&mut self) -> Result<(), AppError> {
        self.actuator.verify().map_err(AppError::from_verify)?;

        log::info!(
            "Controlling {} channel(s) with {} policy every {:?}",
            self.actuator.channels().len(),
            self.policy.kind(),
            self.config.interval
        );
        log::info!("Telemetry source: {}", self.sampler.describe());

        self.state = SupervisorState::Running;
        Ok(())
    }

    /// Execute a single control cycle
    ///
    /// A sensor failure returns before the policy is consulted.
    pub fn cycle(&mut self) -> Result<CycleReport, AppError> {
        let sample = self.sampler.sample()?;
        let decision = self.policy.decide(&sample);

        log::debug!(
            "{} / {} -> {}% (PWM {}) [{}]",
            sample.temperature,
            sample.power_draw,
            decision.target_percent,
            decision.target_pwm,
            decision.status
        );

        let apply = self.actuator.apply(&decision)?;
        let rpm = self.actuator.read_rpm();

        Ok(CycleReport {
            timestamp: Local::now(),
            sample,
            decision,
            apply,
            rpm,
        })
    }

    /// Run the control loop until shutdown is requested
    ///
    /// `on_cycle` is called with every successful cycle's report.
    pub fn run<F>(&mut self, mut on_cycle: F) -> Result<(), AppError>
    where
        F: FnMut(&CycleReport),
    {
        if let Err(e) = self.initialize() {
            self.state = SupervisorState::Terminated;
            return Err(e);
        }

        while !self.shutdown.is_triggered() {
            match self.cycle() {
                Ok(report) => on_cycle(&report),
                Err(AppError::SensorUnavailable(e)) => {
                    log::warn!(
                        "Sensor unavailable, retrying in {:?}: {}",
                        self.config.interval,
                        e
                    );
                }
                Err(e) => log::error!("Control cycle failed: {}", e),
            }

            if self.config.single_use {
                log::info!("Single-use mode: exiting after one cycle");
                break;
            }

            if self.shutdown.wait_timeout(self.config.interval) {
                break;
            }
        }

        self.shutdown_sequence();
        Ok(())
    }

    /// Restore automatic fan control and terminate
    ///
    /// Runs at most once; later calls are no-ops.
    pub fn shutdown_sequence(&mut self) {
        if matches!(
            self.state,
            SupervisorState::ShuttingDown | SupervisorState::Terminated
        ) {
            return;
        }

        self.state = SupervisorState::ShuttingDown;
        log::info!("Restoring automatic fan control...");

        match self.actuator.restore_automatic() {
            Ok(()) => log::info!(
                "Restored {} channel(s) to automatic control",
                self.actuator.channels().len()
            ),
            Err(e) => log::error!("Failed to restore automatic fan control: {}", e),
        }

        self.state = SupervisorState::Terminated;
    }

    /// Current lifecycle state
    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Get the supervisor configuration
    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChannelId, ChannelMode, StatusLabel};
    use crate::error::{ActuatorError, SensorError};
    use crate::mock::{sample, CountingPolicy, MockActuator, MockSampler};
    use crate::policy::PowerScaledPolicy;
    use std::sync::atomic::Ordering;
    use std::thread;
    use std::time::Instant;

    fn supervisor(
        sampler: MockSampler,
        actuator: MockActuator,
        config: SupervisorConfig,
    ) -> Supervisor<MockSampler, MockActuator> {
        Supervisor::new(
            config,
            Box::new(PowerScaledPolicy::default()),
            sampler,
            actuator,
            ShutdownSignal::new(),
        )
    }

    fn single_use() -> SupervisorConfig {
        SupervisorConfig {
            interval: Duration::from_millis(10),
            single_use: true,
        }
    }

    #[test]
    fn test_supervisor_config_default() {
        let config = SupervisorConfig::default();
        assert_eq!(config.interval, Duration::from_secs(5));
        assert!(!config.single_use);
    }

    #[test]
    fn test_initialize_enters_running() {
        let mut sup = supervisor(
            MockSampler::new(sample(40, 10.0, 30)),
            MockActuator::new(),
            single_use(),
        );
        assert_eq!(sup.state(), SupervisorState::Initializing);
        sup.initialize().unwrap();
        assert_eq!(sup.state(), SupervisorState::Running);
    }

    #[test]
    fn test_permission_denied_is_fatal() {
        let actuator = MockActuator::new()
            .with_verify_error(|| ActuatorError::PermissionDenied("not root".to_string()));
        let mut sup = supervisor(MockSampler::new(sample(40, 10.0, 30)), actuator, single_use());

        let err = sup.run(|_| {}).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
        assert_eq!(sup.state(), SupervisorState::Terminated);
        assert_eq!(sup.sampler().calls(), 0);
        assert_eq!(sup.actuator().restore_calls(), 0);
    }

    #[test]
    fn test_missing_boundary_is_fatal() {
        let actuator = MockActuator::new().with_verify_error(|| ActuatorError::BoundaryMissing {
            path: "/sys/class/hwmon/hwmon9".into(),
        });
        let mut sup = supervisor(MockSampler::new(sample(40, 10.0, 30)), actuator, single_use());

        let err = sup.run(|_| {}).unwrap_err();
        assert!(matches!(err, AppError::BoundaryUnavailable { .. }));
        assert!(sup.actuator().applied().is_empty());
    }

    #[test]
    fn test_cycle_applies_decision() {
        let mut sup = supervisor(
            MockSampler::new(sample(40, 300.0, 30)),
            MockActuator::new(),
            single_use(),
        );
        sup.initialize().unwrap();

        let report = sup.cycle().unwrap();
        assert_eq!(report.decision.target_percent, 60);
        assert_eq!(report.decision.target_pwm.value(), 153);
        assert_eq!(report.apply.applied.len(), 7);
        assert_eq!(sup.actuator().applied().len(), 1);
    }

    #[test]
    fn test_sensor_failure_skips_decision_and_continues() {
        let sampler = MockSampler::new(sample(40, 10.0, 30)).then(Err(SensorError::EmptyOutput));
        let (policy, decide_calls) = CountingPolicy::new(PowerScaledPolicy::default());
        let shutdown = ShutdownSignal::new();
        let mut sup = Supervisor::new(
            SupervisorConfig {
                interval: Duration::from_millis(5),
                single_use: false,
            },
            Box::new(policy),
            sampler,
            MockActuator::new(),
            shutdown.clone(),
        );

        let err = sup.cycle().unwrap_err();
        assert!(matches!(err, AppError::SensorUnavailable(_)));
        assert_eq!(decide_calls.load(Ordering::SeqCst), 0);
        assert!(sup.actuator().applied().is_empty());

        // The loop keeps going after a failed sample
        let mut reports = Vec::new();
        sup.run(|r| {
            reports.push(r.decision);
            if reports.len() == 2 {
                shutdown.trigger();
            }
        })
        .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].status, StatusLabel::Idle);
        assert_eq!(reports[0].target_pwm.value(), 77);
        assert_eq!(decide_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_actuator_total_failure_does_not_halt() {
        let actuator = MockActuator::new().with_failing(ChannelId::all());
        let shutdown = ShutdownSignal::new();
        let mut sup = Supervisor::new(
            SupervisorConfig {
                interval: Duration::from_millis(5),
                single_use: false,
            },
            Box::new(PowerScaledPolicy::default()),
            MockSampler::new(sample(40, 10.0, 30)),
            actuator,
            shutdown.clone(),
        );

        let remote = shutdown.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(60));
            remote.trigger();
        });

        sup.run(|_| panic!("no cycle should succeed")).unwrap();
        handle.join().unwrap();

        assert!(sup.sampler().calls() >= 2);
        assert_eq!(sup.actuator().restore_calls(), 1);
    }

    #[test]
    fn test_shutdown_mid_sleep_restores_once() {
        let shutdown = ShutdownSignal::new();
        let mut sup = Supervisor::new(
            SupervisorConfig {
                interval: Duration::from_secs(30),
                single_use: false,
            },
            Box::new(PowerScaledPolicy::default()),
            MockSampler::new(sample(40, 200.0, 30)),
            MockActuator::new(),
            shutdown.clone(),
        );

        let remote = shutdown.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            remote.trigger();
        });

        let started = Instant::now();
        sup.run(|_| {}).unwrap();
        handle.join().unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(sup.state(), SupervisorState::Terminated);
        assert_eq!(sup.actuator().restore_calls(), 1);
        for ch in ChannelId::all() {
            assert_eq!(sup.actuator().mode(ch), Some(ChannelMode::Automatic));
        }

        // A second shutdown request is a no-op
        sup.shutdown_sequence();
        assert_eq!(sup.actuator().restore_calls(), 1);
    }

    #[test]
    fn test_single_use_runs_one_cycle() {
        let mut sup = supervisor(
            MockSampler::new(sample(75, 600.0, 30)),
            MockActuator::new(),
            single_use(),
        );

        let mut seen = Vec::new();
        sup.run(|r| seen.push(r.decision)).unwrap();

        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].status, StatusLabel::EmergencyOverride);
        assert_eq!(seen[0].target_pwm.value(), 255);
        assert_eq!(sup.actuator().restore_calls(), 1);
    }

    #[test]
    fn test_cycle_report_includes_rpm() {
        let ch2 = ChannelId::new(2).unwrap();
        let actuator = MockActuator::new().with_rpm(vec![ChannelRpm {
            channel: ch2,
            rpm: 900,
        }]);
        let mut sup = supervisor(MockSampler::new(sample(40, 100.0, 30)), actuator, single_use());

        let report = sup.cycle().unwrap();
        assert_eq!(report.rpm.len(), 1);
        assert_eq!(report.rpm[0].rpm, 900);
    }
}
