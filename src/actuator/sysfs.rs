//! hwmon sysfs actuator
//!
//! Drives `pwmN_enable` / `pwmN` and reads `fanN_input` under one hwmon
//! directory (typically a Super I/O chip such as nct6775).

use crate::actuator::traits::{ApplyReport, FanActuator};
use crate::domain::{ActuatorState, ChannelId, ChannelMode, ChannelRpm, ControlDecision, Pwm};
use crate::error::ActuatorError;

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

/// Fan actuator writing hwmon sysfs registers
#[derive(Debug)]
pub struct SysfsActuator {
    root: PathBuf,
    channels: Vec<ChannelId>,
    require_root: bool,
    dry_run: bool,
    applied: HashMap<ChannelId, ActuatorState>,
}

impl SysfsActuator {
    /// Create an actuator for the given hwmon directory and channels
    pub fn new(root: impl Into<PathBuf>, channels: Vec<ChannelId>) -> Self {
        Self {
            root: root.into(),
            channels,
            require_root: true,
            dry_run: false,
            applied: HashMap::new(),
        }
    }

    /// Builder: skip the effective-uid check (e.g. udev grants write access)
    pub fn with_require_root(mut self, require_root: bool) -> Self {
        self.require_root = require_root;
        self
    }

    /// Builder: log writes instead of performing them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Last state written to a channel, if known
    pub fn state(&self, channel: ChannelId) -> Option<ActuatorState> {
        self.applied.get(&channel).copied()
    }

    fn write_register(&self, name: &str, value: u8) -> Result<(), ActuatorError> {
        let path = self.root.join(name);
        fs::write(&path, value.to_string()).map_err(|source| ActuatorError::Write {
            path,
            value,
            source,
        })
    }

    fn set_channel(
        &self,
        channel: ChannelId,
        mode: ChannelMode,
        pwm: Pwm,
    ) -> Result<(), ActuatorError> {
        self.write_register(&channel.enable_register(), mode.register_value())?;
        if mode == ChannelMode::Manual {
            self.write_register(&channel.pwm_register(), pwm.value())?;
        }
        Ok(())
    }

    /// Whether `pwmN_enable` still reads back as manual
    fn holds_manual(&self, channel: ChannelId) -> bool {
        fs::read_to_string(self.root.join(channel.enable_register()))
            .ok()
            .and_then(|content| content.trim().parse::<u8>().ok())
            == Some(ChannelMode::Manual.register_value())
    }

    fn read_channel_rpm(&self, channel: ChannelId) -> Option<u32> {
        let content = fs::read_to_string(self.root.join(channel.rpm_register())).ok()?;
        content.trim().parse::<u32>().ok().filter(|&rpm| rpm > 0)
    }
}

/// Whether the process runs with effective uid 0
fn is_effective_root() -> bool {
    // /proc/self is owned by the effective uid of the reading process
    fs::metadata("/proc/self")
        .map(|m| m.uid() == 0)
        .unwrap_or(false)
}

impl FanActuator for SysfsActuator {
    fn verify(&self) -> Result<(), ActuatorError> {
        if !self.dry_run && self.require_root && !is_effective_root() {
            return Err(ActuatorError::PermissionDenied(
                "root privileges are required to write PWM registers".to_string(),
            ));
        }

        if !self.root.is_dir() {
            return Err(ActuatorError::BoundaryMissing {
                path: self.root.clone(),
            });
        }

        if self.dry_run {
            return Ok(());
        }

        if let Some(first) = self.channels.first() {
            let path = self.root.join(first.enable_register());
            match OpenOptions::new().write(true).open(&path) {
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                    return Err(ActuatorError::PermissionDenied(format!(
                        "cannot write {}",
                        path.display()
                    )));
                }
                Err(e) => log::warn!("Could not probe {}: {}", path.display(), e),
            }
        }

        Ok(())
    }

    fn apply(&mut self, decision: &ControlDecision) -> Result<ApplyReport, ActuatorError> {
        let mut report = ApplyReport::default();

        for &channel in &self.channels {
            let target = ActuatorState {
                channel,
                mode: ChannelMode::Manual,
                pwm: decision.target_pwm,
            };

            if self.applied.get(&channel) == Some(&target) {
                if self.holds_manual(channel) {
                    report.unchanged.push(channel);
                    continue;
                }
                log::warn!("{} left manual mode, re-asserting PWM {}", channel, target.pwm);
            }

            if self.dry_run {
                log::info!(
                    "[DRY RUN] Would set {} to manual, PWM {}",
                    channel,
                    target.pwm
                );
                report.applied.push(channel);
                continue;
            }

            match self.set_channel(channel, target.mode, target.pwm) {
                Ok(()) => {
                    self.applied.insert(channel, target);
                    report.applied.push(channel);
                }
                Err(e) => {
                    log::warn!("Failed to set {}: {}", channel, e);
                    self.applied.remove(&channel);
                    report.failed.push(channel);
                }
            }
        }

        if !report.unchanged.is_empty() {
            log::debug!(
                "{} channel(s) already at PWM {}",
                report.unchanged.len(),
                decision.target_pwm
            );
        }

        if !self.channels.is_empty() && report.failed.len() == self.channels.len() {
            return Err(ActuatorError::AllChannelsFailed(self.channels.len()));
        }

        Ok(report)
    }

    fn restore_automatic(&mut self) -> Result<(), ActuatorError> {
        self.applied.clear();

        let mut failed = 0;
        for &channel in &self.channels {
            if self.dry_run {
                log::info!("[DRY RUN] Would set {} to automatic", channel);
                continue;
            }

            if let Err(e) = self.set_channel(channel, ChannelMode::Automatic, Pwm::OFF) {
                log::warn!("Failed to restore {} to automatic: {}", channel, e);
                failed += 1;
            }
        }

        if !self.channels.is_empty() && failed == self.channels.len() {
            return Err(ActuatorError::AllChannelsFailed(failed));
        }

        Ok(())
    }

    fn read_rpm(&self) -> Vec<ChannelRpm> {
        self.channels
            .iter()
            .filter_map(|&channel| {
                self.read_channel_rpm(channel)
                    .map(|rpm| ChannelRpm { channel, rpm })
            })
            .collect()
    }

    fn channels(&self) -> &[ChannelId] {
        &self.channels
    }
}

impl Drop for SysfsActuator {
    /// Hand channels back to the board if we are unwinding without a restore
    fn drop(&mut self) {
        if self.applied.is_empty() {
            return;
        }
        log::warn!("Actuator dropped with channels in manual mode, restoring automatic control");
        if let Err(e) = self.restore_automatic() {
            log::error!("Failed to restore automatic fan control: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StatusLabel;
    use tempfile::TempDir;

    fn hwmon_tree() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for ch in ChannelId::all() {
            fs::write(dir.path().join(ch.enable_register()), "5").unwrap();
            fs::write(dir.path().join(ch.pwm_register()), "0").unwrap();
            fs::write(dir.path().join(ch.rpm_register()), "0").unwrap();
        }
        dir
    }

    fn read(dir: &TempDir, name: &str) -> String {
        fs::read_to_string(dir.path().join(name)).unwrap()
    }

    fn decision(pwm: u8) -> ControlDecision {
        ControlDecision {
            target_pwm: Pwm::new(pwm),
            target_percent: 50,
            status: StatusLabel::Moderate,
            override_active: false,
        }
    }

    fn actuator(dir: &TempDir) -> SysfsActuator {
        SysfsActuator::new(dir.path(), ChannelId::all()).with_require_root(false)
    }

    #[test]
    fn test_apply_writes_all_channels() {
        let dir = hwmon_tree();
        let mut act = actuator(&dir);

        let report = act.apply(&decision(128)).unwrap();
        assert_eq!(report.applied.len(), 7);
        assert!(report.is_complete());

        for ch in ChannelId::all() {
            assert_eq!(read(&dir, &ch.enable_register()), "1");
            assert_eq!(read(&dir, &ch.pwm_register()), "128");
        }
    }

    #[test]
    fn test_apply_skips_redundant_writes() {
        let dir = hwmon_tree();
        let mut act = actuator(&dir);
        act.apply(&decision(100)).unwrap();

        // Scribble over a register; an unchanged decision must not rewrite it
        fs::write(dir.path().join("pwm1"), "42").unwrap();
        let report = act.apply(&decision(100)).unwrap();
        assert_eq!(report.unchanged.len(), 7);
        assert_eq!(read(&dir, "pwm1"), "42");

        let report = act.apply(&decision(101)).unwrap();
        assert_eq!(report.applied.len(), 7);
        assert_eq!(read(&dir, "pwm1"), "101");
    }

    #[test]
    fn test_apply_reasserts_channel_returned_to_automatic() {
        let dir = hwmon_tree();
        let mut act = actuator(&dir);
        act.apply(&decision(150)).unwrap();

        // Firmware flips pwm2 back to automatic behind our back
        fs::write(dir.path().join("pwm2_enable"), "5").unwrap();
        fs::write(dir.path().join("pwm2"), "60").unwrap();

        let report = act.apply(&decision(150)).unwrap();
        let ch2 = ChannelId::new(2).unwrap();
        assert_eq!(report.applied, vec![ch2]);
        assert_eq!(report.unchanged.len(), 6);
        assert_eq!(read(&dir, "pwm2_enable"), "1");
        assert_eq!(read(&dir, "pwm2"), "150");
    }

    #[test]
    fn test_drop_restores_manual_channels() {
        let dir = hwmon_tree();
        let mut act = actuator(&dir);
        act.apply(&decision(190)).unwrap();
        assert_eq!(read(&dir, "pwm5_enable"), "1");

        drop(act);
        for ch in ChannelId::all() {
            assert_eq!(read(&dir, &ch.enable_register()), "5");
        }
    }

    #[test]
    fn test_panic_during_control_restores_automatic() {
        let dir = hwmon_tree();
        let root = dir.path().to_path_buf();

        let result = std::panic::catch_unwind(move || {
            let mut act = SysfsActuator::new(root, ChannelId::all()).with_require_root(false);
            act.apply(&decision(210)).unwrap();
            panic!("control loop failure");
        });

        assert!(result.is_err());
        assert_eq!(read(&dir, "pwm1_enable"), "5");
    }

    #[test]
    fn test_partial_failure_is_tolerated() {
        let dir = hwmon_tree();
        let ch3 = ChannelId::new(3).unwrap();
        fs::remove_file(dir.path().join(ch3.pwm_register())).unwrap();
        fs::create_dir(dir.path().join(ch3.pwm_register())).unwrap();

        let mut act = actuator(&dir);
        let report = act.apply(&decision(200)).unwrap();

        assert_eq!(report.failed, vec![ch3]);
        assert_eq!(report.applied.len(), 6);
        assert!(act.state(ch3).is_none());
        assert_eq!(read(&dir, "pwm7"), "200");
    }

    #[test]
    fn test_all_channels_failing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let mut act = SysfsActuator::new(&missing, ChannelId::all()).with_require_root(false);
        assert!(matches!(
            act.apply(&decision(200)),
            Err(ActuatorError::AllChannelsFailed(7))
        ));
    }

    #[test]
    fn test_restore_automatic_is_idempotent() {
        let dir = hwmon_tree();
        let mut act = actuator(&dir);
        act.apply(&decision(180)).unwrap();

        act.restore_automatic().unwrap();
        act.restore_automatic().unwrap();

        for ch in ChannelId::all() {
            assert_eq!(read(&dir, &ch.enable_register()), "5");
            assert!(act.state(ch).is_none());
        }

        // Tracking was cleared, so the next apply writes again
        let report = act.apply(&decision(180)).unwrap();
        assert_eq!(report.applied.len(), 7);
    }

    #[test]
    fn test_read_rpm_omits_silent_channels() {
        let dir = hwmon_tree();
        fs::write(dir.path().join("fan1_input"), "850\n").unwrap();
        fs::write(dir.path().join("fan4_input"), "1210").unwrap();
        fs::write(dir.path().join("fan5_input"), "garbage").unwrap();
        fs::remove_file(dir.path().join("fan6_input")).unwrap();

        let rpm = actuator(&dir).read_rpm();
        let pairs: Vec<(u8, u32)> = rpm.iter().map(|r| (r.channel.number(), r.rpm)).collect();
        assert_eq!(pairs, vec![(1, 850), (4, 1210)]);
    }

    #[test]
    fn test_verify_missing_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let act = SysfsActuator::new(dir.path().join("hwmon9"), ChannelId::all())
            .with_require_root(false);
        assert!(matches!(
            act.verify(),
            Err(ActuatorError::BoundaryMissing { .. })
        ));
    }

    #[test]
    fn test_verify_existing_boundary() {
        let dir = hwmon_tree();
        assert!(actuator(&dir).verify().is_ok());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = hwmon_tree();
        let mut act = actuator(&dir).with_dry_run(true);
        let report = act.apply(&decision(222)).unwrap();
        assert_eq!(report.applied.len(), 7);
        act.restore_automatic().unwrap();

        assert_eq!(read(&dir, "pwm2"), "0");
        assert_eq!(read(&dir, "pwm2_enable"), "5");
    }
}
