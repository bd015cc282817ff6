//! Status command implementation
//!
//! Samples once and shows what the policy would do, without writing PWM.

use crate::actuator::{self, FanActuator};
use crate::cli::args::{Cli, PolicyArgs};
use crate::cli::output::{print_output, StatusLine};
use crate::commands::load_config;
use crate::error::Result;
use crate::{policy, sensor};

/// Execute the status command
pub fn run_status(cli: &Cli, args: &PolicyArgs) -> Result<()> {
    let config = load_config(cli, args, None)?;
    let settings = config.control_settings()?;

    let mut sampler = sensor::from_settings(&settings)?;
    let sample = sampler.sample()?;
    let decision = policy::from_settings(&settings).decide(&sample);

    // RPM reads need no privileges; missing hwmon just means no fans listed
    let fans = actuator::from_settings(&settings).read_rpm();

    let status = StatusLine::new(
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        sample,
        decision,
        fans,
    );
    print_output(&status, cli.format)?;

    Ok(())
}
