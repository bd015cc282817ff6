//! Decide command implementation
//!
//! Evaluates the configured policy for hand-entered readings.

use crate::cli::args::{Cli, DecideArgs, PolicyArgs};
use crate::cli::output::{print_output, DecisionReport};
use crate::commands::load_config;
use crate::config::ControlSettings;
use crate::domain::{FanSpeed, MemoryUsage, PowerDraw, TelemetrySample, Temperature};
use crate::error::Result;
use crate::policy;

/// Execute the decide command
pub fn run_decide(cli: &Cli, args: &DecideArgs) -> Result<()> {
    let overrides = PolicyArgs {
        policy: args.policy,
        ..PolicyArgs::default()
    };
    let config = load_config(cli, &overrides, None)?;
    let settings = config.control_settings()?;

    let report = evaluate(args, &settings)?;
    print_output(&report, cli.format)?;

    Ok(())
}

fn evaluate(args: &DecideArgs, settings: &ControlSettings) -> Result<DecisionReport> {
    let sample = TelemetrySample::new(
        Temperature::new(args.temperature),
        FanSpeed::new(args.fan)?,
        PowerDraw::from_watts(args.power),
        MemoryUsage::default(),
    );

    let policy = policy::from_settings(settings);
    Ok(DecisionReport {
        policy: policy.kind().to_string(),
        sample,
        decision: policy.decide(&sample),
    })
}
