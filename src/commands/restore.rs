//! Restore command implementation
//!
//! Hands every fan channel back to the board, e.g. after a crash left them
//! in manual mode.

use crate::actuator::{self, FanActuator};
use crate::cli::args::{Cli, HwmonArgs, PolicyArgs};
use crate::cli::output::{print_output, Message};
use crate::commands::load_config;
use crate::error::{AppError, Result};

/// Execute the restore command
pub fn run_restore(cli: &Cli, args: &HwmonArgs) -> Result<()> {
    let overrides = PolicyArgs {
        policy: None,
        hwmon: HwmonArgs {
            hwmon_path: args.hwmon_path.clone(),
        },
    };
    let config = load_config(cli, &overrides, None)?;
    let settings = config.control_settings()?;
    let mut actuator = actuator::from_settings(&settings);

    actuator.verify().map_err(AppError::from_verify)?;
    actuator.restore_automatic()?;

    let msg = Message {
        message: format!(
            "Restored {} channel(s) under {} to automatic control",
            actuator.channels().len(),
            actuator.root().display()
        ),
        success: true,
    };
    print_output(&msg, cli.format)?;

    Ok(())
}
