//! Run command implementation
//!
//! Runs the main control loop until SIGINT/SIGTERM.

use crate::cli::args::{Cli, RunArgs};
use crate::cli::output::{print_output, Message, StatusLine};
use crate::commands::load_config;
use crate::error::{AppError, Result};
use crate::services::{ShutdownSignal, Supervisor, SupervisorConfig};
use crate::{actuator, policy, sensor};

/// Execute the run command
pub fn run_control(cli: &Cli, args: &RunArgs) -> Result<()> {
    let config = load_config(cli, &args.policy, args.interval)?;
    let settings = config.control_settings()?;

    if settings.dry_run {
        log::info!("Dry run: PWM registers will not be written");
    }

    let sampler = sensor::from_settings(&settings)?;
    let actuator = actuator::from_settings(&settings);
    let policy = policy::from_settings(&settings);

    let shutdown = ShutdownSignal::new();
    shutdown
        .install_handler()
        .map_err(|e| AppError::Io(std::io::Error::other(e.to_string())))?;

    let supervisor_config = SupervisorConfig {
        interval: settings.interval,
        single_use: args.single_use,
    };

    let mut supervisor = Supervisor::new(supervisor_config, policy, sampler, actuator, shutdown);

    let format = cli.format;
    supervisor.run(|report| {
        if let Err(e) = print_output(&StatusLine::from(report), format) {
            log::warn!("Failed to write status: {}", e);
        }
    })?;

    let msg = Message {
        message: "Fan control stopped".to_string(),
        success: true,
    };
    print_output(&msg, format)?;

    Ok(())
}
