//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod decide;
pub mod restore;
pub mod run;
pub mod status;

pub use decide::run_decide;
pub use restore::run_restore;
pub use run::run_control;
pub use status::run_status;

use crate::cli::args::{Cli, PolicyArgs};
use crate::cli::logging;
use crate::config::{Config, ConfigBuilder};
use crate::error::Result;

/// Load the config file and apply the global and policy CLI overrides
pub(crate) fn load_config(cli: &Cli, policy: &PolicyArgs, interval: Option<u64>) -> Result<Config> {
    let config = ConfigBuilder::new()
        .with_file(cli.config.as_deref())?
        .with_verbose(cli.verbose.then_some(true))
        .with_dry_run(cli.dry_run.then_some(true))
        .with_interval(interval)
        .with_policy(policy.policy.map(Into::into))
        .with_hwmon_path(policy.hwmon.hwmon_path.clone())
        .build();

    if config.general.verbose {
        logging::raise_to_debug();
    }

    Ok(config)
}
