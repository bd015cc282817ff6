//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use crate::policy::PolicyKind;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Chassis fan controller driven by GPU telemetry
///
/// Scales motherboard fan PWM with GPU power draw or temperature.
#[derive(Parser, Debug)]
#[command(name = "gpufan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "GPUFAN_CONFIG")]
    pub config: Option<String>,

    /// Dry run mode - don't actually write PWM registers
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the fan control loop
    Run(RunArgs),

    /// Show one telemetry sample, the resulting decision and fan RPM
    Status(PolicyArgs),

    /// Evaluate the policy for given readings without touching hardware
    Decide(DecideArgs),

    /// Hand all fan channels back to automatic control
    Restore(HwmonArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Policy variant argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum PolicyArg {
    /// Scale with board power draw
    Power,
    /// Scale with GPU temperature
    Temperature,
}

impl From<PolicyArg> for PolicyKind {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Power => PolicyKind::Power,
            PolicyArg::Temperature => PolicyKind::Temperature,
        }
    }
}

/// hwmon directory override
#[derive(Parser, Debug, Default)]
pub struct HwmonArgs {
    /// hwmon directory holding the pwm registers
    #[arg(long, value_name = "PATH")]
    pub hwmon_path: Option<PathBuf>,
}

/// Policy override
#[derive(Parser, Debug, Default)]
pub struct PolicyArgs {
    /// Policy variant (overrides the config file)
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    #[command(flatten)]
    pub hwmon: HwmonArgs,
}

/// Arguments for the control loop command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Control loop interval in seconds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Run one cycle, restore automatic control and exit
    #[arg(long)]
    pub single_use: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Arguments for the decide command
#[derive(Parser, Debug)]
pub struct DecideArgs {
    /// GPU temperature in °C
    #[arg(long = "temp", allow_negative_numbers = true)]
    pub temperature: i32,

    /// Board power draw in watts
    #[arg(long)]
    pub power: f64,

    /// GPU fan speed percentage (used below the temperature zones)
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub fan: u8,

    /// Policy variant (overrides the config file)
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run_defaults() {
        let args = Cli::try_parse_from(["gpufan", "run"]).unwrap();
        if let Commands::Run(run) = args.command {
            assert_eq!(run.interval, None);
            assert!(!run.single_use);
            assert!(run.policy.policy.is_none());
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_verbose() {
        let args = Cli::try_parse_from(["gpufan", "-v", "status"]).unwrap();
        assert!(args.verbose);
    }

    #[test]
    fn test_cli_parse_run_args() {
        let args = Cli::try_parse_from([
            "gpufan",
            "run",
            "--interval",
            "10",
            "--single-use",
            "--policy",
            "temperature",
            "--hwmon-path",
            "/sys/class/hwmon/hwmon4",
        ])
        .unwrap();

        if let Commands::Run(run) = args.command {
            assert_eq!(run.interval, Some(10));
            assert!(run.single_use);
            assert!(matches!(run.policy.policy, Some(PolicyArg::Temperature)));
            assert_eq!(
                run.policy.hwmon.hwmon_path,
                Some(PathBuf::from("/sys/class/hwmon/hwmon4"))
            );
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_zero_interval_rejected() {
        let result = Cli::try_parse_from(["gpufan", "run", "--interval", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_decide() {
        let args =
            Cli::try_parse_from(["gpufan", "decide", "--temp", "40", "--power", "300"]).unwrap();
        if let Commands::Decide(decide) = args.command {
            assert_eq!(decide.temperature, 40);
            assert!((decide.power - 300.0).abs() < f64::EPSILON);
            assert_eq!(decide.fan, 30);
        } else {
            panic!("Expected Decide command");
        }
    }

    #[test]
    fn test_cli_decide_fan_validation() {
        let result = Cli::try_parse_from([
            "gpufan", "decide", "--temp", "40", "--power", "300", "--fan", "150",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_global_dry_run() {
        let args = Cli::try_parse_from(["gpufan", "restore", "--dry-run"]).unwrap();
        assert!(args.dry_run);
    }

    #[test]
    fn test_policy_arg_conversion() {
        assert_eq!(PolicyKind::from(PolicyArg::Power), PolicyKind::Power);
        assert_eq!(
            PolicyKind::from(PolicyArg::Temperature),
            PolicyKind::Temperature
        );
    }
}
