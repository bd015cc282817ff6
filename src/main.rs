//! gpufan - GPU-telemetry driven chassis fan controller
//!
//! Scales motherboard fan speed with GPU power draw or temperature and
//! returns the fans to automatic control on exit.

use clap::Parser;
use gpufan::cli::args::{generate_completions, Cli, Commands};
use gpufan::cli::logging;
use gpufan::commands::{run_control, run_decide, run_restore, run_status};
use gpufan::error::AppError;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging; -v raises it to debug
    logging::init(cli.verbose);

    // Run the appropriate command
    let result = run(&cli);

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    match &cli.command {
        Commands::Run(args) => run_control(cli, args),

        Commands::Status(args) => run_status(cli, args),

        Commands::Decide(args) => run_decide(cli, args),

        Commands::Restore(args) => run_restore(cli, args),

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::PermissionDenied(_) => {
            eprintln!();
            eprintln!("Hint: Try running with sudo or as root.");
            eprintln!("      Or grant write access to the pwm files with a udev rule");
            eprintln!("      and set require_root = false under [actuator].");
        }
        AppError::BoundaryUnavailable { .. } => {
            eprintln!();
            eprintln!("Hint: Make sure the hwmon driver for your board is loaded");
            eprintln!("      (e.g. 'modprobe nct6775') and check /sys/class/hwmon/*/name");
            eprintln!("      for the right hwmon_path.");
        }
        AppError::SensorUnavailable(_) => {
            eprintln!();
            eprintln!("Hint: Check that 'nvidia-smi' works and the NVIDIA driver is loaded.");
        }
        _ => {}
    }
}
