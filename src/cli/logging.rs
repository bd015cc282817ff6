//! Logger setup
//!
//! env_logger always admits debug records and the global max level decides
//! what is emitted, so `-v` and `general.verbose` can raise it after init.
//! An explicit `RUST_LOG` takes over completely.

use env_logger::{Builder, DEFAULT_FILTER_ENV};
use log::LevelFilter;

/// Build the logger for an optional `RUST_LOG` filter spec
pub fn builder(rust_log: Option<&str>) -> Builder {
    let mut builder = Builder::new();
    match rust_log {
        Some(spec) => {
            builder.parse_filters(spec);
        }
        None => {
            builder.filter_level(LevelFilter::Debug);
        }
    }
    builder.format_timestamp_secs();
    builder
}

/// Install the global logger; `verbose` enables debug output
pub fn init(verbose: bool) {
    let rust_log = std::env::var(DEFAULT_FILTER_ENV).ok();
    builder(rust_log.as_deref()).init();

    if rust_log.is_none() {
        log::set_max_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        });
    }
}

/// Raise output to debug unless it is already at least that verbose
pub fn raise_to_debug() {
    if log::max_level() < LevelFilter::Debug {
        log::set_max_level(LevelFilter::Debug);
    }
}
