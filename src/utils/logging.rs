//! Logging setup.
//!
//! Status lines go through the `log` facade; this installs `env_logger`
//! behind it. `RUST_LOG` wins over the levels picked here.

use env_logger::{Builder, Env};
use log::LevelFilter;

pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .filter_level(level)
        // reqwest and hyper are noisy at debug
        .filter_module("hyper_util", LevelFilter::Warn)
        .filter_module("reqwest", LevelFilter::Warn)
        .parse_env(Env::default())
        .format_target(false)
        .format_timestamp(None)
        .init();
}
