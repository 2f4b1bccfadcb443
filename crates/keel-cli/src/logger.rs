//! Logging setup for the `keel` binary
//!
//! Library crates emit `tracing` events; this installs the subscriber that
//! prints them.
//!
//! The filter is chosen in this order:
//! 1. `--verbose`: debug for the keel crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. info for the keel crates

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "keel=debug,keel_build=debug,keel_config=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "keel=info,keel_build=info,keel_config=info";

/// Install the global subscriber; call once before any logging
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Whether colored output should be used
///
/// Honours `--no-color`, `NO_COLOR` and `KEEL_NO_COLOR`.
pub fn should_use_color(no_color: bool) -> bool {
    !no_color && std::env::var_os("NO_COLOR").is_none() && std::env::var_os("KEEL_NO_COLOR").is_none()
}
