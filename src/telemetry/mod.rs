//! Logging setup
//!
//! Nothing is installed at load time; the embedding process calls [`init`]
//! once during startup. `RUST_LOG` takes precedence over the configured
//! level.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber writing to stderr
///
/// Returns `false` if a global subscriber was already installed, in which
/// case the existing one is left in place.
pub fn init(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
