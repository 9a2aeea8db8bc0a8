//! Console logging for runs

use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

/// Timestamp prefix of every console line
pub const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Install the global subscriber. `RUST_LOG` wins over `verbose`.
///
/// A second call is ignored, so tests and embedding callers may both call it.
pub fn init(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_target(verbose)
        .try_init();
}
