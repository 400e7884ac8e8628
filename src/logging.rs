//! Log output for the command-line programs.
//!
//! The library logs through the `log` facade. The subscriber installed here
//! bridges those records into `tracing-subscriber`'s formatter on stderr.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `NUMLAB_LOG=debug`.
pub const LOG_ENV: &str = "NUMLAB_LOG";

/// Installs the global subscriber. Defaults to `warn` when `NUMLAB_LOG` is
/// unset or unparsable. Calling it twice is a no-op.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
