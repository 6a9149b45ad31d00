/* src/cli/core/src/logging.rs */

// Diagnostics for the dev server and build invoker go through `tracing`;
// user-facing progress lines stay in `ui`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "AXHUB_LOG";

const DEFAULT_FILTER: &str = "axhub=info,tower_http=warn";

fn filter() -> EnvFilter {
  EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter())
    .with_writer(std::io::stderr)
    .with_target(false)
    .compact()
    .try_init();
}
