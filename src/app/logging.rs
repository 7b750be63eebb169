//! Logging configuration and initialization

use crate::app::config::AppConfig;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the application
///
/// `RUST_LOG` overrides the level derived from the verbosity. Logs go to standard
/// error so they never mix with command output.
pub fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    let initialized = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.verbose >= 2)
        .with_thread_ids(config.verbose >= 3)
        .with_line_number(config.verbose >= 3)
        .try_init();

    if initialized.is_ok() {
        debug!("launchpad started with verbosity level: {}", config.verbose);
        trace!("Working directory: {}", config.working_dir.display());
    }
}
