//! Error handling utilities

use crate::error::LaunchpadError;
use tracing::error;

/// Report an error that prevented any command from running and exit
///
/// The user message is always shown; with `verbose >= 1` the full error chain is
/// printed as well.
pub fn handle_fatal_error(error: LaunchpadError, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    eprintln!("{}", error.user_message());
    if verbose >= 1 {
        eprintln!("\nContext Chain:\n{}", error.developer_message());
    }

    std::process::exit(error.exit_code())
}
