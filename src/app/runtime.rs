//! Process entry point

use crate::app::{config::AppConfig, error_handling::handle_fatal_error, logging::init_logging};
use crate::app::Application;
use crate::env::{EnvironmentHandle, ProcessEnvironment};
use crate::os::{LocalOperatingSystem, OperatingSystemHandle};
use tracing::debug;

/// Run an application against the real process and exit
///
/// `configure` receives an application bound to the process environment and the
/// local operating system. The process exits with the code recorded by the command,
/// or with the error's exit code when no command could run.
///
/// ```no_run
/// fn main() {
///     launchpad::main(|app| app.with_config_at("."))
/// }
/// ```
pub fn main<F>(configure: F) -> !
where
    F: FnOnce(Application) -> Application,
{
    let config = AppConfig::from_process().unwrap_or_default();
    init_logging(&config);

    let environment: EnvironmentHandle = match ProcessEnvironment::new() {
        Ok(environment) => std::sync::Arc::new(environment),
        Err(e) => handle_fatal_error(e.into(), config.verbose),
    };
    let operating_system: OperatingSystemHandle = std::sync::Arc::new(LocalOperatingSystem::new());

    let application = configure(Application::new(environment.clone(), operating_system));
    if let Err(e) = application.run() {
        handle_fatal_error(e, config.verbose);
    }

    let code = environment.exit_code();
    debug!("Exiting with code {code}");
    std::process::exit(code.to_int())
}
