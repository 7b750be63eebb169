//! Turning a configured application into one program execution

use super::builder::Application;
use crate::command::{Command, Commands, HelloWorld};
use crate::env::EnvironmentHandle;
use crate::error::LaunchpadError;
use crate::middleware;
use crate::os::OperatingSystemHandle;
use crate::profiler::{Profiler, ACTIVATION_VARIABLE};
use tracing::debug;

/// Everything an application runs with, once its configuration is realized
pub struct Resolved {
    pub environment: EnvironmentHandle,
    pub operating_system: OperatingSystemHandle,
    pub commands: Vec<Box<dyn Command>>,
}

impl Resolved {
    /// Hand the commands to the execution engine
    pub fn run(self) {
        Commands::new(self.commands).run(self.environment.as_ref());
    }
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field(
                "commands",
                &self
                    .commands
                    .iter()
                    .map(|command| command.identifier())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl Application {
    /// Realize the configuration without running any command
    ///
    /// Operating system wrappers are applied first (tracer, then resilience), then
    /// the environment is decorated, the profiler is enabled when its activation
    /// variable is set, and finally the commands are built and wrapped.
    pub fn resolve(self) -> Result<Resolved, LaunchpadError> {
        let os = (self.tracer)(&self.environment, self.operating_system.clone());
        let os = (self.resilience)(&self.environment, os);
        let environment = (self.dotenv)(self.environment.clone(), &os);

        let variables = environment.variables()?;
        let mut middlewares = vec![middleware::identity()];
        let os = match variables.get(ACTIVATION_VARIABLE) {
            Some(sink) => {
                debug!("{ACTIVATION_VARIABLE} is set, profiling commands");
                let profiler = Profiler::new(
                    os,
                    Profiler::parse_sink(sink)?,
                    variables.to_scalars(),
                    None,
                    self.disabled_sections.clone(),
                )?;
                middlewares.push(profiler.middleware());
                profiler.operating_system()
            }
            None => os,
        };

        let locator = (self.services)(&environment, &os).build();
        debug!(services = ?locator.names(), "Service container ready");

        let mut commands =
            (self.commands)(&environment, &os, &locator).map_err(LaunchpadError::factory)?;
        if commands.is_empty() {
            debug!("No command registered, falling back to hello world");
            commands.push(Box::new(HelloWorld));
        }
        let commands = middleware::apply(&middlewares, commands);
        debug!(count = commands.len(), "Commands resolved");

        Ok(Resolved {
            environment,
            operating_system: os,
            commands,
        })
    }

    /// Run the application
    ///
    /// The outcome of the command is recorded as the environment's exit code; only
    /// failures preventing any command from running are returned.
    pub fn run(self) -> Result<(), LaunchpadError> {
        self.resolve()?.run();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnvironment;
    use crate::os::MockOperatingSystem;
    use std::sync::Arc;

    #[test]
    fn test_empty_application_falls_back_to_hello_world() {
        let resolved = Application::new(
            Arc::new(MockEnvironment::new()),
            Arc::new(MockOperatingSystem::new()),
        )
        .resolve()
        .unwrap();

        assert_eq!(resolved.commands.len(), 1);
        assert_eq!(resolved.commands[0].identifier(), "hello-world");
    }

    #[test]
    fn test_malformed_profiler_url_aborts_resolution() {
        let result = Application::new(
            Arc::new(MockEnvironment::new().with_variable(ACTIVATION_VARIABLE, "::not a url")),
            Arc::new(MockOperatingSystem::new()),
        )
        .resolve();

        assert!(matches!(result, Err(LaunchpadError::Profiler(_))));
    }
}
