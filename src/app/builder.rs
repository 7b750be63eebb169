//! Immutable application builder
//!
//! Every configuration method borrows the current [`Application`] and returns a new
//! one: nothing happens until [`Application::run`] is called. Applications derived
//! from the same predecessor only share immutable closures, so they never observe
//! each other's configuration.

use crate::command::{Command, DeferredCommand};
use crate::container::{Container, Service, ServiceLocator};
use crate::env::{DotEnvAware, EnvironmentHandle, KeepVariablesInMemory};
use crate::os::{OperatingSystemHandle, ResilientOperatingSystem, RetryPolicy, TracedOperatingSystem};
use crate::profiler::Section;
use std::any::Any;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Builds the commands of the application
pub type CommandFactory = Arc<
    dyn Fn(
            &EnvironmentHandle,
            &OperatingSystemHandle,
            &ServiceLocator,
        ) -> anyhow::Result<Vec<Box<dyn Command>>>
        + Send
        + Sync,
>;

/// Builds the service container of the application
pub type ContainerFactory =
    Arc<dyn Fn(&EnvironmentHandle, &OperatingSystemHandle) -> Container + Send + Sync>;

/// Decorates the environment of the application
pub type EnvironmentLoader =
    Arc<dyn Fn(EnvironmentHandle, &OperatingSystemHandle) -> EnvironmentHandle + Send + Sync>;

/// Decorates the operating system of the application
pub type OperatingSystemWrapper =
    Arc<dyn Fn(&EnvironmentHandle, OperatingSystemHandle) -> OperatingSystemHandle + Send + Sync>;

/// A command line application, not run yet
///
/// # Examples
///
/// ```
/// use launchpad::env::MockEnvironment;
/// use launchpad::os::MockOperatingSystem;
/// use launchpad::Application;
/// use std::sync::Arc;
///
/// let env = Arc::new(MockEnvironment::new());
/// Application::new(env.clone(), Arc::new(MockOperatingSystem::new()))
///     .disable_instrumentation()
///     .run()
///     .unwrap();
///
/// assert_eq!(env.output_contents(), "Hello world\n");
/// ```
#[derive(Clone)]
pub struct Application {
    pub(super) environment: EnvironmentHandle,
    pub(super) operating_system: OperatingSystemHandle,
    pub(super) commands: CommandFactory,
    pub(super) services: ContainerFactory,
    pub(super) dotenv: EnvironmentLoader,
    pub(super) tracer: OperatingSystemWrapper,
    pub(super) resilience: OperatingSystemWrapper,
    pub(super) disabled_sections: BTreeSet<Section>,
}

impl Application {
    /// Application without commands, tracing operating system calls
    pub fn new(environment: EnvironmentHandle, operating_system: OperatingSystemHandle) -> Self {
        Self {
            environment,
            operating_system,
            commands: Arc::new(
                |_: &EnvironmentHandle,
                 _: &OperatingSystemHandle,
                 _: &ServiceLocator|
                 -> anyhow::Result<Vec<Box<dyn Command>>> { Ok(Vec::new()) },
            ),
            services: Arc::new(|_: &EnvironmentHandle, _: &OperatingSystemHandle| Container::new()),
            dotenv: Arc::new(|env: EnvironmentHandle, _: &OperatingSystemHandle| env),
            tracer: Arc::new(|env: &EnvironmentHandle, os: OperatingSystemHandle| {
                Arc::new(TracedOperatingSystem::new(os, &env.working_directory()))
                    as OperatingSystemHandle
            }),
            resilience: identity(),
            disabled_sections: BTreeSet::new(),
        }
    }

    pub fn environment(&self) -> &EnvironmentHandle {
        &self.environment
    }

    pub fn operating_system(&self) -> &OperatingSystemHandle {
        &self.operating_system
    }

    pub fn disabled_sections(&self) -> &BTreeSet<Section> {
        &self.disabled_sections
    }

    /// Append the commands built by `factory` after the ones registered so far
    pub fn with_commands<F>(&self, factory: F) -> Self
    where
        F: Fn(
                &EnvironmentHandle,
                &OperatingSystemHandle,
                &ServiceLocator,
            ) -> anyhow::Result<Vec<Box<dyn Command>>>
            + Send
            + Sync
            + 'static,
    {
        let previous = self.commands.clone();
        let mut next = self.clone();
        next.commands = Arc::new(
            move |env: &EnvironmentHandle,
                  os: &OperatingSystemHandle,
                  locator: &ServiceLocator|
                  -> anyhow::Result<Vec<Box<dyn Command>>> {
                let mut commands = previous(env, os, locator)?;
                commands.extend(factory(env, os, locator)?);
                Ok(commands)
            },
        );
        next
    }

    /// Append a command backed by the `Arc<dyn Command>` service `service`
    ///
    /// The service is only resolved when the command is identified or invoked.
    pub fn with_deferred_command(&self, service: impl Into<String>) -> Self {
        let service = service.into();
        self.with_commands(move |_, _, locator| {
            Ok(vec![
                Box::new(DeferredCommand::new(locator.clone(), service.clone())) as Box<dyn Command>
            ])
        })
    }

    /// Register a service built on first use
    ///
    /// Registering the same name again replaces the previous factory.
    pub fn with_service<T, F>(&self, name: impl Into<String>, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&EnvironmentHandle, &OperatingSystemHandle, &ServiceLocator) -> anyhow::Result<T>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        let factory = Arc::new(factory);
        let previous = self.services.clone();
        let mut next = self.clone();
        next.services = Arc::new(move |env: &EnvironmentHandle, os: &OperatingSystemHandle| {
            let factory = factory.clone();
            let (env, os) = (env.clone(), os.clone());
            previous(&env, &os).add(
                name.clone(),
                Arc::new(move |locator: &ServiceLocator| -> anyhow::Result<Service> {
                    Ok(Arc::new(factory(&env, &os, locator)?))
                }),
            )
        });
        next
    }

    /// Load a `.env` file from `path`, once per run
    ///
    /// Process variables take precedence over the file.
    pub fn with_config_at(&self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut next = self.clone();
        next.dotenv = Arc::new(move |env: EnvironmentHandle, os: &OperatingSystemHandle| {
            Arc::new(KeepVariablesInMemory::new(Arc::new(DotEnvAware::new(
                env,
                os.filesystem(),
                path.clone(),
            )))) as EnvironmentHandle
        });
        next
    }

    /// Stop tracing operating system calls
    pub fn disable_instrumentation(&self) -> Self {
        let mut next = self.clone();
        next.tracer = identity();
        next
    }

    /// Leave sections out of the profiles recorded when profiling is enabled
    pub fn disable_instrumentation_section(
        &self,
        sections: impl IntoIterator<Item = Section>,
    ) -> Self {
        let mut next = self.clone();
        next.disabled_sections.extend(sections);
        next
    }

    /// Retry transient filesystem failures with the default policy
    pub fn use_resilient_operating_system(&self) -> Self {
        self.use_resilient_operating_system_with(RetryPolicy::default())
    }

    /// Retry transient filesystem failures with `policy`
    pub fn use_resilient_operating_system_with(&self, policy: RetryPolicy) -> Self {
        let mut next = self.clone();
        next.resilience = Arc::new(move |_: &EnvironmentHandle, os: OperatingSystemHandle| {
            Arc::new(ResilientOperatingSystem::new(os, policy.clone())) as OperatingSystemHandle
        });
        next
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("disabled_sections", &self.disabled_sections)
            .finish_non_exhaustive()
    }
}

fn identity() -> OperatingSystemWrapper {
    Arc::new(|_: &EnvironmentHandle, os: OperatingSystemHandle| os)
}
