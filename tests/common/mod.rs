//! Common test utilities and helpers
#![allow(dead_code)]

use launchpad::command::{Arguments, Command, Options};
use launchpad::env::{Environment, MockEnvironment};
use launchpad::os::MockOperatingSystem;
use launchpad::Application;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Command writing its own name on the output stream
pub struct Named {
    name: String,
    invocations: Arc<AtomicUsize>,
}

impl Named {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter shared with the command, incremented on every invocation
    pub fn invocations(&self) -> Arc<AtomicUsize> {
        self.invocations.clone()
    }
}

impl Command for Named {
    fn invoke(&self, env: &dyn Environment, _: &Arguments, _: &Options) -> anyhow::Result<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        env.output().write(&format!("{}\n", self.name))?;
        Ok(())
    }

    fn identifier(&self) -> String {
        self.name.clone()
    }
}

/// Command always failing with the given message
pub struct Failing(pub &'static str);

impl Command for Failing {
    fn invoke(&self, _: &dyn Environment, _: &Arguments, _: &Options) -> anyhow::Result<()> {
        anyhow::bail!(self.0)
    }

    fn identifier(&self) -> String {
        "failing".to_string()
    }
}

/// Boxed [`Named`] commands, in order
pub fn named(names: &[&str]) -> Vec<Box<dyn Command>> {
    names
        .iter()
        .map(|name| Box::new(Named::new(name)) as Box<dyn Command>)
        .collect()
}

/// Identifiers of the given commands, in order
pub fn identifiers(commands: &[Box<dyn Command>]) -> Vec<String> {
    commands.iter().map(|command| command.identifier()).collect()
}

/// Mock environment and operating system shared with the application under test
pub struct TestContext {
    pub env: Arc<MockEnvironment>,
    pub os: MockOperatingSystem,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_environment(MockEnvironment::new())
    }

    pub fn with_environment(env: MockEnvironment) -> Self {
        Self {
            env: Arc::new(env),
            os: MockOperatingSystem::new(),
        }
    }

    /// Add a file to the in-memory filesystem
    pub fn with_file(self, directory: &str, name: &str, content: &str) -> Self {
        self.os.mock_filesystem().add_file(directory, name, content);
        self
    }

    /// Application bound to this context
    pub fn application(&self) -> Application {
        Application::new(self.env.clone(), Arc::new(self.os.clone()))
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
