use super::{Arguments, Command, Options};
use crate::container::{ServiceError, ServiceLocator};
use crate::env::Environment;
use std::sync::Arc;
use tracing::warn;

/// Command standing for an `Arc<dyn Command>` service of the container
///
/// The service is only resolved when the command is identified or invoked, so
/// registering it costs nothing.
#[derive(Debug, Clone)]
pub struct DeferredCommand {
    locator: ServiceLocator,
    service: String,
}

impl DeferredCommand {
    pub fn new(locator: ServiceLocator, service: impl Into<String>) -> Self {
        Self {
            locator,
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn command(&self) -> Result<Arc<dyn Command>, ServiceError> {
        self.locator.get::<Arc<dyn Command>>(&self.service)
    }
}

impl Command for DeferredCommand {
    fn invoke(
        &self,
        env: &dyn Environment,
        arguments: &Arguments,
        options: &Options,
    ) -> anyhow::Result<()> {
        self.command()?.invoke(env, arguments, options)
    }

    fn identifier(&self) -> String {
        match self.command() {
            Ok(command) => command.identifier(),
            Err(e) => {
                warn!("Cannot identify deferred command '{}': {e}", self.service);
                self.service.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::HelloWorld;
    use crate::container::{Container, Service};
    use crate::env::MockEnvironment;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_service_is_resolved_on_use() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let locator = Container::new()
            .add(
                "hello",
                Arc::new(move |_: &ServiceLocator| -> anyhow::Result<Service> {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::new(Arc::new(HelloWorld) as Arc<dyn Command>) as Service)
                }),
            )
            .build();
        let command = DeferredCommand::new(locator, "hello");
        assert_eq!(builds.load(Ordering::SeqCst), 0);

        let env = MockEnvironment::new();
        command
            .invoke(&env, &Arguments::new(), &Options::new())
            .unwrap();

        assert_eq!(command.identifier(), "hello-world");
        assert_eq!(env.output_contents(), "Hello world\n");
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_service() {
        let command = DeferredCommand::new(ServiceLocator::empty(), "missing");

        assert_eq!(command.identifier(), "missing");
        assert!(command
            .invoke(&MockEnvironment::new(), &Arguments::new(), &Options::new())
            .is_err());
    }
}
