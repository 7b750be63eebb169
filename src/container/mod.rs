//! Service container resolving named services lazily
//!
//! A [`Container`] collects named factories; [`Container::build`] turns it into a
//! [`ServiceLocator`] that instantiates a service the first time it is requested and
//! hands out the same instance afterwards.

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

/// A service instance, downcast by [`ServiceLocator::get`]
pub type Service = Arc<dyn Any + Send + Sync>;

/// Factory building a service, possibly from other services
pub type ServiceFactory = Arc<dyn Fn(&ServiceLocator) -> anyhow::Result<Service> + Send + Sync>;

/// Service resolution failures
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("service not found: {0}")]
    NotFound(String),

    #[error("service '{name}' is not a {expected}")]
    TypeMismatch { name: String, expected: &'static str },

    #[error("circular dependency while resolving service '{0}'")]
    Circular(String),

    #[error("failed to build service '{name}': {source}")]
    Factory {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Named service factories, not instantiated yet
#[derive(Clone, Default)]
pub struct Container {
    factories: IndexMap<String, ServiceFactory>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`
    ///
    /// Registering the same name twice replaces the previous factory.
    pub fn add(mut self, name: impl Into<String>, factory: ServiceFactory) -> Self {
        let name = name.into();
        if self.factories.contains_key(&name) {
            warn!("Service '{name}' is registered more than once, the last registration wins");
        }

        self.factories.insert(name, factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Freeze the registrations into a locator
    pub fn build(self) -> ServiceLocator {
        ServiceLocator {
            inner: Arc::new(Inner {
                entries: self
                    .factories
                    .into_iter()
                    .map(|(name, factory)| {
                        (
                            name,
                            Entry {
                                factory,
                                instance: OnceCell::new(),
                            },
                        )
                    })
                    .collect(),
                resolving: Mutex::new(Vec::new()),
            }),
        }
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("services", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

struct Entry {
    factory: ServiceFactory,
    instance: OnceCell<Service>,
}

struct Inner {
    entries: IndexMap<String, Entry>,
    resolving: Mutex<Vec<String>>,
}

/// Resolves services by name, building each at most once
///
/// Clones share the same instances.
#[derive(Clone)]
pub struct ServiceLocator {
    inner: Arc<Inner>,
}

impl ServiceLocator {
    /// Locator without any service
    pub fn empty() -> Self {
        Container::new().build()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.entries.contains_key(name)
    }

    /// Names of the registered services, in registration order
    pub fn names(&self) -> Vec<String> {
        self.inner.entries.keys().cloned().collect()
    }

    /// Resolve the service `name` as a `T`
    pub fn get<T>(&self, name: &str) -> Result<T, ServiceError>
    where
        T: Any + Send + Sync + Clone,
    {
        let service = self.resolve(name)?;

        service
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| ServiceError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Resolve the service `name` without downcasting it
    pub fn resolve(&self, name: &str) -> Result<Service, ServiceError> {
        let entry = self
            .inner
            .entries
            .get(name)
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))?;

        if let Some(instance) = entry.instance.get() {
            return Ok(instance.clone());
        }

        self.enter(name)?;
        debug!("Building service '{name}'");
        let built = (entry.factory)(self);
        self.leave(name);

        let service = built.map_err(|source| ServiceError::Factory {
            name: name.to_string(),
            source: source.into(),
        })?;

        Ok(entry.instance.get_or_init(|| service).clone())
    }

    fn enter(&self, name: &str) -> Result<(), ServiceError> {
        let mut resolving = self
            .inner
            .resolving
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if resolving.iter().any(|pending| pending == name) {
            return Err(ServiceError::Circular(name.to_string()));
        }

        resolving.push(name.to_string());
        Ok(())
    }

    fn leave(&self, name: &str) {
        let mut resolving = self
            .inner
            .resolving
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        resolving.retain(|pending| pending != name);
    }
}

impl std::fmt::Debug for ServiceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceLocator")
            .field("services", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn factory<T, F>(build: F) -> ServiceFactory
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceLocator) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Arc::new(move |locator: &ServiceLocator| -> anyhow::Result<Service> {
            Ok(Arc::new(build(locator)?))
        })
    }

    #[test]
    fn test_services_are_built_lazily_and_once() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let locator = Container::new()
            .add(
                "answer",
                factory(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(42_u32)
                }),
            )
            .build();

        assert_eq!(builds.load(Ordering::SeqCst), 0);
        assert_eq!(locator.get::<u32>("answer").unwrap(), 42);
        assert_eq!(locator.clone().get::<u32>("answer").unwrap(), 42);
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_services_can_depend_on_each_other() {
        let locator = Container::new()
            .add(
                "greeting",
                factory(|locator| Ok(format!("Hello {}", locator.get::<String>("name")?))),
            )
            .add("name", factory(|_| Ok("world".to_string())))
            .build();

        assert_eq!(locator.get::<String>("greeting").unwrap(), "Hello world");
    }

    #[test]
    fn test_last_registration_wins() {
        let locator = Container::new()
            .add("value", factory(|_| Ok(1_u8)))
            .add("value", factory(|_| Ok(2_u8)))
            .build();

        assert_eq!(locator.get::<u8>("value").unwrap(), 2);
        assert_eq!(locator.names(), vec!["value".to_string()]);
    }

    #[test]
    fn test_unknown_service() {
        let error = ServiceLocator::empty().get::<u8>("missing").unwrap_err();

        assert!(matches!(error, ServiceError::NotFound(name) if name == "missing"));
    }

    #[test]
    fn test_type_mismatch() {
        let locator = Container::new()
            .add("value", factory(|_| Ok(1_u8)))
            .build();

        assert!(matches!(
            locator.get::<String>("value").unwrap_err(),
            ServiceError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_circular_dependencies_are_detected() {
        let locator = Container::new()
            .add("a", factory(|locator| Ok(locator.get::<u8>("b")?)))
            .add("b", factory(|locator| Ok(locator.get::<u8>("a")?)))
            .build();

        let error = locator.get::<u8>("a").unwrap_err();
        assert!(matches!(error, ServiceError::Factory { .. }));
        assert!(error.to_string().contains("'a'"));
    }

    #[test]
    fn test_failed_builds_are_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let locator = Container::new()
            .add(
                "flaky",
                factory(move |_| {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        anyhow::bail!("not yet");
                    }
                    Ok(true)
                }),
            )
            .build();

        assert!(locator.get::<bool>("flaky").is_err());
        assert!(locator.get::<bool>("flaky").unwrap());
    }
}
