//! Environment decorator computing variables once

use super::traits::{Environment, EnvironmentHandle, Readable, Writable};
use super::{EnvironmentError, ExitCode, VariableStore};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;

/// Environment caching the first variables computed by the inner environment
///
/// Every later call to [`Environment::variables`] returns the very same store, even
/// if whatever the inner environment reads from changed in the meantime. Failures are
/// not cached: the next call asks the inner environment again.
pub struct KeepVariablesInMemory {
    inner: EnvironmentHandle,
    variables: OnceCell<VariableStore>,
}

impl KeepVariablesInMemory {
    pub fn new(inner: EnvironmentHandle) -> Self {
        Self {
            inner,
            variables: OnceCell::new(),
        }
    }
}

impl std::fmt::Debug for KeepVariablesInMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeepVariablesInMemory")
            .field("inner", &"dyn Environment")
            .field("variables", &self.variables.get())
            .finish()
    }
}

impl Environment for KeepVariablesInMemory {
    fn interactive(&self) -> bool {
        self.inner.interactive()
    }

    fn input(&self) -> Arc<dyn Readable> {
        self.inner.input()
    }

    fn output(&self) -> Arc<dyn Writable> {
        self.inner.output()
    }

    fn error(&self) -> Arc<dyn Writable> {
        self.inner.error()
    }

    fn arguments(&self) -> Vec<String> {
        self.inner.arguments()
    }

    fn variables(&self) -> Result<VariableStore, EnvironmentError> {
        self.variables
            .get_or_try_init(|| self.inner.variables())
            .cloned()
    }

    fn exit(&self, code: i32) {
        self.inner.exit(code);
    }

    fn exit_code(&self) -> ExitCode {
        self.inner.exit_code()
    }

    fn working_directory(&self) -> PathBuf {
        self.inner.working_directory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{DotEnvAware, MockEnvironment};
    use crate::os::MockFilesystem;

    #[test]
    fn test_inner_variables_are_read_once() {
        let inner = Arc::new(MockEnvironment::new().with_variable("A", "1"));
        let env = KeepVariablesInMemory::new(inner.clone());

        let first = env.variables().unwrap();
        let second = env.variables().unwrap();

        assert!(VariableStore::ptr_eq(&first, &second));
        assert_eq!(inner.variable_reads(), 1);
    }

    #[test]
    fn test_file_changes_are_not_observed() {
        let fs = MockFilesystem::new();
        fs.add_file("/app", ".env", "FOO=first");
        let env = KeepVariablesInMemory::new(Arc::new(DotEnvAware::new(
            Arc::new(MockEnvironment::new()),
            Arc::new(fs.clone()),
            "/app",
        )));

        let first = env.variables().unwrap();
        fs.add_file("/app", ".env", "FOO=second");
        let second = env.variables().unwrap();

        assert_eq!(second.get("FOO"), Some("first"));
        assert!(VariableStore::ptr_eq(&first, &second));
        assert_eq!(fs.reads(), 1);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let fs = MockFilesystem::new();
        fs.add_file("/app", ".env", "FOO=bar");
        fs.fail_read("/app", ".env", std::io::ErrorKind::PermissionDenied, 1);
        let env = KeepVariablesInMemory::new(Arc::new(DotEnvAware::new(
            Arc::new(MockEnvironment::new()),
            Arc::new(fs.clone()),
            "/app",
        )));

        assert!(env.variables().is_err());
        assert_eq!(env.variables().unwrap().get("FOO"), Some("bar"));
    }
}
