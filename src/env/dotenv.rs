//! Environment decorator loading variables from a `.env` file

use super::traits::{Environment, EnvironmentHandle, Readable, Writable};
use super::{EnvironmentError, ExitCode, VariableStore};
use crate::os::Filesystem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Name of the file looked up in the configuration directory
pub const DOTENV_FILE: &str = ".env";

/// Environment exposing the variables of a `.env` file on top of the inner ones
///
/// Variables already defined by the inner environment always win over the file. The
/// file is read and parsed on every call to [`Environment::variables`]; wrap this
/// decorator in [`super::KeepVariablesInMemory`] to load it once.
pub struct DotEnvAware {
    inner: EnvironmentHandle,
    filesystem: Arc<dyn Filesystem>,
    config: PathBuf,
}

impl DotEnvAware {
    /// Look for a `.env` file in the `config` directory
    pub fn new(
        inner: EnvironmentHandle,
        filesystem: Arc<dyn Filesystem>,
        config: impl Into<PathBuf>,
    ) -> Self {
        Self {
            inner,
            filesystem,
            config: config.into(),
        }
    }

    pub fn config(&self) -> &Path {
        &self.config
    }
}

impl std::fmt::Debug for DotEnvAware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DotEnvAware")
            .field("inner", &"dyn Environment")
            .field("filesystem", &"dyn Filesystem")
            .field("config", &self.config)
            .finish()
    }
}

impl Environment for DotEnvAware {
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
        let variables = self.inner.variables()?;

        if !self.filesystem.contains(&self.config) {
            debug!("Configuration directory not found: {}", self.config.display());
            return Ok(variables);
        }

        let directory = self
            .filesystem
            .mount(&self.config)
            .map_err(|source| EnvironmentError::Mount {
                path: self.config.clone(),
                source,
            })?;

        if !directory.contains(DOTENV_FILE) {
            debug!("No {DOTENV_FILE} file in {}", self.config.display());
            return Ok(variables);
        }

        let path = self.config.join(DOTENV_FILE);
        let file = directory
            .get(DOTENV_FILE)
            .map_err(|source| EnvironmentError::Read {
                path: path.clone(),
                source,
            })?;
        let entries = parse(file.content(), &path)?;

        info!("Loaded {} variables from {}", entries.len(), path.display());
        Ok(variables.merge_absent(entries))
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

/// Entries of a dotenv file, in file order
fn parse(content: &str, path: &Path) -> Result<Vec<(String, String)>, EnvironmentError> {
    dotenvy::from_read_iter(content.as_bytes())
        .map(|entry| {
            entry.map_err(|source| EnvironmentError::Parse {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnvironment;
    use crate::os::{MockFilesystem, MockOperatingSystem, OperatingSystem};

    fn decorate(inner: MockEnvironment, fs: &MockFilesystem, config: &str) -> DotEnvAware {
        DotEnvAware::new(Arc::new(inner), Arc::new(fs.clone()), config)
    }

    #[test]
    fn test_file_variables_are_merged() {
        let fs = MockFilesystem::new();
        fs.add_file("/app/config", ".env", "FOO=baz\nBAR=foo");
        let env = decorate(
            MockEnvironment::new().with_variable("BAZ", "bar"),
            &fs,
            "/app/config",
        );

        let variables = env.variables().unwrap();

        assert_eq!(
            variables,
            VariableStore::from_iter([("BAZ", "bar"), ("FOO", "baz"), ("BAR", "foo")])
        );
    }

    #[test]
    fn test_inner_variables_win() {
        let fs = MockFilesystem::new();
        fs.add_file("/app", ".env", "FOO=file\nBAR=foo");
        let env = decorate(MockEnvironment::new().with_variable("FOO", "real"), &fs, "/app");

        let variables = env.variables().unwrap();

        assert_eq!(variables.get("FOO"), Some("real"));
        assert_eq!(variables.get("BAR"), Some("foo"));
    }

    #[test]
    fn test_missing_directory_leaves_variables_unchanged() {
        let fs = MockFilesystem::new();
        let env = decorate(MockEnvironment::new().with_variable("A", "1"), &fs, "/nowhere");

        assert_eq!(env.variables().unwrap(), VariableStore::from_iter([("A", "1")]));
        assert_eq!(fs.mounts(), 0);
    }

    #[test]
    fn test_directory_without_dotenv_leaves_variables_unchanged() {
        let fs = MockFilesystem::new();
        fs.add_file("/app", "config.yml", "FOO: bar");
        let env = decorate(MockEnvironment::new().with_variable("A", "1"), &fs, "/app");

        assert_eq!(env.variables().unwrap(), VariableStore::from_iter([("A", "1")]));
        assert_eq!(fs.reads(), 0);
    }

    #[test]
    fn test_file_is_read_on_every_call() {
        let fs = MockFilesystem::new();
        fs.add_file("/app", ".env", "FOO=first");
        let env = decorate(MockEnvironment::new(), &fs, "/app");

        assert_eq!(env.variables().unwrap().get("FOO"), Some("first"));
        fs.add_file("/app", ".env", "FOO=second");
        assert_eq!(env.variables().unwrap().get("FOO"), Some("second"));
        assert_eq!(fs.reads(), 2);
    }

    #[test]
    fn test_comments_and_quotes_follow_dotenv_grammar() {
        let fs = MockFilesystem::new();
        fs.add_file("/app", ".env", "# comment\nQUOTED=\"hello world\"\n\nPLAIN=value");
        let env = decorate(MockEnvironment::new(), &fs, "/app");

        let variables = env.variables().unwrap();

        assert_eq!(variables.get("QUOTED"), Some("hello world"));
        assert_eq!(variables.get("PLAIN"), Some("value"));
        assert_eq!(variables.len(), 2);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let fs = MockFilesystem::new();
        fs.add_file("/app", ".env", "NOT A VALID LINE");
        let env = decorate(MockEnvironment::new(), &fs, "/app");

        let error = env.variables().unwrap_err();
        assert!(matches!(error, EnvironmentError::Parse { .. }));
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let fs = MockFilesystem::new();
        fs.add_file("/app", ".env", "A=1");
        fs.fail_read("/app", ".env", std::io::ErrorKind::PermissionDenied, 1);
        let env = decorate(MockEnvironment::new(), &fs, "/app");

        let error = env.variables().unwrap_err();
        assert!(matches!(error, EnvironmentError::Read { .. }));
    }

    #[test]
    fn test_reads_through_the_given_operating_system() {
        let os = MockOperatingSystem::new();
        os.mock_filesystem().add_file("/app", ".env", "A=1");
        let env = DotEnvAware::new(Arc::new(MockEnvironment::new()), os.filesystem(), "/app");

        assert_eq!(env.variables().unwrap().get("A"), Some("1"));
        assert_eq!(os.mock_filesystem().reads(), 1);
    }
}
