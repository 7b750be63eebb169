//! Environment trait definitions
//!
//! A command never reaches for `std::env` or the standard streams directly: it is
//! handed an [`Environment`] that exposes those capabilities, which lets the
//! application swap in decorators (dotenv loading, memoization) or mocks for testing.

use super::{EnvironmentError, ExitCode, VariableStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Shared handle to an environment, as threaded through the pipeline
pub type EnvironmentHandle = Arc<dyn Environment>;

/// A stream the program can read text from
pub trait Readable: Send + Sync {
    /// Read the next line, without its trailing newline
    ///
    /// Returns `Ok(None)` once the stream is exhausted.
    fn read_line(&self) -> std::io::Result<Option<String>>;
}

/// A stream the program can write text to
pub trait Writable: Send + Sync {
    /// Write the given text as is
    fn write(&self, data: &str) -> std::io::Result<()>;
}

/// Execution environment of a command line program
///
/// # Examples
///
/// ```
/// use launchpad::env::{Environment, MockEnvironment};
///
/// let env = MockEnvironment::new().with_variable("HOME", "/home/user");
/// let variables = env.variables().unwrap();
/// assert_eq!(variables.get("HOME"), Some("/home/user"));
/// ```
pub trait Environment: Send + Sync {
    /// Whether the program is attached to an interactive terminal
    fn interactive(&self) -> bool;

    /// Standard input
    fn input(&self) -> Arc<dyn Readable>;

    /// Standard output
    fn output(&self) -> Arc<dyn Writable>;

    /// Standard error
    fn error(&self) -> Arc<dyn Writable>;

    /// Arguments the program was started with, program name first
    fn arguments(&self) -> Vec<String>;

    /// Variables visible to the program
    fn variables(&self) -> Result<VariableStore, EnvironmentError>;

    /// Record the code the program must exit with
    fn exit(&self, code: i32);

    /// Code recorded by the last call to [`Environment::exit`], success otherwise
    fn exit_code(&self) -> ExitCode;

    /// Directory the program was started from
    fn working_directory(&self) -> PathBuf;
}
