//! Environment abstraction layer
//!
//! Everything a command knows about the process it runs in goes through the
//! [`Environment`] trait: streams, arguments, variables, exit code and working
//! directory.
//!
//! # Architecture
//!
//! - **Traits**: [`Environment`], [`Readable`], [`Writable`]
//! - **Real implementation**: [`ProcessEnvironment`]
//! - **Mock implementation**: [`MockEnvironment`] for tests
//! - **Decorators**: [`DotEnvAware`] and [`KeepVariablesInMemory`], overriding
//!   `variables()` and delegating everything else
//!
//! # Usage
//!
//! ```
//! use launchpad::env::{DotEnvAware, Environment, KeepVariablesInMemory, MockEnvironment};
//! use launchpad::os::MockFilesystem;
//! use std::sync::Arc;
//!
//! let fs = MockFilesystem::new();
//! fs.add_file("/app", ".env", "FOO=baz\nBAR=foo");
//!
//! let env = KeepVariablesInMemory::new(Arc::new(DotEnvAware::new(
//!     Arc::new(MockEnvironment::new().with_variable("FOO", "bar")),
//!     Arc::new(fs),
//!     "/app",
//! )));
//!
//! let variables = env.variables().unwrap();
//! assert_eq!(variables.get("FOO"), Some("bar"));
//! assert_eq!(variables.get("BAR"), Some("foo"));
//! ```

mod dotenv;
mod error;
mod exit;
mod memory;
mod mock;
mod real;
mod traits;
mod variables;

pub use dotenv::{DotEnvAware, DOTENV_FILE};
pub use error::EnvironmentError;
pub use exit::ExitCode;
pub use memory::KeepVariablesInMemory;
pub use mock::{BufferedInput, BufferedOutput, MockEnvironment};
pub use real::{ProcessEnvironment, StandardError, StandardInput, StandardOutput};
pub use traits::{Environment, EnvironmentHandle, Readable, Writable};
pub use variables::VariableStore;
