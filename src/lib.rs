//! # launchpad
//!
//! Bootstrap command line applications from a few declarative calls.
//!
//! ## Usage
//!
//! ```no_run
//! use launchpad::command::{Arguments, Command, Options};
//! use launchpad::env::Environment;
//!
//! struct Greet;
//!
//! impl Command for Greet {
//!     fn invoke(&self, env: &dyn Environment, arguments: &Arguments, _: &Options) -> anyhow::Result<()> {
//!         let name = arguments.get("name").unwrap_or("world");
//!         env.output().write(&format!("Hello {name}\n"))?;
//!         Ok(())
//!     }
//!
//!     fn identifier(&self) -> String {
//!         "greet [name]".to_string()
//!     }
//! }
//!
//! fn main() {
//!     launchpad::main(|app| {
//!         app.with_config_at(".")
//!             .with_commands(|_, _, _| Ok(vec![Box::new(Greet) as Box<dyn Command>]))
//!     })
//! }
//! ```
//!
//! ## Modules
//!
//! - `app` - The immutable [`Application`] builder, its execution pipeline and runtime setup
//! - `command` - Commands, usage patterns and the engine running them
//! - `container` - Lazily built named services
//! - `env` - Environment abstraction with dotenv loading and memoization decorators
//! - `error` - Coded errors aborting a run
//! - `middleware` - Transformations of the resolved command list
//! - `os` - Filesystem and process abstraction with tracing and retry decorators
//! - `profiler` - Opt-in per-command profiles, enabled by the `PROFILER` variable
pub mod app;
pub mod command;
pub mod container;
pub mod env;
pub mod error;
pub mod middleware;
pub mod os;
pub mod profiler;

pub use app::{main, AppConfig, Application, Resolved};
pub use error::LaunchpadError;
