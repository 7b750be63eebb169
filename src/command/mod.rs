//! Commands and the engine running them
//!
//! A [`Command`] is identified by a usage pattern (see [`usage`]) and invoked with the
//! arguments and options parsed from the command line. [`Commands`] picks the command
//! to run among a list and records its outcome as the environment's exit code.

mod deferred;
mod engine;
mod hello_world;
mod input;
pub mod usage;

pub use deferred::DeferredCommand;
pub use engine::Commands;
pub use hello_world::HelloWorld;
pub use input::{Arguments, Options};
pub use usage::{Usage, UsageError};

use crate::env::Environment;
use std::sync::Arc;

/// A unit of work runnable from the command line
pub trait Command: Send + Sync {
    /// Run the command
    ///
    /// Returning an error makes the program exit with a failure code, the error being
    /// reported on the error stream.
    fn invoke(
        &self,
        env: &dyn Environment,
        arguments: &Arguments,
        options: &Options,
    ) -> anyhow::Result<()>;

    /// Usage pattern of the command, optionally followed by lines describing it
    fn identifier(&self) -> String;
}

impl<C: Command + ?Sized> Command for Arc<C> {
    fn invoke(
        &self,
        env: &dyn Environment,
        arguments: &Arguments,
        options: &Options,
    ) -> anyhow::Result<()> {
        (**self).invoke(env, arguments, options)
    }

    fn identifier(&self) -> String {
        (**self).identifier()
    }
}

impl<C: Command + ?Sized> Command for Box<C> {
    fn invoke(
        &self,
        env: &dyn Environment,
        arguments: &Arguments,
        options: &Options,
    ) -> anyhow::Result<()> {
        (**self).invoke(env, arguments, options)
    }

    fn identifier(&self) -> String {
        (**self).identifier()
    }
}
