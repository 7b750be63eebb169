//! Application module
//!
//! This module contains application-level functionality including:
//! - The immutable [`Application`] builder and its execution pipeline
//! - Configuration handling
//! - Logging setup
//! - The process entry point

mod builder;
pub mod config;
pub mod error_handling;
pub mod logging;
mod pipeline;
pub mod runtime;

pub use builder::{
    Application, CommandFactory, ContainerFactory, EnvironmentLoader, OperatingSystemWrapper,
};
pub use config::AppConfig;
pub use error_handling::handle_fatal_error;
pub use logging::init_logging;
pub use pipeline::Resolved;
pub use runtime::main;
