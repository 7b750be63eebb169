//! Application configuration
//!
//! Settings of the launchpad runtime itself, read from the process before any
//! command is resolved.

use crate::env::EnvironmentError;
use std::path::PathBuf;

/// Variable holding the verbosity level, from 0 to 3
pub const VERBOSITY_VARIABLE: &str = "LAUNCHPAD_VERBOSE";

/// Application configuration structure
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Working directory
    pub working_dir: PathBuf,
}

impl AppConfig {
    /// Create a new application configuration
    pub fn new(verbose: u8) -> Result<Self, EnvironmentError> {
        let working_dir = std::env::current_dir().map_err(EnvironmentError::WorkingDirectory)?;

        Ok(Self {
            verbose,
            working_dir,
        })
    }

    /// Configuration of the running process
    ///
    /// An unset or unparsable verbosity variable means verbosity 0.
    pub fn from_process() -> Result<Self, EnvironmentError> {
        let verbose = std::env::var(VERBOSITY_VARIABLE)
            .ok()
            .as_deref()
            .map(parse_verbosity)
            .unwrap_or_default();

        Self::new(verbose)
    }

    /// Set the working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the verbosity level
    pub fn with_verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    /// Get the log level string based on verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            2 => "trace",
            _ => "trace,launchpad::trace=trace",
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            verbose: 0,
            working_dir: PathBuf::from("."),
        }
    }
}

fn parse_verbosity(value: &str) -> u8 {
    value.trim().parse::<u8>().map(|level| level.min(3)).unwrap_or(0)
}
