//! Environment backed by the current process
//!
//! Used in production: variables, arguments and streams come straight from the
//! standard library.

use super::traits::{Environment, Readable, Writable};
use super::{EnvironmentError, ExitCode, VariableStore};
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// Standard input of the process
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardInput;

impl Readable for StandardInput {
    fn read_line(&self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

/// Standard output of the process
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardOutput;

impl Writable for StandardOutput {
    fn write(&self, data: &str) -> std::io::Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(data.as_bytes())?;
        stdout.flush()
    }
}

/// Standard error of the process
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardError;

impl Writable for StandardError {
    fn write(&self, data: &str) -> std::io::Result<()> {
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(data.as_bytes())?;
        stderr.flush()
    }
}

/// Environment of the running process
///
/// Arguments, variables and working directory are captured once at construction.
/// Variables that are not valid unicode are skipped.
#[derive(Debug)]
pub struct ProcessEnvironment {
    arguments: Vec<String>,
    variables: VariableStore,
    working_directory: PathBuf,
    exit_code: AtomicI32,
}

impl ProcessEnvironment {
    pub fn new() -> Result<Self, EnvironmentError> {
        let working_directory =
            std::env::current_dir().map_err(EnvironmentError::WorkingDirectory)?;

        Ok(Self {
            arguments: std::env::args_os()
                .map(|argument| argument.to_string_lossy().into_owned())
                .collect(),
            variables: std::env::vars_os()
                .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
                .collect(),
            working_directory,
            exit_code: AtomicI32::new(0),
        })
    }
}

impl Environment for ProcessEnvironment {
    fn interactive(&self) -> bool {
        std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
    }

    fn input(&self) -> Arc<dyn Readable> {
        Arc::new(StandardInput)
    }

    fn output(&self) -> Arc<dyn Writable> {
        Arc::new(StandardOutput)
    }

    fn error(&self) -> Arc<dyn Writable> {
        Arc::new(StandardError)
    }

    fn arguments(&self) -> Vec<String> {
        self.arguments.clone()
    }

    fn variables(&self) -> Result<VariableStore, EnvironmentError> {
        Ok(self.variables.clone())
    }

    fn exit(&self, code: i32) {
        self.exit_code.store(code, Ordering::SeqCst);
    }

    fn exit_code(&self) -> ExitCode {
        ExitCode::new(self.exit_code.load(Ordering::SeqCst))
    }

    fn working_directory(&self) -> PathBuf {
        self.working_directory.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_environment_creation() {
        let env = ProcessEnvironment::new().unwrap();

        assert_eq!(env.working_directory(), std::env::current_dir().unwrap());
        assert!(!env.arguments().is_empty());
        assert!(env.exit_code().is_successful());
    }

    #[test]
    fn test_exit_is_recorded() {
        let env = ProcessEnvironment::new().unwrap();
        env.exit(3);

        assert_eq!(env.exit_code(), ExitCode::new(3));
    }
}
