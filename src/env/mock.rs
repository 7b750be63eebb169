//! Mock environment for testing
//!
//! Streams are in-memory buffers and every call that matters to a test is
//! recorded, so behavior can be asserted without touching the real process.

use super::traits::{Environment, Readable, Writable};
use super::{EnvironmentError, ExitCode, VariableStore};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory input stream replaying predefined lines
#[derive(Debug, Default)]
pub struct BufferedInput {
    lines: Mutex<VecDeque<String>>,
}

impl BufferedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: Mutex::new(lines.into_iter().map(Into::into).collect()),
        }
    }
}

impl Readable for BufferedInput {
    fn read_line(&self) -> std::io::Result<Option<String>> {
        Ok(self.lines.lock().unwrap().pop_front())
    }
}

/// In-memory output stream keeping everything written to it
#[derive(Debug, Default)]
pub struct BufferedOutput {
    buffer: Mutex<String>,
    writes: Mutex<Vec<String>>,
}

impl BufferedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> String {
        self.buffer.lock().unwrap().clone()
    }

    /// Each individual write, in order
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl Writable for BufferedOutput {
    fn write(&self, data: &str) -> std::io::Result<()> {
        self.buffer.lock().unwrap().push_str(data);
        self.writes.lock().unwrap().push(data.to_string());
        Ok(())
    }
}

/// Mock environment for testing
///
/// # Examples
///
/// ```
/// use launchpad::env::{Environment, MockEnvironment};
///
/// let env = MockEnvironment::new().with_arguments(["bin", "greet"]);
/// env.output().write("hi\n").unwrap();
///
/// assert_eq!(env.arguments(), vec!["bin", "greet"]);
/// assert_eq!(env.output_contents(), "hi\n");
/// ```
#[derive(Debug)]
pub struct MockEnvironment {
    interactive: bool,
    input: Arc<BufferedInput>,
    output: Arc<BufferedOutput>,
    error: Arc<BufferedOutput>,
    arguments: Vec<String>,
    variables: VariableStore,
    working_directory: PathBuf,
    exits: Mutex<Vec<i32>>,
    variable_reads: AtomicUsize,
}

impl MockEnvironment {
    /// Environment with no variables, a single `bin` argument and `/` as working directory
    pub fn new() -> Self {
        Self {
            interactive: false,
            input: Arc::new(BufferedInput::default()),
            output: Arc::new(BufferedOutput::new()),
            error: Arc::new(BufferedOutput::new()),
            arguments: vec!["bin".to_string()],
            variables: VariableStore::new(),
            working_directory: PathBuf::from("/"),
            exits: Mutex::new(Vec::new()),
            variable_reads: AtomicUsize::new(0),
        }
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn with_input<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input = Arc::new(BufferedInput::new(lines));
        self
    }

    /// Replace the arguments, program name included
    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables = self.variables.with(key, value);
        self
    }

    pub fn with_variables(mut self, variables: VariableStore) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_working_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.working_directory = directory.into();
        self
    }

    /// Everything written to the output stream
    pub fn output_contents(&self) -> String {
        self.output.contents()
    }

    /// Everything written to the error stream
    pub fn error_contents(&self) -> String {
        self.error.contents()
    }

    /// Codes passed to [`Environment::exit`], in order
    pub fn exits(&self) -> Vec<i32> {
        self.exits.lock().unwrap().clone()
    }

    /// Number of times [`Environment::variables`] was called
    pub fn variable_reads(&self) -> usize {
        self.variable_reads.load(Ordering::SeqCst)
    }
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for MockEnvironment {
    fn interactive(&self) -> bool {
        self.interactive
    }

    fn input(&self) -> Arc<dyn Readable> {
        self.input.clone()
    }

    fn output(&self) -> Arc<dyn Writable> {
        self.output.clone()
    }

    fn error(&self) -> Arc<dyn Writable> {
        self.error.clone()
    }

    fn arguments(&self) -> Vec<String> {
        self.arguments.clone()
    }

    fn variables(&self) -> Result<VariableStore, EnvironmentError> {
        self.variable_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.variables.clone())
    }

    fn exit(&self, code: i32) {
        self.exits.lock().unwrap().push(code);
    }

    fn exit_code(&self) -> ExitCode {
        self.exits
            .lock()
            .unwrap()
            .last()
            .copied()
            .map(ExitCode::new)
            .unwrap_or_default()
    }

    fn working_directory(&self) -> PathBuf {
        self.working_directory.clone()
    }
}
