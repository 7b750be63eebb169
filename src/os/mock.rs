//! Mock operating system for testing
//!
//! Directories and files live in memory. Failures can be scripted per path so retry
//! and error propagation paths are testable.

use super::traits::{Adapter, File, Filesystem, OperatingSystem, Status};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct State {
    directories: BTreeMap<PathBuf, BTreeMap<String, String>>,
    mount_failures: HashMap<PathBuf, VecDeque<ErrorKind>>,
    read_failures: HashMap<PathBuf, VecDeque<ErrorKind>>,
    mounts: usize,
    reads: usize,
}

impl State {
    fn next_failure(
        failures: &mut HashMap<PathBuf, VecDeque<ErrorKind>>,
        path: &Path,
    ) -> Option<std::io::Error> {
        let kind = failures.get_mut(path)?.pop_front()?;
        Some(std::io::Error::new(
            kind,
            format!("scripted failure for {}", path.display()),
        ))
    }
}

/// Mock filesystem for testing
///
/// # Examples
///
/// ```
/// use launchpad::os::{Filesystem, MockFilesystem};
/// use std::path::Path;
///
/// let fs = MockFilesystem::new();
/// fs.add_file("/app", ".env", "FOO=bar");
///
/// let directory = fs.mount(Path::new("/app")).unwrap();
/// assert_eq!(directory.get(".env").unwrap().content(), "FOO=bar");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockFilesystem {
    state: Arc<Mutex<State>>,
}

impl MockFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty directory
    pub fn add_directory(&self, path: impl Into<PathBuf>) {
        self.state
            .lock()
            .unwrap()
            .directories
            .entry(path.into())
            .or_default();
    }

    /// Add (or replace) a file, creating its directory if needed
    pub fn add_file(
        &self,
        directory: impl Into<PathBuf>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) {
        self.state
            .lock()
            .unwrap()
            .directories
            .entry(directory.into())
            .or_default()
            .insert(name.into(), content.into());
    }

    /// Content of a file, if it exists
    pub fn file(&self, directory: impl AsRef<Path>, name: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .directories
            .get(directory.as_ref())?
            .get(name)
            .cloned()
    }

    /// All files of a directory, sorted by name
    pub fn files(&self, directory: impl AsRef<Path>) -> Vec<File> {
        self.state
            .lock()
            .unwrap()
            .directories
            .get(directory.as_ref())
            .map(|files| {
                files
                    .iter()
                    .map(|(name, content)| File::new(name.clone(), content.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Make the next `times` mounts of `path` fail with `kind`
    pub fn fail_mount(&self, path: impl Into<PathBuf>, kind: ErrorKind, times: usize) {
        self.state
            .lock()
            .unwrap()
            .mount_failures
            .entry(path.into())
            .or_default()
            .extend(std::iter::repeat(kind).take(times));
    }

    /// Make the next `times` reads of `directory/name` fail with `kind`
    pub fn fail_read(
        &self,
        directory: impl AsRef<Path>,
        name: &str,
        kind: ErrorKind,
        times: usize,
    ) {
        self.state
            .lock()
            .unwrap()
            .read_failures
            .entry(directory.as_ref().join(name))
            .or_default()
            .extend(std::iter::repeat(kind).take(times));
    }

    /// Number of mount attempts, failed ones included
    pub fn mounts(&self) -> usize {
        self.state.lock().unwrap().mounts
    }

    /// Number of file read attempts, failed ones included
    pub fn reads(&self) -> usize {
        self.state.lock().unwrap().reads
    }
}

impl Filesystem for MockFilesystem {
    fn contains(&self, path: &Path) -> bool {
        self.state.lock().unwrap().directories.contains_key(path)
    }

    fn mount(&self, path: &Path) -> std::io::Result<Box<dyn Adapter>> {
        let mut state = self.state.lock().unwrap();
        state.mounts += 1;
        if let Some(error) = State::next_failure(&mut state.mount_failures, path) {
            return Err(error);
        }

        Ok(Box::new(MockAdapter {
            state: self.state.clone(),
            root: path.to_path_buf(),
        }))
    }
}

/// Directory mounted from a [`MockFilesystem`]
///
/// Reads always observe the current content of the filesystem.
#[derive(Debug, Clone)]
pub struct MockAdapter {
    state: Arc<Mutex<State>>,
    root: PathBuf,
}

impl Adapter for MockAdapter {
    fn contains(&self, name: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .directories
            .get(&self.root)
            .is_some_and(|files| files.contains_key(name))
    }

    fn get(&self, name: &str) -> std::io::Result<File> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        if let Some(error) = State::next_failure(&mut state.read_failures, &self.root.join(name)) {
            return Err(error);
        }

        state
            .directories
            .get(&self.root)
            .and_then(|files| files.get(name))
            .map(|content| File::new(name, content.clone()))
            .ok_or_else(|| {
                std::io::Error::new(
                    ErrorKind::NotFound,
                    format!("File not found: {}", self.root.join(name).display()),
                )
            })
    }

    fn add(&self, file: File) -> std::io::Result<()> {
        self.state
            .lock()
            .unwrap()
            .directories
            .entry(self.root.clone())
            .or_default()
            .insert(file.name().to_string(), file.content().to_string());
        Ok(())
    }
}

/// Fixed process status
#[derive(Debug, Clone)]
pub struct MockStatus {
    process_id: u32,
    tmp: PathBuf,
}

impl Default for MockStatus {
    fn default() -> Self {
        Self {
            process_id: 42,
            tmp: PathBuf::from("/tmp"),
        }
    }
}

impl Status for MockStatus {
    fn process_id(&self) -> u32 {
        self.process_id
    }

    fn tmp(&self) -> PathBuf {
        self.tmp.clone()
    }
}

/// Mock operating system for testing
#[derive(Debug, Clone, Default)]
pub struct MockOperatingSystem {
    filesystem: MockFilesystem,
    status: MockStatus,
}

impl MockOperatingSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process_id(mut self, process_id: u32) -> Self {
        self.status.process_id = process_id;
        self
    }

    pub fn with_tmp(mut self, tmp: impl Into<PathBuf>) -> Self {
        self.status.tmp = tmp.into();
        self
    }

    /// The in-memory filesystem, to seed or inspect it
    pub fn mock_filesystem(&self) -> &MockFilesystem {
        &self.filesystem
    }
}

impl OperatingSystem for MockOperatingSystem {
    fn filesystem(&self) -> Arc<dyn Filesystem> {
        Arc::new(self.filesystem.clone())
    }

    fn status(&self) -> Arc<dyn Status> {
        Arc::new(self.status.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_unknown_directory_then_add() {
        let fs = MockFilesystem::new();
        let path = Path::new("/reports");
        assert!(!fs.contains(path));

        fs.mount(path).unwrap().add(File::new("a.json", "{}")).unwrap();

        assert!(fs.contains(path));
        assert_eq!(fs.file(path, "a.json").as_deref(), Some("{}"));
    }

    #[test]
    fn test_scripted_mount_failures() {
        let fs = MockFilesystem::new();
        fs.add_directory("/app");
        fs.fail_mount("/app", ErrorKind::Interrupted, 1);

        let error = fs.mount(Path::new("/app")).err().unwrap();
        assert_eq!(error.kind(), ErrorKind::Interrupted);
        assert!(fs.mount(Path::new("/app")).is_ok());
        assert_eq!(fs.mounts(), 2);
    }

    #[test]
    fn test_adapter_observes_later_changes() {
        let fs = MockFilesystem::new();
        fs.add_file("/app", ".env", "A=1");
        let adapter = fs.mount(Path::new("/app")).unwrap();

        fs.add_file("/app", ".env", "A=2");

        assert_eq!(adapter.get(".env").unwrap().content(), "A=2");
    }

    #[test]
    fn test_missing_file() {
        let fs = MockFilesystem::new();
        fs.add_directory("/app");
        let adapter = fs.mount(Path::new("/app")).unwrap();

        assert!(!adapter.contains(".env"));
        assert_eq!(
            adapter.get(".env").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
