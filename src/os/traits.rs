//! Operating system trait definitions
//!
//! Only the capabilities the application itself relies on are abstracted: mounting
//! directories of the filesystem and introspecting the running process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared handle to an operating system, as threaded through the pipeline
pub type OperatingSystemHandle = Arc<dyn OperatingSystem>;

/// A named text file held by a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    name: String,
    content: String,
}

impl File {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// A mounted directory
pub trait Adapter: Send + Sync {
    /// Whether the directory holds a file with this name
    fn contains(&self, name: &str) -> bool;

    /// Load the file with this name
    fn get(&self, name: &str) -> std::io::Result<File>;

    /// Write the file, replacing any file with the same name
    ///
    /// The directory is created if it does not exist yet.
    fn add(&self, file: File) -> std::io::Result<()>;
}

/// Filesystem operations
pub trait Filesystem: Send + Sync {
    /// Whether the path exists as a directory
    fn contains(&self, path: &Path) -> bool;

    /// Mount the directory at `path`
    ///
    /// Mounting a path that does not exist yet is allowed, adding a file to it will
    /// create it. Mounting a path that exists but is not a directory fails.
    fn mount(&self, path: &Path) -> std::io::Result<Box<dyn Adapter>>;
}

/// Introspection of the running process
pub trait Status: Send + Sync {
    fn process_id(&self) -> u32;

    /// Root of the temporary directory
    fn tmp(&self) -> PathBuf;
}

/// The operating system the program runs on
pub trait OperatingSystem: Send + Sync {
    fn filesystem(&self) -> Arc<dyn Filesystem>;

    fn status(&self) -> Arc<dyn Status>;
}
