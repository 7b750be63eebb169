//! Operating system backed by the standard library

use super::traits::{Adapter, File, Filesystem, OperatingSystem, Status};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directory of the local filesystem
#[derive(Debug, Clone)]
pub struct LocalAdapter {
    root: PathBuf,
}

impl LocalAdapter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Adapter for LocalAdapter {
    fn contains(&self, name: &str) -> bool {
        self.root.join(name).is_file()
    }

    fn get(&self, name: &str) -> std::io::Result<File> {
        let content = fs::read_to_string(self.root.join(name))?;
        Ok(File::new(name, content))
    }

    fn add(&self, file: File) -> std::io::Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.root.join(file.name()), file.content())
    }
}

/// Local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn contains(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn mount(&self, path: &Path) -> std::io::Result<Box<dyn Adapter>> {
        if path.exists() && !path.is_dir() {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("not a directory: {}", path.display()),
            ));
        }

        Ok(Box::new(LocalAdapter::new(path)))
    }
}

/// Status of the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStatus;

impl Status for LocalStatus {
    fn process_id(&self) -> u32 {
        std::process::id()
    }

    fn tmp(&self) -> PathBuf {
        std::env::temp_dir()
    }
}

/// Operating system the program actually runs on
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOperatingSystem;

impl LocalOperatingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl OperatingSystem for LocalOperatingSystem {
    fn filesystem(&self) -> Arc<dyn Filesystem> {
        Arc::new(LocalFilesystem)
    }

    fn status(&self) -> Arc<dyn Status> {
        Arc::new(LocalStatus)
    }
}
