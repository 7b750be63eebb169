//! Operating system decorator retrying transient filesystem failures

use super::retry::RetryPolicy;
use super::traits::{Adapter, File, Filesystem, OperatingSystem, OperatingSystemHandle, Status};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Operating system whose fallible filesystem calls are retried per [`RetryPolicy`]
pub struct ResilientOperatingSystem {
    inner: OperatingSystemHandle,
    policy: RetryPolicy,
}

impl ResilientOperatingSystem {
    pub fn new(inner: OperatingSystemHandle, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl fmt::Debug for ResilientOperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientOperatingSystem")
            .field("inner", &"dyn OperatingSystem")
            .field("policy", &self.policy)
            .finish()
    }
}

impl OperatingSystem for ResilientOperatingSystem {
    fn filesystem(&self) -> Arc<dyn Filesystem> {
        Arc::new(ResilientFilesystem {
            inner: self.inner.filesystem(),
            policy: self.policy.clone(),
        })
    }

    fn status(&self) -> Arc<dyn Status> {
        self.inner.status()
    }
}

struct ResilientFilesystem {
    inner: Arc<dyn Filesystem>,
    policy: RetryPolicy,
}

impl Filesystem for ResilientFilesystem {
    fn contains(&self, path: &Path) -> bool {
        self.inner.contains(path)
    }

    fn mount(&self, path: &Path) -> std::io::Result<Box<dyn Adapter>> {
        let description = format!("mount of {}", path.display());
        let adapter = self.policy.retry(&description, || self.inner.mount(path))?;

        Ok(Box::new(ResilientAdapter {
            inner: adapter,
            root: path.to_path_buf(),
            policy: self.policy.clone(),
        }))
    }
}

struct ResilientAdapter {
    inner: Box<dyn Adapter>,
    root: PathBuf,
    policy: RetryPolicy,
}

impl Adapter for ResilientAdapter {
    fn contains(&self, name: &str) -> bool {
        self.inner.contains(name)
    }

    fn get(&self, name: &str) -> std::io::Result<File> {
        let description = format!("read of {}", self.root.join(name).display());
        self.policy.retry(&description, || self.inner.get(name))
    }

    fn add(&self, file: File) -> std::io::Result<()> {
        let description = format!("write of {}", self.root.join(file.name()).display());
        self.policy
            .retry(&description, || self.inner.add(file.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::os::MockOperatingSystem;
    use std::io::ErrorKind;

    #[test]
    fn test_mount_is_retried() {
        let os = MockOperatingSystem::new();
        os.mock_filesystem().add_directory("/app");
        os.mock_filesystem()
            .fail_mount("/app", ErrorKind::Interrupted, 2);
        let resilient = ResilientOperatingSystem::new(Arc::new(os.clone()), RetryPolicy::immediate(3));

        assert!(resilient.filesystem().mount(Path::new("/app")).is_ok());
        assert_eq!(os.mock_filesystem().mounts(), 3);
    }

    #[test]
    fn test_read_is_retried() {
        let os = MockOperatingSystem::new();
        os.mock_filesystem().add_file("/app", ".env", "A=1");
        os.mock_filesystem()
            .fail_read("/app", ".env", ErrorKind::TimedOut, 1);
        let resilient = ResilientOperatingSystem::new(Arc::new(os.clone()), RetryPolicy::immediate(1));

        let directory = resilient.filesystem().mount(Path::new("/app")).unwrap();
        assert_eq!(directory.get(".env").unwrap().content(), "A=1");
        assert_eq!(os.mock_filesystem().reads(), 2);
    }

    #[test]
    fn test_exhausted_retries_surface_the_error() {
        let os = MockOperatingSystem::new();
        os.mock_filesystem()
            .fail_mount("/app", ErrorKind::WouldBlock, 5);
        let resilient = ResilientOperatingSystem::new(Arc::new(os), RetryPolicy::immediate(2));

        let error = resilient
            .filesystem()
            .mount(Path::new("/app"))
            .err()
            .unwrap();
        assert_eq!(error.kind(), ErrorKind::WouldBlock);
    }

    #[test]
    fn test_status_is_not_wrapped() {
        let os = MockOperatingSystem::new().with_process_id(9);
        let resilient = ResilientOperatingSystem::new(Arc::new(os), RetryPolicy::default());

        assert_eq!(resilient.status().process_id(), 9);
    }
}
