use super::Profiler;
use crate::os::{ActivityKind, Adapter, File, Filesystem, OperatingSystem, OperatingSystemHandle, Status};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Operating system attributing filesystem calls to the profiled command running
///
/// Calls made while no profiled command runs are not recorded.
pub struct ProfiledOperatingSystem {
    inner: OperatingSystemHandle,
    profiler: Profiler,
}

impl ProfiledOperatingSystem {
    pub fn new(inner: OperatingSystemHandle, profiler: Profiler) -> Self {
        Self { inner, profiler }
    }
}

impl std::fmt::Debug for ProfiledOperatingSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfiledOperatingSystem")
            .field("profiler", &self.profiler)
            .finish()
    }
}

impl OperatingSystem for ProfiledOperatingSystem {
    fn filesystem(&self) -> Arc<dyn Filesystem> {
        Arc::new(ProfiledFilesystem {
            inner: self.inner.filesystem(),
            profiler: self.profiler.clone(),
        })
    }

    fn status(&self) -> Arc<dyn Status> {
        self.inner.status()
    }
}

struct ProfiledFilesystem {
    inner: Arc<dyn Filesystem>,
    profiler: Profiler,
}

impl Filesystem for ProfiledFilesystem {
    fn contains(&self, path: &Path) -> bool {
        self.profiler
            .record(ActivityKind::Contains, path.display().to_string());
        self.inner.contains(path)
    }

    fn mount(&self, path: &Path) -> std::io::Result<Box<dyn Adapter>> {
        self.profiler
            .record(ActivityKind::Mount, path.display().to_string());

        Ok(Box::new(ProfiledAdapter {
            inner: self.inner.mount(path)?,
            root: path.to_path_buf(),
            profiler: self.profiler.clone(),
        }))
    }
}

struct ProfiledAdapter {
    inner: Box<dyn Adapter>,
    root: PathBuf,
    profiler: Profiler,
}

impl ProfiledAdapter {
    fn subject(&self, name: &str) -> String {
        self.root.join(name).display().to_string()
    }
}

impl Adapter for ProfiledAdapter {
    fn contains(&self, name: &str) -> bool {
        self.profiler
            .record(ActivityKind::Contains, self.subject(name));
        self.inner.contains(name)
    }

    fn get(&self, name: &str) -> std::io::Result<File> {
        self.profiler.record(ActivityKind::Read, self.subject(name));
        self.inner.get(name)
    }

    fn add(&self, file: File) -> std::io::Result<()> {
        self.profiler
            .record(ActivityKind::Write, self.subject(file.name()));
        self.inner.add(file)
    }
}
