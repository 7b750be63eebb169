//! Tracing decorator recording every operating system call
//!
//! Activities are grouped in a room derived from the working directory of the
//! program, so runs started from the same project can be correlated. Each activity
//! is emitted as a `trace` event under the `launchpad::trace` target; only the most
//! recent ones are kept in memory.

use super::traits::{Adapter, File, Filesystem, OperatingSystem, OperatingSystemHandle, Status};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::trace;

/// Number of activities kept in memory by default
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 256;

/// Identifier of the group activities are recorded in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Room(String);

impl Room {
    /// Room of the given working directory
    pub fn of(working_directory: &Path) -> Self {
        let digest = Sha256::digest(working_directory.to_string_lossy().as_bytes());
        let mut id = format!("{digest:x}");
        id.truncate(16);
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of operating system call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Contains,
    Mount,
    Read,
    Write,
    ProcessId,
    Tmp,
}

/// One recorded operating system call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub kind: ActivityKind,
    pub subject: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Recorder {
    room: Room,
    process_id: u32,
    capacity: usize,
    activities: Mutex<VecDeque<Activity>>,
}

impl Recorder {
    fn record(&self, kind: ActivityKind, subject: impl Into<String>) {
        let subject = subject.into();
        trace!(
            target: "launchpad::trace",
            room = %self.room,
            pid = self.process_id,
            ?kind,
            subject = %subject,
            "operating system call"
        );

        if self.capacity == 0 {
            return;
        }
        if let Ok(mut activities) = self.activities.lock() {
            if activities.len() == self.capacity {
                activities.pop_front();
            }
            activities.push_back(Activity {
                kind,
                subject,
                recorded_at: Utc::now(),
            });
        }
    }
}

/// Operating system recording every call made through it
pub struct TracedOperatingSystem {
    inner: OperatingSystemHandle,
    recorder: Arc<Recorder>,
}

impl TracedOperatingSystem {
    pub fn new(inner: OperatingSystemHandle, working_directory: &Path) -> Self {
        Self::with_capacity(inner, working_directory, DEFAULT_ACTIVITY_CAPACITY)
    }

    /// Keep at most `capacity` activities in memory, older ones are dropped
    pub fn with_capacity(
        inner: OperatingSystemHandle,
        working_directory: &Path,
        capacity: usize,
    ) -> Self {
        let process_id = inner.status().process_id();

        Self {
            inner,
            recorder: Arc::new(Recorder {
                room: Room::of(working_directory),
                process_id,
                capacity,
                activities: Mutex::new(VecDeque::new()),
            }),
        }
    }

    pub fn room(&self) -> &Room {
        &self.recorder.room
    }

    /// Most recent calls, oldest first
    pub fn activities(&self) -> Vec<Activity> {
        self.recorder
            .activities
            .lock()
            .map(|activities| activities.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for TracedOperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracedOperatingSystem")
            .field("inner", &"dyn OperatingSystem")
            .field("room", &self.recorder.room)
            .finish()
    }
}

impl OperatingSystem for TracedOperatingSystem {
    fn filesystem(&self) -> Arc<dyn Filesystem> {
        Arc::new(TracedFilesystem {
            inner: self.inner.filesystem(),
            recorder: self.recorder.clone(),
        })
    }

    fn status(&self) -> Arc<dyn Status> {
        Arc::new(TracedStatus {
            inner: self.inner.status(),
            recorder: self.recorder.clone(),
        })
    }
}

struct TracedFilesystem {
    inner: Arc<dyn Filesystem>,
    recorder: Arc<Recorder>,
}

impl Filesystem for TracedFilesystem {
    fn contains(&self, path: &Path) -> bool {
        self.recorder
            .record(ActivityKind::Contains, path.display().to_string());
        self.inner.contains(path)
    }

    fn mount(&self, path: &Path) -> std::io::Result<Box<dyn Adapter>> {
        self.recorder
            .record(ActivityKind::Mount, path.display().to_string());
        let adapter = self.inner.mount(path)?;

        Ok(Box::new(TracedAdapter {
            inner: adapter,
            root: path.to_path_buf(),
            recorder: self.recorder.clone(),
        }))
    }
}

struct TracedAdapter {
    inner: Box<dyn Adapter>,
    root: PathBuf,
    recorder: Arc<Recorder>,
}

impl Adapter for TracedAdapter {
    fn contains(&self, name: &str) -> bool {
        self.recorder.record(
            ActivityKind::Contains,
            self.root.join(name).display().to_string(),
        );
        self.inner.contains(name)
    }

    fn get(&self, name: &str) -> std::io::Result<File> {
        self.recorder
            .record(ActivityKind::Read, self.root.join(name).display().to_string());
        self.inner.get(name)
    }

    fn add(&self, file: File) -> std::io::Result<()> {
        self.recorder.record(
            ActivityKind::Write,
            self.root.join(file.name()).display().to_string(),
        );
        self.inner.add(file)
    }
}

struct TracedStatus {
    inner: Arc<dyn Status>,
    recorder: Arc<Recorder>,
}

impl Status for TracedStatus {
    fn process_id(&self) -> u32 {
        self.recorder.record(ActivityKind::ProcessId, "");
        self.inner.process_id()
    }

    fn tmp(&self) -> PathBuf {
        self.recorder.record(ActivityKind::Tmp, "");
        self.inner.tmp()
    }
}
