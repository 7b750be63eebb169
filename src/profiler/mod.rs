//! Opt-in command profiler
//!
//! Setting the [`ACTIVATION_VARIABLE`] to a `file://` URL profiles every command run
//! by the application: each invocation produces a JSON [`Profile`] written to that
//! directory once the command returns. Filesystem calls go through
//! [`Profiler::operating_system`] so they can be attributed to the running command.

mod command;
mod error;
mod os;
mod profile;
mod section;

pub use command::ProfiledCommand;
pub use error::ProfilerError;
pub use os::ProfiledOperatingSystem;
pub use profile::{CallGraph, Profile, ProfileStatus};
pub use section::Section;

use crate::command::Command;
use crate::middleware::Middleware;
use crate::os::{ActivityKind, File, OperatingSystemHandle};
use profile::Frame;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

/// Variable enabling the profiler, holding the URL of the sink
pub const ACTIVATION_VARIABLE: &str = "PROFILER";

struct Shared {
    os: OperatingSystemHandle,
    sink: PathBuf,
    variables: serde_json::Map<String, serde_json::Value>,
    parent: Option<Uuid>,
    sections: BTreeSet<Section>,
    frames: Mutex<Vec<Frame>>,
}

/// Records and stores command profiles
///
/// Clones share the same recording state.
#[derive(Clone)]
pub struct Profiler {
    shared: Arc<Shared>,
}

impl Profiler {
    /// Profiler writing profiles to `sink` through `os`
    ///
    /// `parent` links the profiles of this run to the profile of another one.
    pub fn new(
        os: OperatingSystemHandle,
        sink: Url,
        variables: serde_json::Map<String, serde_json::Value>,
        parent: Option<Uuid>,
        disabled: BTreeSet<Section>,
    ) -> Result<Self, ProfilerError> {
        if sink.scheme() != "file" {
            return Err(ProfilerError::UnsupportedScheme(sink.scheme().to_string()));
        }
        let path = sink
            .to_file_path()
            .map_err(|()| ProfilerError::InvalidSink(sink.to_string()))?;

        let sections = Section::ALL
            .into_iter()
            .filter(|section| !disabled.contains(section))
            .collect::<BTreeSet<_>>();
        debug!(sink = %path.display(), ?sections, "Profiler enabled");

        Ok(Self {
            shared: Arc::new(Shared {
                os,
                sink: path,
                variables,
                parent,
                sections,
                frames: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Parse the value of the activation variable into a sink URL
    pub fn parse_sink(value: &str) -> Result<Url, ProfilerError> {
        Url::parse(value).map_err(|source| ProfilerError::InvalidUrl {
            url: value.to_string(),
            source,
        })
    }

    pub fn sink(&self) -> &Path {
        &self.shared.sink
    }

    pub fn is_enabled(&self, section: Section) -> bool {
        self.shared.sections.contains(&section)
    }

    /// Operating system attributing filesystem calls to the running command
    pub fn operating_system(&self) -> OperatingSystemHandle {
        Arc::new(ProfiledOperatingSystem::new(
            self.shared.os.clone(),
            self.clone(),
        ))
    }

    /// Middleware wrapping every command in a [`ProfiledCommand`]
    pub fn middleware(&self) -> Middleware {
        let profiler = self.clone();
        Arc::new(move |commands: Vec<Box<dyn Command>>| {
            commands
                .into_iter()
                .map(|command| {
                    Box::new(ProfiledCommand::new(profiler.clone(), command)) as Box<dyn Command>
                })
                .collect()
        })
    }

    fn frames(&self) -> MutexGuard<'_, Vec<Frame>> {
        self.shared
            .frames
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn start(&self, command: String) -> Uuid {
        let mut frames = self.frames();
        let parent = frames
            .last()
            .map(|frame| frame.id)
            .or(self.shared.parent);
        let frame = Frame::start(command, parent);
        let id = frame.id;
        frames.push(frame);
        id
    }

    pub(crate) fn finish(&self, id: Uuid, outcome: &anyhow::Result<()>) -> Option<Profile> {
        let frame = {
            let mut frames = self.frames();
            let position = frames.iter().rposition(|frame| frame.id == id)?;
            let frame = frames.remove(position);
            if let Some(parent) = frames.last_mut() {
                parent.children.push(id);
            }
            frame
        };

        Some(frame.finish(&self.shared.sections, &self.shared.variables, outcome))
    }

    pub(crate) fn record(&self, kind: ActivityKind, subject: impl Into<String>) {
        if !self.is_enabled(Section::Filesystem) {
            return;
        }

        if let Some(frame) = self.frames().last_mut() {
            frame.record(kind, subject.into());
        }
    }

    /// Write the profile to the sink
    pub fn flush(&self, profile: &Profile) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(profile)?;
        self.shared
            .os
            .filesystem()
            .mount(&self.shared.sink)?
            .add(File::new(profile.file_name(), content))?;
        debug!(profile = %profile.id, "Profile written");
        Ok(())
    }

    pub(crate) fn flush_best_effort(&self, profile: &Profile) {
        if let Err(e) = self.flush(profile) {
            warn!(
                "Failed to write profile {} to {}: {e:#}",
                profile.id,
                self.shared.sink.display()
            );
        }
    }
}

impl std::fmt::Debug for Profiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profiler")
            .field("sink", &self.shared.sink)
            .field("sections", &self.shared.sections)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::os::MockOperatingSystem;

    fn profiler(os: &MockOperatingSystem, disabled: &[Section]) -> Profiler {
        Profiler::new(
            Arc::new(os.clone()),
            Url::parse("file:///profiles").unwrap(),
            serde_json::Map::new(),
            None,
            disabled.iter().copied().collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_only_file_sinks_are_supported() {
        let result = Profiler::new(
            Arc::new(MockOperatingSystem::new()),
            Url::parse("https://example.com/profiles").unwrap(),
            serde_json::Map::new(),
            None,
            BTreeSet::new(),
        );

        assert!(matches!(result, Err(ProfilerError::UnsupportedScheme(scheme)) if scheme == "https"));
    }

    #[test]
    fn test_malformed_sink() {
        assert!(matches!(
            Profiler::parse_sink("not a url"),
            Err(ProfilerError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_disabled_sections() {
        let os = MockOperatingSystem::new();
        let profiler = profiler(&os, &[Section::Environment, Section::Environment]);

        assert!(!profiler.is_enabled(Section::Environment));
        assert!(profiler.is_enabled(Section::Exception));
        assert!(profiler.is_enabled(Section::CallGraph));
        assert!(profiler.is_enabled(Section::Filesystem));
    }

    #[test]
    fn test_nested_invocations_form_a_call_graph() {
        let os = MockOperatingSystem::new();
        let profiler = profiler(&os, &[]);

        let outer = profiler.start("outer".to_string());
        let inner = profiler.start("inner".to_string());
        let inner_profile = profiler.finish(inner, &Ok(())).unwrap();
        let outer_profile = profiler.finish(outer, &Ok(())).unwrap();

        assert_eq!(inner_profile.parent, Some(outer));
        assert_eq!(outer_profile.parent, None);
        assert_eq!(outer_profile.call_graph.unwrap().children, vec![inner]);
    }

    #[test]
    fn test_flush_writes_json_to_sink() {
        let os = MockOperatingSystem::new();
        let profiler = profiler(&os, &[]);

        let id = profiler.start("cmd".to_string());
        let profile = profiler
            .finish(id, &Err(anyhow::anyhow!("broken")))
            .unwrap();
        profiler.flush(&profile).unwrap();

        let written = os
            .mock_filesystem()
            .file("/profiles", &profile.file_name())
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(json["command"], "cmd");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["exception"], "broken");
    }
}
