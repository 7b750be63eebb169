//! Profiles recorded for each command invocation

use super::Section;
use crate::os::{Activity, ActivityKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallGraph {
    pub duration_ms: i64,
    pub children: Vec<Uuid>,
}

/// Everything recorded about one command invocation
///
/// Sections that were switched off are left out of the serialized profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Uuid>,
    pub command: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: ProfileStatus,
    pub sections: BTreeSet<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_graph: Option<CallGraph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<Vec<Activity>>,
}

impl Profile {
    /// Name of the file the profile is written to in the sink
    pub fn file_name(&self) -> String {
        format!("{}.json", self.id)
    }
}

/// A profile still being recorded
#[derive(Debug)]
pub(super) struct Frame {
    pub id: Uuid,
    pub parent: Option<Uuid>,
    pub command: String,
    pub started_at: DateTime<Utc>,
    pub children: Vec<Uuid>,
    pub filesystem: Vec<Activity>,
}

impl Frame {
    pub fn start(command: String, parent: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent,
            command,
            started_at: Utc::now(),
            children: Vec::new(),
            filesystem: Vec::new(),
        }
    }

    pub fn record(&mut self, kind: ActivityKind, subject: String) {
        self.filesystem.push(Activity {
            kind,
            subject,
            recorded_at: Utc::now(),
        });
    }

    pub fn finish(
        self,
        sections: &BTreeSet<Section>,
        variables: &serde_json::Map<String, serde_json::Value>,
        outcome: &anyhow::Result<()>,
    ) -> Profile {
        let finished_at = Utc::now();
        let enabled = |section| sections.contains(&section);

        Profile {
            id: self.id,
            parent: self.parent,
            command: self.command,
            started_at: self.started_at,
            finished_at,
            status: match outcome {
                Ok(()) => ProfileStatus::Succeeded,
                Err(_) => ProfileStatus::Failed,
            },
            sections: sections.clone(),
            environment: enabled(Section::Environment).then(|| variables.clone()),
            exception: match outcome {
                Err(e) if enabled(Section::Exception) => Some(format!("{e:#}")),
                _ => None,
            },
            call_graph: enabled(Section::CallGraph).then(|| CallGraph {
                duration_ms: (finished_at - self.started_at).num_milliseconds(),
                children: self.children,
            }),
            filesystem: enabled(Section::Filesystem).then_some(self.filesystem),
        }
    }
}
