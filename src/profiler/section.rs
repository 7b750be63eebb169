use serde::{Deserialize, Serialize};
use std::fmt;

/// Part of a profile that can be switched off
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Variables visible to the program
    Environment,
    /// Error returned by the command
    Exception,
    /// Duration and nested command invocations
    CallGraph,
    /// Filesystem calls made while the command ran
    Filesystem,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Environment,
        Section::Exception,
        Section::CallGraph,
        Section::Filesystem,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Environment => "environment",
            Self::Exception => "exception",
            Self::CallGraph => "call_graph",
            Self::Filesystem => "filesystem",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_names_match_display() {
        for section in Section::ALL {
            assert_eq!(
                serde_json::to_value(section).unwrap(),
                serde_json::Value::String(section.to_string())
            );
        }
    }
}
