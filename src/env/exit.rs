//! Exit code of a program run

use serde::Serialize;
use std::fmt;

/// Code a program exits with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ExitCode(i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    /// Command line usage error (`EX_USAGE`)
    pub const USAGE: ExitCode = ExitCode(64);

    pub fn new(code: i32) -> Self {
        Self(code)
    }

    pub fn is_successful(self) -> bool {
        self.0 == 0
    }

    pub fn to_int(self) -> i32 {
        self.0
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
