//! Values parsed from the command line for one command

use indexmap::IndexMap;

/// Positional arguments of a command invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    values: IndexMap<String, String>,
    pack: Vec<String>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn with_pack<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pack = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Values collected by the trailing `...name` argument
    pub fn pack(&self) -> &[String] {
        &self.pack
    }
}

/// Options of a command invocation
///
/// Flags are present without a value, value options carry the value they were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    values: IndexMap<String, Option<String>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(mut self, name: impl Into<String>) -> Self {
        self.values.insert(name.into(), None);
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), Some(value.into()));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name)?.as_deref()
    }
}
