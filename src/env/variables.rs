//! Ordered, key-unique store of environment variables

use indexmap::IndexMap;
use std::sync::Arc;

/// Immutable mapping of variable names to values
///
/// Keys are case-sensitive and keep their insertion order. Every "mutating" method
/// returns a new store and leaves the receiver untouched; clones share the same
/// backing map, which is what [`VariableStore::ptr_eq`] observes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStore {
    entries: Arc<IndexMap<String, String>>,
}

impl VariableStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the given variable
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether the given variable is defined, whatever its value
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the variables in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// New store where `key` is set to `value`, overriding any previous value
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = IndexMap::clone(&self.entries);
        entries.insert(key.into(), value.into());

        Self {
            entries: Arc::new(entries),
        }
    }

    /// New store where each entry is added only if its key is not defined yet
    ///
    /// Entries are considered in iteration order, so the first occurrence of a
    /// duplicated key in `entries` wins as well.
    pub fn merge_absent<I, K, V>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut merged = IndexMap::clone(&self.entries);
        for (key, value) in entries {
            merged.entry(key.into()).or_insert_with(|| value.into());
        }

        Self {
            entries: Arc::new(merged),
        }
    }

    /// Snapshot of the variables as JSON strings
    pub fn to_scalars(&self) -> serde_json::Map<String, serde_json::Value> {
        self.iter()
            .map(|(key, value)| (key.to_string(), serde_json::Value::from(value)))
            .collect()
    }

    /// Whether both stores are the very same instance
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.entries, &other.entries)
    }
}

impl<K, V> FromIterator<(K, V)> for VariableStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: Arc::new(
                iter.into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }
}
