//! Assistant name lookup.

use std::collections::HashMap;

use crate::config::AssistantEntry;

/// Display-name → assistant-id table, loaded from configuration.
///
/// Names match exactly (case-sensitive). A later entry with the same name
/// replaces an earlier one.
#[derive(Debug, Clone, Default)]
pub struct AssistantDirectory {
    by_name: HashMap<String, String>,
}

impl AssistantDirectory {
    #[must_use]
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = AssistantEntry>,
    {
        Self {
            by_name: entries.into_iter().map(|e| (e.name, e.id)).collect(),
        }
    }

    /// Assistant id registered under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
