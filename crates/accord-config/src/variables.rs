use crate::document::Fragment;
use crate::hcl::{Block, HclValue};

/// Ordered set of `variable` declarations with default values.
///
/// Overrides produce a new value; nothing is shared or mutated globally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    entries: Vec<(String, HclValue)>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace, keeping its position) the default of `name`.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<HclValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&HclValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.entries {
            out.push_str(&format!("variable \"{}\" {{ default = {} }}\n", name, value.render()));
        }
        out
    }

    /// Variables as a fragment. `key` should differ between variable sets
    /// that can appear in the same document.
    pub fn fragment(&self, key: impl Into<String>) -> Fragment {
        Fragment::new(key, self.render())
    }

    /// Render each variable as a standalone [`Block`]; used when a caller wants
    /// to attach descriptions or validation later.
    pub fn blocks(&self) -> Vec<Block> {
        self.entries
            .iter()
            .map(|(name, value)| Block::variable(name).attr("default", value.clone()))
            .collect()
    }
}
