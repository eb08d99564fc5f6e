use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Differences between the applied and the imported attribute sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportDiff {
    /// In the applied state only.
    pub missing: Vec<String>,
    /// In the imported state only.
    pub extra: Vec<String>,
    /// `(key, applied, imported)`
    pub differing: Vec<(String, String, String)>,
}

impl ImportDiff {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty() && self.differing.is_empty()
    }
}

impl fmt::Display for ImportDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.missing {
            writeln!(f, "  - {} (missing after import)", key)?;
        }
        for key in &self.extra {
            writeln!(f, "  + {} (only after import)", key)?;
        }
        for (key, applied, imported) in &self.differing {
            writeln!(f, "  ~ {}: applied '{}', imported '{}'", key, applied, imported)?;
        }
        Ok(())
    }
}

/// `key` is `attribute` itself or one of its flattened children.
fn within(key: &str, attribute: &str) -> bool {
    key.strip_prefix(attribute)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// `timeouts` only sometimes appears in state, so it never takes part.
fn skipped(key: &str, ignore: &[String]) -> bool {
    within(key, "timeouts") || ignore.iter().any(|attribute| within(key, attribute))
}

pub fn import_diff(
    applied: &BTreeMap<String, String>,
    imported: &BTreeMap<String, String>,
    ignore: &[String],
) -> ImportDiff {
    let mut diff = ImportDiff::default();

    for (key, value) in applied {
        if skipped(key, ignore) {
            continue;
        }
        match imported.get(key) {
            None => diff.missing.push(key.clone()),
            Some(other) if other != value => {
                diff.differing.push((key.clone(), value.clone(), other.clone()))
            }
            Some(_) => {}
        }
    }
    for key in imported.keys() {
        if !skipped(key, ignore) && !applied.contains_key(key) {
            diff.extra.push(key.clone());
        }
    }
    diff
}
