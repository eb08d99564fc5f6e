use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::ConfigError;
use crate::hcl::Block;

/// A rendered piece of configuration with a stable key.
///
/// Dependencies are carried by value, so a fragment is self-contained: adding
/// it to a document pulls in everything it references. Shared dependencies
/// are deduplicated by key when the document is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    key: String,
    text: String,
    depends_on: Vec<Fragment>,
    /// Keys that must be supplied by some other fragment in the same document.
    requires: Vec<String>,
}

impl Fragment {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
            depends_on: Vec::new(),
            requires: Vec::new(),
        }
    }

    pub fn from_blocks(key: impl Into<String>, blocks: &[Block]) -> Self {
        let text = blocks.iter().map(Block::render).collect::<Vec<_>>().join("\n");
        Self::new(key, text)
    }

    pub fn depends_on(mut self, deps: &[Fragment]) -> Self {
        self.depends_on.extend(deps.iter().cloned());
        self
    }

    /// Declare a dependency by key only.
    pub fn requires(mut self, key: impl Into<String>) -> Self {
        self.requires.push(key.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn dependencies(&self) -> &[Fragment] {
        &self.depends_on
    }
}

/// A complete configuration document, dependencies first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    fragments: Vec<Fragment>,
}

impl ConfigDocument {
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::default()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            let text = fragment.text.trim_end_matches('\n');
            if text.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(text);
            out.push('\n');
        }
        out
    }

    /// SHA-256 of the rendered text, lowercase hex.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.render().as_bytes());
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Fragment keys in render order.
    pub fn keys(&self) -> Vec<&str> {
        self.fragments.iter().map(|f| f.key.as_str()).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fragments.iter().any(|f| f.key == key)
    }
}

#[derive(Debug, Default)]
pub struct DocumentBuilder {
    roots: Vec<Fragment>,
    raw_count: usize,
}

impl DocumentBuilder {
    pub fn with(mut self, fragment: Fragment) -> Self {
        self.roots.push(fragment);
        self
    }

    pub fn with_all(mut self, fragments: impl IntoIterator<Item = Fragment>) -> Self {
        self.roots.extend(fragments);
        self
    }

    /// Append text with no dependencies.
    pub fn raw(mut self, text: impl Into<String>) -> Self {
        self.raw_count += 1;
        let key = format!("raw#{}", self.raw_count);
        self.roots.push(Fragment::new(key, text));
        self
    }

    pub fn build(self) -> Result<ConfigDocument, ConfigError> {
        let mut graph: DiGraph<Fragment, ()> = DiGraph::new();
        let mut by_key: HashMap<String, NodeIndex> = HashMap::new();

        for root in &self.roots {
            collect(root, &mut graph, &mut by_key)?;
        }

        // Key-only requirements can only be resolved once everything is collected.
        let mut edges = Vec::new();
        for idx in graph.node_indices() {
            for required in &graph[idx].requires {
                let dep = by_key.get(required).ok_or_else(|| ConfigError::UnknownDependency {
                    key: graph[idx].key.clone(),
                    dependency: required.clone(),
                })?;
                edges.push((*dep, idx));
            }
        }
        for (from, to) in edges {
            graph.update_edge(from, to, ());
        }

        let order = petgraph::algo::toposort(&graph, None).map_err(|cycle| {
            ConfigError::CycleDetected {
                key: graph[cycle.node_id()].key.clone(),
            }
        })?;

        let fragments: Vec<Fragment> = order.into_iter().map(|idx| graph[idx].clone()).collect();
        debug!(fragments = fragments.len(), "configuration document built");
        Ok(ConfigDocument { fragments })
    }
}

/// Insert `fragment` and its transitive dependencies; edges point from a
/// dependency to its dependent.
fn collect(
    fragment: &Fragment,
    graph: &mut DiGraph<Fragment, ()>,
    by_key: &mut HashMap<String, NodeIndex>,
) -> Result<NodeIndex, ConfigError> {
    if let Some(&existing) = by_key.get(&fragment.key) {
        if graph[existing].text != fragment.text {
            return Err(ConfigError::ConflictingFragment {
                key: fragment.key.clone(),
            });
        }
        return Ok(existing);
    }

    let idx = graph.add_node(fragment.clone());
    by_key.insert(fragment.key.clone(), idx);

    for dep in &fragment.depends_on {
        let dep_idx = collect(dep, graph, by_key)?;
        graph.update_edge(dep_idx, idx, ());
    }
    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(doc: &ConfigDocument, key: &str) -> usize {
        doc.keys().iter().position(|k| *k == key).unwrap()
    }

    #[test]
    fn dependencies_render_first_and_once() {
        let vcn = Fragment::new("vcn", "resource \"oci_core_vcn\" \"test_vcn\" {}\n");
        let route = Fragment::new("route_table", "resource \"oci_core_route_table\" \"r\" {}\n")
            .depends_on(&[vcn.clone()]);
        let subnet = Fragment::new("subnet", "resource \"oci_core_subnet\" \"s\" {}\n")
            .depends_on(&[vcn.clone(), route]);

        let doc = ConfigDocument::builder().with(subnet).build().unwrap();

        assert_eq!(doc.keys().len(), 3);
        assert!(position(&doc, "vcn") < position(&doc, "route_table"));
        assert!(position(&doc, "route_table") < position(&doc, "subnet"));
        assert_eq!(doc.render().matches("oci_core_vcn").count(), 1);
    }

    #[test]
    fn conflicting_definitions_are_rejected() {
        let a = Fragment::new("vcn", "one");
        let b = Fragment::new("vcn", "two");
        let err = ConfigDocument::builder().with(a).with(b).build().unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingFragment { key } if key == "vcn"));
    }

    #[test]
    fn key_requirements_must_resolve() {
        let orphan = Fragment::new("subnet", "x").requires("vcn");
        let err = ConfigDocument::builder().with(orphan.clone()).build().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDependency { .. }));

        let doc = ConfigDocument::builder()
            .with(orphan)
            .with(Fragment::new("vcn", "y"))
            .build()
            .unwrap();
        assert!(position(&doc, "vcn") < position(&doc, "subnet"));
    }

    #[test]
    fn cycles_are_reported() {
        let a = Fragment::new("a", "a").requires("b");
        let b = Fragment::new("b", "b").requires("a");
        let err = ConfigDocument::builder().with(a).with(b).build().unwrap_err();
        assert!(matches!(err, ConfigError::CycleDetected { .. }));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let one = ConfigDocument::builder().raw("a = 1").build().unwrap();
        let same = ConfigDocument::builder().raw("a = 1\n").build().unwrap();
        let other = ConfigDocument::builder().raw("a = 2").build().unwrap();

        assert_eq!(one.fingerprint().len(), 64);
        assert_eq!(one.fingerprint(), same.fingerprint());
        assert_ne!(one.fingerprint(), other.fingerprint());
    }

    #[test]
    fn render_separates_fragments_with_blank_lines() {
        let doc = ConfigDocument::builder().raw("a = 1").raw("").raw("b = 2\n").build().unwrap();
        assert_eq!(doc.render(), "a = 1\n\nb = 2\n");
    }
}
