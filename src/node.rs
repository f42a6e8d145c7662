// ─── Package Tree ───
// The resolved catalog of installable units. A node with children is a
// grouping node; a leaf is directly installable.

use serde::{Deserialize, Serialize};

/// One downloadable archive group belonging to a package: every file in
/// `files` is available from any of the `base_urls`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallUnit {
    #[serde(default)]
    pub base_urls: Vec<String>,
    #[serde(default)]
    pub files: Vec<String>,
    /// Optional SHA-1 digests, parallel to `files`.
    #[serde(default)]
    pub digests: Vec<String>,
}

/// A node in the resolved installable-package tree.
///
/// The parent owns its children exclusively; the tree is rebuilt fresh from
/// the remote manifests on every run. Only the installed-version entry keyed
/// by [`ModNode::tree_path_name`] survives between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModNode {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Directory the package installs into, relative to the destination.
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub units: Vec<InstallUnit>,
    /// Shell commands run after the package's files are in place.
    #[serde(default)]
    pub hook_commands: Vec<String>,
    /// Stale files removed before installation.
    #[serde(default)]
    pub delete_paths: Vec<String>,
    #[serde(default)]
    pub children: Vec<ModNode>,
}

impl ModNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The stable identity key for persisted version tracking: the `/`-joined
    /// chain of names from the root down to this node.
    pub fn tree_path_name(&self, parent_path: Option<&str>) -> String {
        match parent_path {
            Some(parent) => format!("{}/{}", parent, self.name),
            None => self.name.clone(),
        }
    }

    /// Whether this node can be installed directly (no grouping children).
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Lazy depth-first traversal yielding `(tree path name, node)` pairs,
    /// starting with this node itself. Restartable: call again for a fresh
    /// traversal.
    pub fn iter_depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            stack: vec![(self.name.clone(), self)],
        }
    }
}

/// Explicit-stack depth-first iterator over a [`ModNode`] tree.
pub struct DepthFirst<'a> {
    stack: Vec<(String, &'a ModNode)>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (String, &'a ModNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        // Reverse so the first child is popped first.
        for child in node.children.iter().rev() {
            self.stack.push((format!("{}/{}", path, child.name), child));
        }
        Some((path, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> ModNode {
        let mut root = ModNode::new("Root");
        let mut group = ModNode::new("Group");
        group.children.push(ModNode::new("Leaf1"));
        group.children.push(ModNode::new("Leaf2"));
        root.children.push(group);
        root.children.push(ModNode::new("Solo"));
        root
    }

    #[test]
    fn tree_path_names_chain_from_root() {
        let node = ModNode::new("Child");
        assert_eq!(node.tree_path_name(None), "Child");
        assert_eq!(node.tree_path_name(Some("Root/Group")), "Root/Group/Child");
    }

    #[test]
    fn depth_first_order_and_paths() {
        let root = sample_tree();
        let paths: Vec<String> = root.iter_depth_first().map(|(path, _)| path).collect();
        assert_eq!(
            paths,
            vec![
                "Root",
                "Root/Group",
                "Root/Group/Leaf1",
                "Root/Group/Leaf2",
                "Root/Solo",
            ]
        );
    }

    #[test]
    fn traversal_is_restartable() {
        let root = sample_tree();
        let first: Vec<String> = root.iter_depth_first().map(|(p, _)| p).collect();
        let second: Vec<String> = root.iter_depth_first().map(|(p, _)| p).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn leaf_detection() {
        let root = sample_tree();
        assert!(!root.is_leaf());
        assert!(root.children[1].is_leaf());
    }

    #[test]
    fn deserialize_with_defaults() {
        let node: ModNode = serde_json::from_str(r#"{"name": "Alpha"}"#).unwrap();
        assert_eq!(node.name, "Alpha");
        assert!(node.children.is_empty());
        assert!(node.units.is_empty());
        assert!(node.version.is_none());
    }
}
