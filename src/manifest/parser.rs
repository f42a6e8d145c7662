use serde::Deserialize;

use crate::error::{InstallerError, InstallerResult};
use crate::node::ModNode;

/// Package-manifest parsing seam. The contract the pipeline needs is only
/// "yields zero or more package trees or a parse error"; the wizard shell may
/// substitute other document formats.
pub trait ManifestParser: Send + Sync {
    fn parse(&self, text: &str) -> InstallerResult<Vec<ModNode>>;
}

/// A manifest document is either a single package tree or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestDocument {
    Many(Vec<ModNode>),
    One(Box<ModNode>),
}

/// Default parser: JSON package trees (see [`ModNode`] for the field set).
pub struct JsonManifestParser;

impl ManifestParser for JsonManifestParser {
    fn parse(&self, text: &str) -> InstallerResult<Vec<ModNode>> {
        let document: ManifestDocument = serde_json::from_str(text)
            .map_err(|e| InstallerError::ManifestParse(e.to_string()))?;
        let nodes = match document {
            ManifestDocument::Many(nodes) => nodes,
            ManifestDocument::One(node) => vec![*node],
        };

        for node in &nodes {
            for (path, descendant) in node.iter_depth_first() {
                if descendant.name.trim().is_empty() {
                    return Err(InstallerError::ManifestParse(format!(
                        "package with an empty name under '{path}'"
                    )));
                }
            }
        }
        Ok(nodes)
    }
}
