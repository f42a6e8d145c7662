use std::collections::HashSet;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::download::Fetch;
use crate::error::{InstallerError, InstallerResult};
use crate::node::ModNode;
use crate::platform::{mod_valid_for_host, sanitize_file_name};
use crate::task::ensure_active;

use super::parser::ManifestParser;

/// Downloads every package manifest and parses it into the catalog.
pub struct ModTreeBuilder<'a> {
    fetcher: &'a dyn Fetch,
    parser: &'a dyn ManifestParser,
}

impl<'a> ModTreeBuilder<'a> {
    pub fn new(fetcher: &'a dyn Fetch, parser: &'a dyn ManifestParser) -> Self {
        Self { fetcher, parser }
    }

    /// Build the full catalog from `urls`.
    ///
    /// A URL that fails to download or parse is skipped (logged); packages
    /// marked for another operating system are filtered out. Cancellation
    /// aborts the whole build with [`InstallerError::Cancelled`] (the caller
    /// discards the accumulated nodes). An empty resulting catalog is fatal:
    /// the repositories listed manifests, yet nothing was installable.
    pub async fn build(
        &self,
        urls: &[String],
        token: &CancellationToken,
    ) -> InstallerResult<Vec<ModNode>> {
        let temp_dir = tempfile::tempdir().map_err(|e| InstallerError::Io {
            path: std::env::temp_dir(),
            source: e,
        })?;

        let mut catalog: Vec<ModNode> = Vec::new();
        for (index, url) in urls.iter().enumerate() {
            ensure_active(token)?;

            let tail = url.rsplit('/').next().unwrap_or("manifest");
            let dest = temp_dir
                .path()
                .join(format!("mod_{index}_{}", sanitize_file_name(tail)));

            if let Err(e) = self.fetcher.fetch(url, &dest).await {
                ensure_active(token)?;
                warn!("Could not download mod information from '{}': {}", url, e);
                continue;
            }

            let text = match tokio::fs::read_to_string(&dest).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Could not read back the manifest from '{}': {}", url, e);
                    continue;
                }
            };

            match self.parser.parse(&text) {
                Ok(nodes) => {
                    for node in nodes {
                        if !mod_valid_for_host(&node.name) {
                            info!("Skipping '{}' (not for this platform)", node.name);
                            continue;
                        }
                        info!("Successfully added {}", node.name);
                        catalog.push(node);
                    }
                }
                Err(e) => {
                    warn!("There was an error parsing the mod file at '{}': {}", url, e);
                }
            }
        }

        if catalog.is_empty() {
            return Err(InstallerError::EmptyCatalog);
        }

        warn_on_duplicate_paths(&catalog);
        Ok(catalog)
    }
}

/// Tree path names identify packages in the durable version store, so they
/// must be unique across the whole catalog.
fn warn_on_duplicate_paths(catalog: &[ModNode]) {
    let mut seen = HashSet::new();
    for node in catalog {
        for (path, _) in node.iter_depth_first() {
            if !seen.insert(path.clone()) {
                warn!("Duplicate package tree path '{}' in the catalog", path);
            }
        }
    }
}
