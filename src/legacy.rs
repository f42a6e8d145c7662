// ─── Legacy Version Migration ───
// A prior installer generation kept an `installedversions.txt` ledger under
// `<destination>/temp/`. Its per-package versions are carried forward into
// the durable properties once, then the ledger is deleted.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::download::read_trimmed_lines;
use crate::error::InstallerResult;
use crate::node::ModNode;
use crate::properties::PropertiesStore;

const LEDGER_FILE: &str = "installedversions.txt";
const LEGACY_DIR: &str = "temp";
const STALE_FILES: [&str; 2] = ["latest.txt", "version.txt"];

/// Result of scanning the ledger for one package name.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LedgerScan {
    Found(String),
    NotFound,
    /// The ledger carries more than one entry for the name; the ledger is
    /// assumed to have at most one, so nothing is migrated for this package.
    Duplicate,
}

/// Scan the token stream for `NAME` followed by `name`, then for the next
/// `VERSION` marker and its value. Markers match case-insensitively; an
/// unrecognized marker is skipped without consuming the following token.
fn scan_ledger_version(name: &str, tokens: &[String]) -> LedgerScan {
    let mut version: Option<String> = None;
    let mut iter = tokens.iter();

    while let Some(token) = iter.next() {
        if !token.eq_ignore_ascii_case("NAME") {
            continue;
        }
        let Some(candidate) = iter.next() else {
            break;
        };
        if candidate != name {
            continue;
        }
        if version.is_some() {
            return LedgerScan::Duplicate;
        }

        // Keep consuming until a VERSION marker appears or the stream ends.
        let mut adopted = None;
        while let Some(marker) = iter.next() {
            if marker.eq_ignore_ascii_case("VERSION") {
                adopted = iter.next().cloned();
                break;
            }
        }
        match adopted {
            Some(value) => version = Some(value),
            None => break,
        }
    }

    match version {
        Some(value) => LedgerScan::Found(value),
        None => LedgerScan::NotFound,
    }
}

/// Back-fill installed-version entries for every node in the catalog from the
/// ledger token stream. Nodes that already have a durable entry keep it; the
/// ledger is only consulted for the rest. Every child is visited regardless
/// of whether its parent matched.
pub fn migrate_node_versions(
    catalog: &[ModNode],
    tokens: &[String],
    properties: &mut PropertiesStore,
) {
    for node in catalog {
        for (tree_path, descendant) in node.iter_depth_first() {
            if properties.contains_version(&tree_path) {
                debug!("'{}' already has a tracked version; ledger ignored", tree_path);
                continue;
            }
            match scan_ledger_version(&descendant.name, tokens) {
                LedgerScan::Found(version) => {
                    info!("Migrated legacy version {} for '{}'", version, tree_path);
                    properties.set_installed_version(&tree_path, &version);
                }
                LedgerScan::Duplicate => {
                    warn!(
                        "The legacy ledger contains more than one version for the name '{}'!",
                        descendant.name
                    );
                }
                LedgerScan::NotFound => {}
            }
        }
    }
}

/// Look for a legacy ledger under `destination`, migrate it into the durable
/// properties, and clean the leftovers up.
///
/// Runs every time (the user may have changed the destination directory),
/// but the ledger is deleted after its first successful migration, so later
/// passes find nothing. Cleanup failures are logged, never fatal.
pub async fn run_legacy_migration(
    destination: &Path,
    catalog: &[ModNode],
    properties: &mut PropertiesStore,
) -> InstallerResult<()> {
    let legacy_dir = destination.join(LEGACY_DIR);
    if !legacy_dir.is_dir() {
        return Ok(());
    }

    let ledger_path = legacy_dir.join(LEDGER_FILE);
    if ledger_path.is_file() {
        match read_trimmed_lines(&ledger_path).await {
            Ok(tokens) => {
                migrate_node_versions(catalog, &tokens, properties);
                match properties.save() {
                    Ok(()) => {
                        if let Err(e) = tokio::fs::remove_file(&ledger_path).await {
                            warn!("Could not delete the migrated ledger: {}", e);
                        }
                    }
                    Err(e) => warn!("Could not persist migrated versions: {}", e),
                }
            }
            Err(e) => warn!("Could not read the legacy ledger: {}", e),
        }
    }

    for stale in STALE_FILES {
        let path = legacy_dir.join(stale);
        if path.is_file() {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!("Could not delete stale legacy file {:?}: {}", path, e);
            }
        }
    }

    let is_empty = match std::fs::read_dir(&legacy_dir) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => false,
    };
    if is_empty {
        if let Err(e) = tokio::fs::remove_dir(&legacy_dir).await {
            warn!("Could not remove the empty legacy directory: {}", e);
        }
    }

    Ok(())
}
