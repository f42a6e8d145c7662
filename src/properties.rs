// ─── Durable User Properties ───
// The on-disk record that outlives a run: the chosen destination, the proxy,
// and one installed-version entry per package tree path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InstallerError, InstallerResult};
use crate::profile::ProxyConfig;

const APP_DIR_NAME: &str = "Modhaven";
const PROPERTIES_FILE: &str = "user_properties.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProperties {
    #[serde(default)]
    pub destination_dir: Option<PathBuf>,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
    /// Tree path name → installed version string.
    #[serde(default)]
    pub installed_versions: BTreeMap<String, String>,
}

/// Loads, mutates, and saves the durable properties document as a whole.
#[derive(Debug)]
pub struct PropertiesStore {
    path: PathBuf,
    props: UserProperties,
}

impl PropertiesStore {
    /// Load from `path`; a missing or unreadable document yields defaults.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let props = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self { path, props }
    }

    /// The conventional per-user location of the properties document.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join(PROPERTIES_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> InstallerResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| InstallerError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(&self.props)?;
        std::fs::write(&self.path, json).map_err(|source| InstallerError::Io {
            path: self.path.clone(),
            source,
        })
    }

    pub fn contains_version(&self, tree_path: &str) -> bool {
        self.props.installed_versions.contains_key(tree_path)
    }

    pub fn installed_version(&self, tree_path: &str) -> Option<&str> {
        self.props.installed_versions.get(tree_path).map(String::as_str)
    }

    pub fn set_installed_version(&mut self, tree_path: &str, version: &str) {
        self.props
            .installed_versions
            .insert(tree_path.to_string(), version.to_string());
    }

    pub fn set_destination(&mut self, dir: &Path) {
        self.props.destination_dir = Some(dir.to_path_buf());
    }

    pub fn destination(&self) -> Option<&Path> {
        self.props.destination_dir.as_deref()
    }

    pub fn set_proxy(&mut self, proxy: Option<ProxyConfig>) {
        self.props.proxy = proxy;
    }

    pub fn proxy(&self) -> Option<&ProxyConfig> {
        self.props.proxy.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PropertiesStore::load(dir.path().join("missing.json"));
        assert!(!store.contains_version("Root/Alpha"));
        assert!(store.destination().is_none());
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("props.json");

        let mut store = PropertiesStore::load(&path);
        store.set_installed_version("Root/Alpha", "1.0");
        store.set_destination(Path::new("/games/dest"));
        store.set_proxy(Some(ProxyConfig {
            host: "proxy.example.com".into(),
            port: 8080,
        }));
        store.save().unwrap();

        let reloaded = PropertiesStore::load(&path);
        assert_eq!(reloaded.installed_version("Root/Alpha"), Some("1.0"));
        assert_eq!(reloaded.destination(), Some(Path::new("/games/dest")));
        assert_eq!(reloaded.proxy().unwrap().port, 8080);
    }

    #[test]
    fn corrupt_document_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("props.json");
        std::fs::write(&path, "not json").unwrap();
        let store = PropertiesStore::load(&path);
        assert!(!store.contains_version("anything"));
    }
}
