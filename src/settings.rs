// ─── Session Settings ───
// Process-wide state shared between the interactive shell and the background
// worker. Created once per run, populated incrementally by pipeline phases,
// selectively cleared on phase rollback, discarded at process exit.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Mutex;

use crate::node::ModNode;
use crate::profile::ProxyConfig;

/// Typed per-run settings. Presence of a field doubles as the "phase already
/// succeeded" guard for the corresponding pipeline phase, so re-entering the
/// pipeline (user navigating back and forward) is cheap.
#[derive(Debug, Default)]
pub struct SessionSettings {
    /// Highest version advertised by any mirror. Set last by the remote
    /// discovery phase because it is the phase's presence guard.
    pub remote_version: Option<String>,
    /// Canonical download page for the newest installer build.
    pub download_page_url: Option<String>,
    /// Package-manifest URLs listed by the winning mirror.
    pub mod_urls: Option<Vec<String>>,
    /// Preset package names from the winning mirror's basic configuration.
    pub basic_config: Option<Vec<String>>,
    /// The resolved installable-package catalog.
    pub mod_nodes: Option<Vec<ModNode>>,
    /// Destination directories already validated in this run.
    pub checked_directories: HashSet<PathBuf>,
    /// Proxy in effect for this run, if any.
    pub proxy: Option<ProxyConfig>,
    /// HTTP client built for this run (proxy-aware).
    pub connector: Option<Client>,
}

impl SessionSettings {
    /// Discard everything the remote discovery phase may have recorded so a
    /// later attempt starts the phase clean.
    pub fn rollback_remote_discovery(&mut self) {
        self.remote_version = None;
        self.download_page_url = None;
        self.mod_urls = None;
        self.basic_config = None;
    }

    /// Discard the accumulated package catalog.
    pub fn rollback_mod_tree(&mut self) {
        self.mod_nodes = None;
    }

    pub fn is_directory_checked(&self, dir: &Path) -> bool {
        self.checked_directories.contains(dir)
    }

    pub fn mark_directory_checked(&mut self, dir: &Path) {
        self.checked_directories.insert(dir.to_path_buf());
    }
}

/// The settings store as shared by the shell and the worker: one coarse lock,
/// guards never held across network suspension points.
pub type SharedSettings = Arc<Mutex<SessionSettings>>;

pub fn new_shared_settings() -> SharedSettings {
    Arc::new(Mutex::new(SessionSettings::default()))
}
