// ─── Install Profile ───
// Static configuration the wizard shell hands the pipeline: where the remote
// manifests live, what the destination must look like, and how to identify
// this installer build.

use serde::{Deserialize, Serialize};

/// Optional HTTP proxy; absence means a direct connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallProfile {
    /// Version of the running installer, compared against the resolved remote
    /// version to offer an upgrade.
    pub installer_version: String,
    /// Ordered mirror base URLs hosting the remote manifest set.
    pub mirror_urls: Vec<String>,
    /// Base-game asset file the destination should contain (case-insensitive
    /// match, non-recursive). `None` when no retail installation is required.
    #[serde(default)]
    pub retail_marker: Option<String>,
    /// Package-archive extension checked during extra-file detection, e.g.
    /// `".pak"`. Empty disables the check.
    #[serde(default)]
    pub archive_extension: String,
    /// Lowercase archive file names that are expected in the destination.
    #[serde(default)]
    pub allowed_archives: Vec<String>,
}

impl InstallProfile {
    pub fn new(installer_version: impl Into<String>, mirror_urls: Vec<String>) -> Self {
        Self {
            installer_version: installer_version.into(),
            mirror_urls,
            retail_marker: None,
            archive_extension: String::new(),
            allowed_archives: Vec::new(),
        }
    }
}
