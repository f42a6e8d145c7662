// ─── Modhaven Core ───
// Backend pipeline for the mod platform installer. The graphical wizard
// shell drives this crate and renders its prompts.
//
// Architecture:
//   pipeline   — phase sequencing, rollback, re-entrancy guards
//   manifest/  — mirror sweep + package-manifest parsing into the catalog
//   legacy     — installed-versions ledger migration from older installers
//   directory  — destination read/write/asset/extra-archive checks
//   settings   — per-run shared state
//   properties — durable per-user state (tracked versions, destination)
//   download   — fetch-to-file contract + reqwest implementation
//   task       — cancellable background execution
//   exec       — platform-shell hook command execution
//   version    — dotted version comparison
//   node       — the installable-package tree
//   platform   — host-OS helpers

pub mod directory;
pub mod download;
pub mod error;
pub mod exec;
pub mod http;
pub mod legacy;
pub mod manifest;
pub mod node;
pub mod pipeline;
pub mod platform;
pub mod profile;
pub mod prompt;
pub mod properties;
pub mod settings;
pub mod task;
pub mod version;

pub use directory::{DirectoryOutcome, DirectoryState, DirectoryValidator};
pub use download::{Fetch, HttpFetcher};
pub use error::{InstallerError, InstallerResult};
pub use manifest::{JsonManifestParser, ManifestParser, ManifestResolver, ModTreeBuilder};
pub use node::{InstallUnit, ModNode};
pub use pipeline::{ProxyRequest, SetupPipeline, SetupRequest, ValidationOutcome};
pub use profile::{InstallProfile, ProxyConfig};
pub use prompt::UserPrompt;
pub use properties::PropertiesStore;
pub use settings::{new_shared_settings, SessionSettings, SharedSettings};
pub use task::{ensure_active, run_cancellable, TaskOutcome};
pub use version::compare_versions;

use tracing_subscriber::EnvFilter;

/// Initialize structured logging for an embedding shell.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,modhaven=debug")),
        )
        .init();
}
