// ─── Setup Pipeline ───
// Sequences the whole pre-install validation: destination checks, proxy
// construction, durable settings persistence, remote discovery, catalog
// build, and legacy migration. Each optional phase is guarded by a presence
// check on its session-settings field, so the pipeline is safely re-entrant
// when the user navigates back and forward.

use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::directory::{DirectoryOutcome, DirectoryValidator};
use crate::download::{Fetch, HttpFetcher};
use crate::error::{InstallerError, InstallerResult};
use crate::http::build_http_client;
use crate::legacy::run_legacy_migration;
use crate::manifest::{JsonManifestParser, ManifestParser, ManifestResolver, ModTreeBuilder};
use crate::profile::{InstallProfile, ProxyConfig};
use crate::prompt::UserPrompt;
use crate::properties::PropertiesStore;
use crate::settings::SharedSettings;
use crate::task::ensure_active;
use crate::version::compare_versions;

/// What the wizard page submitted: the destination directory text and the
/// proxy fields exactly as typed.
#[derive(Debug, Clone)]
pub struct SetupRequest {
    pub destination: String,
    pub proxy: Option<ProxyRequest>,
}

#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub host: String,
    pub port: String,
}

/// Terminal result of a completed (non-cancelled, non-failed) pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Everything checked out; the shell may advance to package selection.
    Ready,
    /// The user declined a continuation prompt or submitted unusable input.
    /// Silent halt; the shell stays on the page.
    Halted,
    /// A newer installer exists and the user accepted the offer: the shell
    /// should open the download page and exit.
    Upgrade { download_page: String },
}

pub struct SetupPipeline {
    profile: InstallProfile,
    settings: SharedSettings,
    properties: PropertiesStore,
    prompt: Arc<dyn UserPrompt>,
    fetcher: Option<Arc<dyn Fetch>>,
    parser: Arc<dyn ManifestParser>,
}

impl SetupPipeline {
    pub fn new(
        profile: InstallProfile,
        settings: SharedSettings,
        properties: PropertiesStore,
        prompt: Arc<dyn UserPrompt>,
    ) -> Self {
        Self {
            profile,
            settings,
            properties,
            prompt,
            fetcher: None,
            parser: Arc::new(JsonManifestParser),
        }
    }

    /// Substitute the network capability (the default is a proxy-aware
    /// [`HttpFetcher`] built during the proxy phase).
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetch>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn ManifestParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn properties(&self) -> &PropertiesStore {
        &self.properties
    }

    /// Run the full validation sequence.
    ///
    /// Cancellation surfaces as [`InstallerError::Cancelled`] after the
    /// in-flight phase's settings have been rolled back; wrap the call in
    /// [`crate::task::run_cancellable`] to fold that into a
    /// [`crate::task::TaskOutcome`].
    pub async fn run(
        &mut self,
        request: &SetupRequest,
        token: &CancellationToken,
    ) -> InstallerResult<ValidationOutcome> {
        info!("Validating user input...");

        // ── Destination ─────────────────────────────────
        let Some(destination) = self.prepare_destination(&request.destination).await? else {
            return Ok(ValidationOutcome::Halted);
        };

        let needs_directory_check = {
            !self
                .settings
                .lock()
                .await
                .is_directory_checked(&destination)
        };
        if needs_directory_check {
            let mut validator = DirectoryValidator::new(&self.profile, self.prompt.as_ref());
            match validator.validate(&destination, token).await? {
                DirectoryOutcome::Validated => {
                    self.settings
                        .lock()
                        .await
                        .mark_directory_checked(&destination);
                }
                DirectoryOutcome::Halted => return Ok(ValidationOutcome::Halted),
            }
        } else {
            debug!("Directory {:?} was already checked this run", destination);
        }

        // ── Proxy ───────────────────────────────────────
        let proxy_config = match self.parse_proxy_request(request).await {
            Ok(config) => config,
            Err(()) => return Ok(ValidationOutcome::Halted),
        };
        let connector = match build_http_client(proxy_config.as_ref()) {
            Ok(client) => client,
            Err(InstallerError::InvalidProxy(reason)) => {
                warn!("Proxy could not be created: {}", reason);
                self.prompt
                    .notify(
                        "This proxy appears to be invalid! Check that you have entered the \
                         host and port correctly.",
                    )
                    .await;
                return Ok(ValidationOutcome::Halted);
            }
            Err(other) => return Err(other),
        };
        {
            let mut guard = self.settings.lock().await;
            guard.proxy = proxy_config.clone();
            guard.connector = Some(connector.clone());
        }

        info!("Validation succeeded!");

        // ── Durable settings at the phase boundary ──────
        self.properties.set_destination(&destination);
        self.properties.set_proxy(proxy_config);
        if let Err(e) = self.properties.save() {
            warn!("Could not persist user properties: {}", e);
        }

        let fetcher: Arc<dyn Fetch> = match &self.fetcher {
            Some(fetcher) => Arc::clone(fetcher),
            None => Arc::new(HttpFetcher::from_client(connector)),
        };

        // ── Remote discovery ────────────────────────────
        let already_resolved = { self.settings.lock().await.remote_version.is_some() };
        if !already_resolved {
            info!("Checking installer version...");
            info!("This version is {}", self.profile.installer_version);

            let resolver = ManifestResolver::new(fetcher.as_ref(), &self.profile.mirror_urls);
            if let Err(error) = resolver.resolve(&self.settings, token).await {
                if matches!(error, InstallerError::Cancelled) {
                    self.rollback_remote_discovery().await;
                }
                return Err(error);
            }

            let resolved = {
                let guard = self.settings.lock().await;
                guard
                    .remote_version
                    .clone()
                    .zip(guard.download_page_url.clone())
            };
            let Some((remote_version, download_page)) = resolved else {
                return Err(InstallerError::NoMirrors);
            };

            // Re-offered on every run until the installer is upgraded: the
            // remote-version guard only suppresses it within a single run.
            if compare_versions(&remote_version, &self.profile.installer_version)
                == Ordering::Greater
            {
                info!("Installer is out-of-date; prompting user to download new version...");
                let accepted = self
                    .prompt
                    .confirm(
                        "This version of the installer is out-of-date. Would you like to \
                         bring up the download page for the most recent version?\n\n(If you \
                         answer Yes, the program will exit.)",
                    )
                    .await;
                if accepted {
                    return Ok(ValidationOutcome::Upgrade { download_page });
                }
            }
        }

        if token.is_cancelled() {
            self.rollback_remote_discovery().await;
            return Err(InstallerError::Cancelled);
        }

        // ── Catalog build ───────────────────────────────
        let needs_catalog = { self.settings.lock().await.mod_nodes.is_none() };
        if needs_catalog {
            info!("Downloading mod information...");
            let urls = {
                self.settings
                    .lock()
                    .await
                    .mod_urls
                    .clone()
                    .unwrap_or_default()
            };

            let builder = ModTreeBuilder::new(fetcher.as_ref(), self.parser.as_ref());
            match builder.build(&urls, token).await {
                Ok(nodes) => {
                    self.settings.lock().await.mod_nodes = Some(nodes);
                }
                Err(error) => {
                    if matches!(error, InstallerError::Cancelled) {
                        self.rollback_mod_tree().await;
                    }
                    return Err(error);
                }
            }
        }

        if token.is_cancelled() {
            self.rollback_mod_tree().await;
            return Err(InstallerError::Cancelled);
        }

        // ── Legacy ledger ───────────────────────────────
        info!("Checking for legacy version information...");
        let catalog = {
            self.settings
                .lock()
                .await
                .mod_nodes
                .clone()
                .unwrap_or_default()
        };
        run_legacy_migration(&destination, &catalog, &mut self.properties).await?;

        // Final interruption check for this task; nothing left to roll back.
        ensure_active(token)?;

        info!("Done with setup validation!");
        Ok(ValidationOutcome::Ready)
    }

    /// Check the destination text and create the directory on request.
    /// `None` means the attempt was halted (the user was told why).
    async fn prepare_destination(&self, text: &str) -> InstallerResult<Option<PathBuf>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.prompt
                .notify(
                    "The destination directory is not valid. Please select another directory.",
                )
                .await;
            return Ok(None);
        }

        let destination = PathBuf::from(trimmed);
        if !destination.exists() {
            let create = self
                .prompt
                .confirm(
                    "The destination directory does not exist. Do you want to create it?",
                )
                .await;
            if !create {
                return Ok(None);
            }

            info!("Attempting to create directory/ies...");
            if let Err(e) = tokio::fs::create_dir_all(&destination).await {
                warn!("Could not create {:?}: {}", destination, e);
                self.prompt
                    .notify(
                        "Could not create the destination directory. Please select another \
                         directory.",
                    )
                    .await;
                return Ok(None);
            }
            info!("Directory creation successful.");
        }

        Ok(Some(destination))
    }

    /// Parse the submitted proxy fields. `Err(())` means the user was
    /// notified and the run halts.
    async fn parse_proxy_request(&self, request: &SetupRequest) -> Result<Option<ProxyConfig>, ()> {
        let Some(proxy) = &request.proxy else {
            return Ok(None);
        };

        info!("Checking proxy...");
        let Ok(port) = proxy.port.trim().parse::<u16>() else {
            self.prompt
                .notify(
                    "The proxy port could not be parsed as an integer. Please enter a \
                     correct proxy port.",
                )
                .await;
            return Err(());
        };

        Ok(Some(ProxyConfig {
            host: proxy.host.trim().to_string(),
            port,
        }))
    }

    async fn rollback_remote_discovery(&self) {
        info!("Rolling back remote discovery");
        self.settings.lock().await.rollback_remote_discovery();
    }

    async fn rollback_mod_tree(&self) {
        info!("Rolling back catalog build");
        self.settings.lock().await.rollback_mod_tree();
    }
}
