use std::cmp::Ordering;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::download::{read_trimmed_lines, Fetch};
use crate::error::{InstallerError, InstallerResult};
use crate::settings::SharedSettings;
use crate::task::ensure_active;
use crate::version::compare_versions;

/// Baseline no mirror can lose to.
const FLOOR_VERSION: &str = "0.0.0.0";

/// Sweeps the mirror list for the newest remote release.
///
/// Per mirror, in list order: `version.txt` names the release (line 1) and
/// the canonical download page (line 2); `filenames.txt` lists one
/// package-manifest URL per line; `basic_config.txt` optionally presets
/// package names. A mirror only becomes the winner after its filenames
/// document downloads successfully and non-empty; a higher version with a
/// failed filenames fetch never displaces the previous winner.
pub struct ManifestResolver<'a> {
    fetcher: &'a dyn Fetch,
    mirrors: &'a [String],
}

impl<'a> ManifestResolver<'a> {
    pub fn new(fetcher: &'a dyn Fetch, mirrors: &'a [String]) -> Self {
        Self { fetcher, mirrors }
    }

    /// Record the winning mirror's version, download page, manifest URL list,
    /// and basic configuration in `settings`. The remote version is written
    /// last: its presence is the phase's "already succeeded" guard.
    ///
    /// A mirror that fails is skipped; cancellation observed at any fetch
    /// boundary aborts the whole sweep with [`InstallerError::Cancelled`]
    /// (the caller rolls the phase back). Whether any mirror yielded a
    /// version is for the caller to check.
    pub async fn resolve(
        &self,
        settings: &SharedSettings,
        token: &CancellationToken,
    ) -> InstallerResult<()> {
        let temp_dir = tempfile::tempdir().map_err(|e| InstallerError::Io {
            path: std::env::temp_dir(),
            source: e,
        })?;
        let version_path = temp_dir.path().join("version.txt");
        let filenames_path = temp_dir.path().join("filenames.txt");
        let basic_path = temp_dir.path().join("basic_config.txt");

        let mut best_version = FLOOR_VERSION.to_string();

        for mirror in self.mirrors {
            ensure_active(token)?;

            let base = mirror.trim_end_matches('/');
            debug!("Accessing version info from {}...", base);

            if let Err(e) = self
                .fetcher
                .fetch(&format!("{base}/version.txt"), &version_path)
                .await
            {
                ensure_active(token)?;
                debug!("Mirror {} has no version information: {}", base, e);
                continue;
            }

            let version_lines = read_trimmed_lines(&version_path).await.unwrap_or_default();
            let Some(this_version) = version_lines.first().cloned() else {
                continue;
            };
            info!("Version at {} is {}", base, this_version);

            if compare_versions(&this_version, &best_version) != Ordering::Greater {
                continue;
            }
            let Some(download_page) = version_lines.get(1).cloned() else {
                warn!("Version document at {} is missing its download page line", base);
                continue;
            };

            if let Err(e) = self
                .fetcher
                .fetch(&format!("{base}/filenames.txt"), &filenames_path)
                .await
            {
                ensure_active(token)?;
                // The previous winner stays in place.
                warn!("Could not download the manifest list from {}: {}", base, e);
                continue;
            }
            let filename_lines = read_trimmed_lines(&filenames_path).await.unwrap_or_default();
            if filename_lines.is_empty() {
                continue;
            }

            best_version = this_version.clone();

            // Basic configuration is optional (sort of).
            let mut basic_lines = None;
            match self
                .fetcher
                .fetch(&format!("{base}/basic_config.txt"), &basic_path)
                .await
            {
                Ok(()) => {
                    let lines = read_trimmed_lines(&basic_path).await.unwrap_or_default();
                    if !lines.is_empty() {
                        basic_lines = Some(lines);
                    }
                }
                Err(e) => {
                    ensure_active(token)?;
                    debug!("No basic configuration at {}: {}", base, e);
                }
            }

            let mut guard = settings.lock().await;
            if let Some(lines) = basic_lines {
                guard.basic_config = Some(lines);
            }
            guard.mod_urls = Some(filename_lines);
            guard.download_page_url = Some(download_page);
            guard.remote_version = Some(this_version);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::testing::FakeFetcher;
    use crate::settings::new_shared_settings;

    fn mirrors(bases: &[&str]) -> Vec<String> {
        bases.iter().map(|b| b.to_string()).collect()
    }

    #[tokio::test]
    async fn highest_confirmed_version_wins() {
        let fetcher = FakeFetcher::new()
            .route("https://one.example.com/version.txt", "1.0\nhttps://one.example.com/get")
            .route("https://one.example.com/filenames.txt", "https://one.example.com/a.json")
            .route("https://two.example.com/version.txt", "2.0\nhttps://two.example.com/get")
            .route(
                "https://two.example.com/filenames.txt",
                "https://two.example.com/a.json\nhttps://two.example.com/b.json",
            )
            .route("https://three.example.com/version.txt", "1.5\nhttps://three.example.com/get")
            .failing("https://three.example.com/filenames.txt");
        let mirror_list = mirrors(&[
            "https://one.example.com/",
            "https://two.example.com/",
            "https://three.example.com/",
        ]);
        let settings = new_shared_settings();
        let token = CancellationToken::new();

        ManifestResolver::new(&fetcher, &mirror_list)
            .resolve(&settings, &token)
            .await
            .unwrap();

        let guard = settings.lock().await;
        assert_eq!(guard.remote_version.as_deref(), Some("2.0"));
        assert_eq!(
            guard.download_page_url.as_deref(),
            Some("https://two.example.com/get")
        );
        assert_eq!(guard.mod_urls.as_ref().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn partial_win_never_overwrites_a_confirmed_winner() {
        // The second mirror advertises a newer version but its filenames
        // document is unavailable; the first mirror must stay the winner.
        let fetcher = FakeFetcher::new()
            .route("https://one.example.com/version.txt", "2.0\nhttps://one.example.com/get")
            .route("https://one.example.com/filenames.txt", "https://one.example.com/a.json")
            .route("https://two.example.com/version.txt", "3.0\nhttps://two.example.com/get")
            .failing("https://two.example.com/filenames.txt");
        let mirror_list = mirrors(&["https://one.example.com/", "https://two.example.com/"]);
        let settings = new_shared_settings();
        let token = CancellationToken::new();

        ManifestResolver::new(&fetcher, &mirror_list)
            .resolve(&settings, &token)
            .await
            .unwrap();

        let guard = settings.lock().await;
        assert_eq!(guard.remote_version.as_deref(), Some("2.0"));
        assert_eq!(
            guard.mod_urls.as_ref().unwrap()[0],
            "https://one.example.com/a.json"
        );
    }

    #[tokio::test]
    async fn unreachable_mirrors_leave_nothing_recorded() {
        let fetcher = FakeFetcher::new()
            .failing("https://one.example.com/version.txt")
            .failing("https://two.example.com/version.txt");
        let mirror_list = mirrors(&["https://one.example.com/", "https://two.example.com/"]);
        let settings = new_shared_settings();
        let token = CancellationToken::new();

        ManifestResolver::new(&fetcher, &mirror_list)
            .resolve(&settings, &token)
            .await
            .unwrap();

        assert!(settings.lock().await.remote_version.is_none());
    }

    #[tokio::test]
    async fn basic_config_failure_is_not_fatal() {
        let fetcher = FakeFetcher::new()
            .route("https://one.example.com/version.txt", "1.0\nhttps://one.example.com/get")
            .route("https://one.example.com/filenames.txt", "https://one.example.com/a.json")
            .failing("https://one.example.com/basic_config.txt");
        let mirror_list = mirrors(&["https://one.example.com/"]);
        let settings = new_shared_settings();
        let token = CancellationToken::new();

        ManifestResolver::new(&fetcher, &mirror_list)
            .resolve(&settings, &token)
            .await
            .unwrap();

        let guard = settings.lock().await;
        assert_eq!(guard.remote_version.as_deref(), Some("1.0"));
        assert!(guard.basic_config.is_none());
    }

    #[tokio::test]
    async fn basic_config_blank_lines_are_stripped() {
        let fetcher = FakeFetcher::new()
            .route("https://one.example.com/version.txt", "1.0\nhttps://one.example.com/get")
            .route("https://one.example.com/filenames.txt", "https://one.example.com/a.json")
            .route("https://one.example.com/basic_config.txt", "Alpha\n\n  \nBeta\n");
        let mirror_list = mirrors(&["https://one.example.com/"]);
        let settings = new_shared_settings();
        let token = CancellationToken::new();

        ManifestResolver::new(&fetcher, &mirror_list)
            .resolve(&settings, &token)
            .await
            .unwrap();

        assert_eq!(
            settings.lock().await.basic_config.as_ref().unwrap(),
            &vec!["Alpha".to_string(), "Beta".to_string()]
        );
    }

    #[tokio::test]
    async fn cancellation_mid_sweep_aborts_the_resolver() {
        let token = CancellationToken::new();
        let fetcher = FakeFetcher::new()
            .cancelling("https://one.example.com/version.txt", token.clone());
        let mirror_list = mirrors(&["https://one.example.com/", "https://two.example.com/"]);
        let settings = new_shared_settings();

        let result = ManifestResolver::new(&fetcher, &mirror_list)
            .resolve(&settings, &token)
            .await;

        assert!(matches!(result, Err(InstallerError::Cancelled)));
        // The second mirror was never contacted.
        assert!(!fetcher.requested("https://two.example.com/version.txt"));
    }
}
