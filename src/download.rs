// ─── Downloads ───
// The network fetch-to-file contract consumed by the pipeline, and its
// reqwest-backed implementation.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{InstallerError, InstallerResult};
use crate::http::build_http_client;
use crate::profile::ProxyConfig;

/// Abstract fetch-to-file capability. The pipeline only depends on this
/// success/failure contract; transport details stay behind it.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> InstallerResult<()>;
}

/// SHA-1 validating, reqwest-backed downloader.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(proxy: Option<&ProxyConfig>) -> InstallerResult<Self> {
        Ok(Self {
            client: build_http_client(proxy)?,
        })
    }

    /// Wrap an already-built (proxy-aware) client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Download a single file to `dest`, optionally validating SHA-1.
    ///
    /// Creates parent directories as needed. Drops the file handle
    /// immediately after writing to avoid Windows OS Error 5.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
    ) -> InstallerResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InstallerError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstallerError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;

        // Validate before writing (compute on the in-memory buffer)
        if let Some(expected) = sha1_expected {
            let mut hasher = Sha1::new();
            hasher.update(&bytes);
            let actual = hex::encode(hasher.finalize());
            if actual != expected {
                return Err(InstallerError::Sha1Mismatch {
                    path: dest.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        // Write inside a block to ensure the handle is dropped immediately
        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| InstallerError::Io {
                    path: dest.to_path_buf(),
                    source: e,
                })?;
            file.write_all(&bytes)
                .await
                .map_err(|e| InstallerError::Io {
                    path: dest.to_path_buf(),
                    source: e,
                })?;
            file.flush().await.map_err(|e| InstallerError::Io {
                path: dest.to_path_buf(),
                source: e,
            })?;
        }

        debug!(
            "Downloaded: {} -> {:?} ({})",
            url,
            dest,
            human_readable_bytes(bytes.len() as u64)
        );
        Ok(())
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> InstallerResult<()> {
        self.download_file(url, dest, None).await
    }
}

/// Read a text file into trimmed, non-blank lines.
pub(crate) async fn read_trimmed_lines(path: &Path) -> InstallerResult<Vec<String>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| InstallerError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Print a byte count in binary units for progress display.
pub fn human_readable_bytes(bytes: u64) -> String {
    const UNIT: f64 = 1024.0;
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let exp = ((bytes as f64).ln() / UNIT.ln()) as i32;
    let prefixes = ['K', 'M', 'G', 'T', 'P', 'E'];
    let prefix = prefixes[(exp - 1) as usize];
    format!("{:.1} {}iB", bytes as f64 / UNIT.powi(exp), prefix)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use tokio_util::sync::CancellationToken;

    use super::*;

    /// In-memory [`Fetch`] fake: canned bodies per URL, scripted failures,
    /// and an optional URL that cancels the run mid-fetch.
    pub struct FakeFetcher {
        routes: HashMap<String, String>,
        failures: HashSet<String>,
        cancel_on: Option<(String, CancellationToken)>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self {
                routes: HashMap::new(),
                failures: HashSet::new(),
                cancel_on: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn route(mut self, url: &str, body: &str) -> Self {
            self.routes.insert(url.to_string(), body.to_string());
            self
        }

        pub fn failing(mut self, url: &str) -> Self {
            self.failures.insert(url.to_string());
            self
        }

        /// When `url` is requested, cancel `token` and fail the fetch, as an
        /// aborted in-flight transfer would.
        pub fn cancelling(mut self, url: &str, token: CancellationToken) -> Self {
            self.cancel_on = Some((url.to_string(), token));
            self
        }

        pub fn requested(&self, url: &str) -> bool {
            self.calls.lock().unwrap().iter().any(|u| u == url)
        }
    }

    #[async_trait]
    impl Fetch for FakeFetcher {
        async fn fetch(&self, url: &str, dest: &Path) -> InstallerResult<()> {
            self.calls.lock().unwrap().push(url.to_string());

            if let Some((cancel_url, token)) = &self.cancel_on {
                if cancel_url == url {
                    token.cancel();
                    return Err(InstallerError::DownloadFailed {
                        url: url.to_string(),
                        status: 499,
                    });
                }
            }
            if self.failures.contains(url) {
                return Err(InstallerError::DownloadFailed {
                    url: url.to_string(),
                    status: 500,
                });
            }
            match self.routes.get(url) {
                Some(body) => {
                    tokio::fs::write(dest, body)
                        .await
                        .map_err(|e| InstallerError::Io {
                            path: dest.to_path_buf(),
                            source: e,
                        })?;
                    Ok(())
                }
                None => Err(InstallerError::DownloadFailed {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }
}
