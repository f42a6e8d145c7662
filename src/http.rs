use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;

use crate::error::{InstallerError, InstallerResult};
use crate::profile::ProxyConfig;

const APP_USER_AGENT: &str = "Modhaven/0.1.0";

/// Build the HTTP client for this run, routed through `proxy` when one is
/// configured.
pub fn build_http_client(proxy: Option<&ProxyConfig>) -> InstallerResult<Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    let mut builder = Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers);

    if let Some(proxy) = proxy {
        if proxy.host.trim().is_empty() {
            return Err(InstallerError::InvalidProxy("empty host".into()));
        }
        let proxy_url = format!("http://{}:{}", proxy.host, proxy.port);
        let proxy = reqwest::Proxy::all(&proxy_url)
            .map_err(|e| InstallerError::InvalidProxy(e.to_string()))?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(InstallerError::Http)
}
