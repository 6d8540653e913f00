use std::{net::SocketAddr, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::instrument;

use super::NO_URL_SENTINEL;

pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(2);

/// Base URL under which a relay listening on `addr` is reachable from this machine. A wildcard
/// listen address is reached through `localhost`.
pub fn local_relay_url(addr: SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        format!("http://localhost:{}", addr.port())
    } else {
        format!("http://{addr}")
    }
}

/// Source of the URL currently open in the browser.
#[async_trait]
pub trait UrlSource: Send + Sync {
    /// `Ok(None)` means the relay answered but has nothing to report. `Err` means it couldn't be
    /// reached.
    async fn current_url(&self) -> Result<Option<String>>;
}

/// Reads the URL from a relay over HTTP.
pub struct HttpUrlSource {
    client: reqwest::Client,
    get_url: String,
}

impl HttpUrlSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            get_url: format!("{}/get_url", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl UrlSource for HttpUrlSource {
    #[instrument(skip(self), fields(endpoint = %self.get_url))]
    async fn current_url(&self) -> Result<Option<String>> {
        let response = self.client.get(&self.get_url).send().await?;
        if response.status() != StatusCode::OK {
            return Ok(None);
        }
        let body = response.text().await?;
        let body = body.trim();
        if body.is_empty() || body == NO_URL_SENTINEL {
            Ok(None)
        } else {
            Ok(Some(body.to_string()))
        }
    }
}
