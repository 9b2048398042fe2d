//! HTTP transport routed through the local anonymizing proxy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Proxy};
use tracing::{debug, info};

use crate::error::Result;

/// Outbound page retrieval boundary.
///
/// The monitoring loop and the fetcher only see this trait; tests inject
/// stub implementations instead of a live proxy.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a page and return its body as text.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// HTTP client that sends every request through a SOCKS proxy.
#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
    control_client: Client,
    control_endpoint: String,
}

impl ProxyClient {
    /// Create a proxied client.
    ///
    /// `socks_proxy` should use the `socks5h` scheme so hostname
    /// resolution happens on the proxy side; resolving .onion names
    /// locally leaks them to the system resolver.
    pub fn new(
        socks_proxy: &str,
        control_endpoint: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .proxy(Proxy::all(socks_proxy)?)
            .build()?;

        // The control port is a local listener and must not go through
        // the proxy itself.
        let control_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            control_client,
            control_endpoint: control_endpoint.to_string(),
        })
    }

    /// Request a fresh circuit from the proxy's control endpoint.
    pub async fn rotate_identity(&self) -> Result<()> {
        self.control_client
            .post(&self.control_endpoint)
            .send()
            .await?
            .error_for_status()?;
        info!("Requested new proxy identity");
        Ok(())
    }
}

#[async_trait]
impl Transport for ProxyClient {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!(url = %url, "Fetching through proxy");
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_client_builds() {
        let client = ProxyClient::new(
            "socks5h://127.0.0.1:9050",
            "http://127.0.0.1:9051/control/newnym",
            Duration::from_secs(15),
            "Mozilla/5.0",
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_proxy_url_is_rejected() {
        let client = ProxyClient::new(
            "not a proxy url",
            "http://127.0.0.1:9051/control/newnym",
            Duration::from_secs(15),
            "Mozilla/5.0",
        );
        assert!(client.is_err());
    }
}
