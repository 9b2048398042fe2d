//! Concurrent page retrieval through the proxy transport.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::models::FetchOutcome;
use crate::transport::Transport;

/// Fetches every known URL in one concurrent burst.
///
/// One request per URL, each bounded by the per-url timeout; failures are
/// captured per URL and never abort sibling requests. There is no cap on
/// in-flight requests and no retry.
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Fetch all URLs concurrently and join the results.
    ///
    /// Returns exactly one entry per input URL, marked `Fetched` or
    /// `Failed`. The call completes only once every request has finished
    /// or timed out; no partial results are released early.
    pub async fn fetch_all(&self, urls: &[String]) -> HashMap<String, FetchOutcome> {
        let tasks = urls.iter().map(|url| {
            let transport = self.transport.clone();
            let url = url.clone();
            let per_url_timeout = self.timeout;
            async move {
                let outcome =
                    match tokio::time::timeout(per_url_timeout, transport.fetch_text(&url)).await {
                        Ok(Ok(text)) => {
                            debug!(url = %url, bytes = text.len(), "Fetched");
                            FetchOutcome::Fetched(text)
                        }
                        Ok(Err(e)) => {
                            warn!(url = %url, error = %e, "Fetch failed");
                            FetchOutcome::Failed(e.to_string())
                        }
                        Err(_) => {
                            warn!(url = %url, timeout_secs = per_url_timeout.as_secs(), "Fetch timed out");
                            FetchOutcome::Failed("timed out".to_string())
                        }
                    };
                (url, outcome)
            }
        });

        join_all(tasks).await.into_iter().collect()
    }
}
