//! Chat webhook alert channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::AlertChannel;
use crate::error::{MonitorError, Result};

/// Posts alerts to a chat webhook as a simple text payload.
pub struct WebhookChannel {
    client: Client,
    url: String,
}

impl WebhookChannel {
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl AlertChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, url: &str, summary: &str) -> Result<()> {
        let payload = json!({
            "text": format!("Negative finding at {url}\n{summary}"),
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MonitorError::Alert(format!(
                "webhook returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
