//! Mail alert channel via an HTTP mail gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::AlertChannel;
use crate::error::{MonitorError, Result};

#[derive(Debug, Serialize)]
struct MailMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: String,
    text: String,
}

/// Sends alerts as email through a gateway's send endpoint.
pub struct MailChannel {
    client: Client,
    endpoint: String,
    from: String,
    to: String,
}

impl MailChannel {
    pub fn new(endpoint: &str, from: &str, to: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

#[async_trait]
impl AlertChannel for MailChannel {
    fn name(&self) -> &'static str {
        "mail"
    }

    async fn send(&self, url: &str, summary: &str) -> Result<()> {
        let message = MailMessage {
            from: &self.from,
            to: &self.to,
            subject: format!("Negative finding: {url}"),
            text: format!("Negative content detected.\n\nURL: {url}\nAnalysis: {summary}\n"),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MonitorError::Alert(format!(
                "mail gateway returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
