//! Alert dispatch for negative findings.

mod mail;
mod webhook;

pub use mail::MailChannel;
pub use webhook::WebhookChannel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::Analysis;

/// One outbound notification channel.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Short channel name used in logs.
    fn name(&self) -> &'static str;

    /// Deliver one alert.
    async fn send(&self, url: &str, summary: &str) -> Result<()>;
}

/// Alert channel configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Mail gateway endpoint; the channel is disabled when unset.
    #[serde(default)]
    pub mail_endpoint: Option<String>,
    /// Sender address for mail alerts.
    #[serde(default)]
    pub mail_from: Option<String>,
    /// Recipient address for mail alerts.
    #[serde(default)]
    pub mail_to: Option<String>,
    /// Chat webhook URL; the channel is disabled when unset.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Fans one alert out to every configured channel.
///
/// Channel failures are isolated: a failed channel is logged and never
/// prevents the remaining channels from firing, and never fails the
/// monitoring cycle that raised the alert.
pub struct AlertDispatcher {
    channels: Vec<Box<dyn AlertChannel>>,
}

impl AlertDispatcher {
    pub fn new(channels: Vec<Box<dyn AlertChannel>>) -> Self {
        Self { channels }
    }

    /// Build the dispatcher from configuration.
    ///
    /// Unconfigured channels are skipped; running with zero channels is
    /// allowed (alerts are then log-only).
    pub fn from_config(config: &AlertConfig) -> Result<Self> {
        let mut channels: Vec<Box<dyn AlertChannel>> = Vec::new();

        if let (Some(endpoint), Some(from), Some(to)) = (
            config.mail_endpoint.as_deref(),
            config.mail_from.as_deref(),
            config.mail_to.as_deref(),
        ) {
            channels.push(Box::new(MailChannel::new(endpoint, from, to)?));
        }
        if let Some(url) = config.webhook_url.as_deref() {
            channels.push(Box::new(WebhookChannel::new(url)?));
        }

        if channels.is_empty() {
            warn!("No alert channels configured; negative findings will only be logged");
        }
        Ok(Self::new(channels))
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Notify every channel about a negative finding.
    pub async fn notify(&self, url: &str, analysis: &Analysis) {
        let summary = analysis.summary();
        info!(url = %url, summary = %summary, "Dispatching alert");

        for channel in &self.channels {
            if let Err(e) = channel.send(url, &summary).await {
                warn!(channel = channel.name(), url = %url, error = %e, "Alert channel failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingChannel {
        sent: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl AlertChannel for CountingChannel {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn send(&self, _url: &str, _summary: &str) -> Result<()> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(crate::error::MonitorError::Alert("channel down".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_failed_channel_does_not_block_sibling() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let dispatcher = AlertDispatcher::new(vec![
            Box::new(CountingChannel {
                sent: first.clone(),
                fail: true,
            }),
            Box::new(CountingChannel {
                sent: second.clone(),
                fail: false,
            }),
        ]);

        let analysis = Analysis::new("NEGATIVE", 0.9, "sst-2");
        dispatcher.notify("http://abc123.onion", &analysis).await;

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_dispatcher_is_allowed() {
        let dispatcher = AlertDispatcher::new(vec![]);
        let analysis = Analysis::new("NEGATIVE", 0.9, "sst-2");
        dispatcher.notify("http://abc123.onion", &analysis).await;
        assert_eq!(dispatcher.channel_count(), 0);
    }

    #[test]
    fn test_from_config_skips_unconfigured_channels() {
        let dispatcher = AlertDispatcher::from_config(&AlertConfig {
            webhook_url: Some("https://chat.example.com/hook".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(dispatcher.channel_count(), 1);
    }

    #[test]
    fn test_from_config_builds_both_channels() {
        let dispatcher = AlertDispatcher::from_config(&AlertConfig {
            mail_endpoint: Some("https://mail.example.com/send".to_string()),
            mail_from: Some("watch@example.com".to_string()),
            mail_to: Some("ops@example.com".to_string()),
            webhook_url: Some("https://chat.example.com/hook".to_string()),
        })
        .unwrap();
        assert_eq!(dispatcher.channel_count(), 2);
    }
}
