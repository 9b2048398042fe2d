//! Client for the local text-classification inference API.
//!
//! Classification and NER run on a pre-trained model served by a local
//! inference server; this client talks to it over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{truncate_for_model, Analyzer};
use crate::error::{MonitorError, Result};
use crate::models::{Analysis, Entity};

/// Configuration for the inference API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Inference API endpoint (default: http://localhost:8500)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Sentiment classification model.
    #[serde(default = "default_sentiment_model")]
    pub sentiment_model: String,
    /// Named entity recognition model.
    #[serde(default = "default_ner_model")]
    pub ner_model: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://localhost:8500".to_string()
}
fn default_sentiment_model() -> String {
    "distilbert-base-uncased-finetuned-sst-2-english".to_string()
}
fn default_ner_model() -> String {
    "dbmdz/bert-large-cased-finetuned-conll03-english".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            sentiment_model: default_sentiment_model(),
            ner_model: default_ner_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Classification request format.
#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    model: &'a str,
    text: &'a str,
}

/// Classification response: the model's top label.
#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    label: String,
    score: f64,
}

/// NER request format. Grouped spans merge word pieces into entities.
#[derive(Debug, Serialize)]
struct NerRequest<'a> {
    model: &'a str,
    text: &'a str,
    grouped: bool,
}

/// One grouped entity span from the NER model.
#[derive(Debug, Deserialize)]
struct NerSpan {
    word: String,
    entity_group: String,
}

/// HTTP client for the inference API.
pub struct InferenceClient {
    config: InferenceConfig,
    client: Client,
}

impl InferenceClient {
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Analyzer for InferenceClient {
    async fn classify(&self, text: &str) -> Result<Analysis> {
        let text = truncate_for_model(text);
        let url = format!("{}/classify", self.config.endpoint);

        let response = self
            .client
            .post(&url)
            .json(&ClassifyRequest {
                model: &self.config.sentiment_model,
                text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MonitorError::Inference(format!(
                "classify returned {}",
                response.status()
            )));
        }

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| MonitorError::Inference(format!("unusable classify response: {e}")))?;

        debug!(label = %parsed.label, score = parsed.score, "Classified page");
        Ok(Analysis::new(
            parsed.label,
            parsed.score,
            self.config.sentiment_model.as_str(),
        ))
    }

    async fn extract_entities(&self, text: &str) -> Result<Vec<Entity>> {
        let text = truncate_for_model(text);
        let url = format!("{}/ner", self.config.endpoint);

        let response = self
            .client
            .post(&url)
            .json(&NerRequest {
                model: &self.config.ner_model,
                text,
                grouped: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MonitorError::Inference(format!(
                "ner returned {}",
                response.status()
            )));
        }

        let spans: Vec<NerSpan> = response
            .json()
            .await
            .map_err(|e| MonitorError::Inference(format!("unusable ner response: {e}")))?;

        Ok(spans
            .into_iter()
            .map(|span| Entity {
                text: span.word,
                category: span.entity_group,
            })
            .collect())
    }
}
