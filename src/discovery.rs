//! Discovery of new onion addresses from a public index service.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::error::Result;

/// v2 addresses are 16 base32 characters, v3 are 56.
const ONION_ADDRESS_PATTERN: &str = r"\b[a-z2-7]{16}(?:[a-z2-7]{40})?\.onion\b";

/// Source of new candidate addresses.
#[async_trait]
pub trait Discovery: Send + Sync {
    /// Query the index and return a deduplicated set of URLs.
    ///
    /// Transport and parse failures are recoverable: they are logged and
    /// yield an empty set, so a failed discovery costs one cycle zero new
    /// sites and nothing else.
    async fn discover(&self) -> HashSet<String>;
}

/// Discovery backed by a clearnet index search endpoint.
pub struct IndexDiscovery {
    client: Client,
    endpoint: String,
    query: String,
    pattern: Regex,
}

impl IndexDiscovery {
    pub fn new(endpoint: &str, query: &str, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            query: query.to_string(),
            // Pattern is a constant; a compile failure is a programmer error.
            pattern: Regex::new(ONION_ADDRESS_PATTERN).expect("invalid onion address pattern"),
        })
    }

    async fn search(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", self.query.as_str())])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    /// Extract onion URLs from an index results page.
    ///
    /// Addresses are pulled out of anchor hrefs by pattern, not by link
    /// structure, so redirect-style index links still yield the target
    /// address.
    fn extract_addresses(&self, html: &str) -> HashSet<String> {
        let document = Html::parse_document(html);
        // Static selector, same reasoning as the address pattern.
        let anchors = Selector::parse("a[href]").expect("invalid anchor selector");

        let mut found = HashSet::new();
        for element in document.select(&anchors) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            for m in self.pattern.find_iter(href) {
                found.insert(format!("http://{}", m.as_str()));
            }
        }
        found
    }
}

#[async_trait]
impl Discovery for IndexDiscovery {
    async fn discover(&self) -> HashSet<String> {
        let html = match self.search().await {
            Ok(html) => html,
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "Index search failed");
                return HashSet::new();
            }
        };

        let found = self.extract_addresses(&html);
        info!(query = %self.query, count = found.len(), "Discovery finished");
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovery() -> IndexDiscovery {
        IndexDiscovery::new("https://index.example/search/", "market", "Mozilla/5.0").unwrap()
    }

    #[test]
    fn test_extracts_addresses_from_hrefs() {
        let html = r#"
            <html><body>
              <a href="http://aaaabbbbccccdddd.onion/listing">one</a>
              <a href="/redirect?url=http://aaaabbbbccccdddd.onion/other">dup</a>
              <a href="https://clearnet.example/about">not onion</a>
            </body></html>
        "#;
        let found = discovery().extract_addresses(html);
        assert_eq!(found.len(), 1);
        assert!(found.contains("http://aaaabbbbccccdddd.onion"));
    }

    #[test]
    fn test_extracts_v3_addresses() {
        let addr = "a".repeat(56);
        let html = format!(r#"<a href="http://{addr}.onion/">v3</a>"#);
        let found = discovery().extract_addresses(&html);
        assert!(found.contains(&format!("http://{addr}.onion")));
    }

    #[test]
    fn test_rejects_wrong_length_addresses() {
        // 20 characters is neither a v2 nor a v3 address.
        let html = r#"<a href="http://aaaabbbbccccddddeeee.onion/">bad</a>"#;
        let found = discovery().extract_addresses(html);
        assert!(found.is_empty());
    }

    #[test]
    fn test_no_anchors_yields_empty_set() {
        let found = discovery().extract_addresses("<html><body>nothing here</body></html>");
        assert!(found.is_empty());
    }
}
