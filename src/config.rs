//! Configuration management for onionwatch.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::alerts::AlertConfig;
use crate::analyzer::InferenceConfig;

/// Default interval between scheduled scan cycles (24 hours).
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 86_400;

/// Default per-request timeout for onion page fetches, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename.
    pub database_filename: String,
    /// Path the report export is written to.
    pub report_path: PathBuf,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// SOCKS proxy all onion fetches are routed through.
    pub socks_proxy: String,
    /// Control endpoint accepting circuit-rotation requests.
    pub control_endpoint: String,
    /// Public index search endpoint used for site discovery.
    pub index_endpoint: String,
    /// Query term submitted to the index.
    pub index_query: String,
    /// Per-url fetch timeout in seconds.
    pub fetch_timeout: u64,
    /// Seconds between scheduled scan cycles.
    pub scan_interval: u64,
    /// Bearer token required by mutating dashboard routes (None = open).
    pub dashboard_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("onionwatch");

        Self {
            report_path: data_dir.join("report.txt"),
            data_dir,
            database_filename: "onionwatch.db".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            socks_proxy: "socks5h://127.0.0.1:9050".to_string(),
            control_endpoint: "http://127.0.0.1:9051/control/newnym".to_string(),
            index_endpoint: "https://ahmia.fi/search/".to_string(),
            index_query: "market".to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT_SECS,
            scan_interval: DEFAULT_SCAN_INTERVAL_SECS,
            dashboard_token: None,
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            report_path: data_dir.join("report.txt"),
            data_dir,
            ..Default::default()
        }
    }

    /// Get the full path to the database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Target directory for data.
    #[serde(default)]
    pub target: Option<String>,
    /// Database filename.
    #[serde(default)]
    pub database: Option<String>,
    /// Report export path.
    #[serde(default)]
    pub report_path: Option<String>,
    /// User agent string.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// SOCKS proxy URL, e.g. "socks5h://127.0.0.1:9050".
    #[serde(default)]
    pub socks_proxy: Option<String>,
    /// Circuit-rotation control endpoint.
    #[serde(default)]
    pub control_endpoint: Option<String>,
    /// Index search endpoint.
    #[serde(default)]
    pub index_endpoint: Option<String>,
    /// Query term submitted to the index.
    #[serde(default)]
    pub index_query: Option<String>,
    /// Per-url fetch timeout in seconds.
    #[serde(default)]
    pub fetch_timeout: Option<u64>,
    /// Seconds between scheduled scan cycles.
    #[serde(default)]
    pub scan_interval: Option<u64>,
    /// Bearer token for mutating dashboard routes.
    #[serde(default)]
    pub dashboard_token: Option<String>,
    /// Inference API configuration for classification and NER.
    #[serde(default)]
    pub inference: InferenceConfig,
    /// Alert channel configuration.
    #[serde(default)]
    pub alerts: AlertConfig,
}

impl Config {
    /// Standard location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("onionwatch").join("config.toml"))
    }

    /// Load configuration from an explicit path, or the standard location.
    ///
    /// A missing file yields defaults; an unparseable file is logged and
    /// also yields defaults rather than aborting startup.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(PathBuf::from).or_else(Self::default_path) {
            Some(p) => p,
            None => return Self::default(),
        };

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };

        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unparseable config file");
                Self::default()
            }
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref target) = self.target {
            let path = shellexpand::tilde(target);
            settings.data_dir = PathBuf::from(path.as_ref());
            settings.report_path = settings.data_dir.join("report.txt");
        }
        if let Some(ref report_path) = self.report_path {
            let path = shellexpand::tilde(report_path);
            settings.report_path = PathBuf::from(path.as_ref());
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(ref proxy) = self.socks_proxy {
            settings.socks_proxy = proxy.clone();
        }
        if let Some(ref control) = self.control_endpoint {
            settings.control_endpoint = control.clone();
        }
        if let Some(ref endpoint) = self.index_endpoint {
            settings.index_endpoint = endpoint.clone();
        }
        if let Some(ref query) = self.index_query {
            settings.index_query = query.clone();
        }
        if let Some(timeout) = self.fetch_timeout {
            settings.fetch_timeout = timeout;
        }
        if let Some(interval) = self.scan_interval {
            settings.scan_interval = interval;
        }
        if let Some(ref token) = self.dashboard_token {
            settings.dashboard_token = Some(token.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.fetch_timeout, DEFAULT_FETCH_TIMEOUT_SECS);
        assert_eq!(settings.scan_interval, DEFAULT_SCAN_INTERVAL_SECS);
        assert!(settings.socks_proxy.starts_with("socks5h://"));
    }

    #[test]
    fn test_apply_to_settings() {
        let config: Config = toml::from_str(
            r#"
            target = "/tmp/onionwatch-test"
            index_query = "ransomware"
            fetch_timeout = 30
            dashboard_token = "s3cret"

            [inference]
            endpoint = "http://localhost:9000"

            [alerts]
            webhook_url = "https://chat.example.com/hook"
            "#,
        )
        .unwrap();

        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings);

        assert_eq!(settings.data_dir, PathBuf::from("/tmp/onionwatch-test"));
        assert_eq!(settings.index_query, "ransomware");
        assert_eq!(settings.fetch_timeout, 30);
        assert_eq!(settings.dashboard_token.as_deref(), Some("s3cret"));
        assert_eq!(config.inference.endpoint, "http://localhost:9000");
        assert_eq!(
            config.alerts.webhook_url.as_deref(),
            Some("https://chat.example.com/hook")
        );
    }

    #[test]
    fn test_empty_config_keeps_defaults() {
        let config: Config = toml::from_str("").unwrap();
        let mut settings = Settings::default();
        let before = settings.clone();
        config.apply_to_settings(&mut settings);
        assert_eq!(settings.index_endpoint, before.index_endpoint);
        assert_eq!(settings.scan_interval, before.scan_interval);
    }
}
