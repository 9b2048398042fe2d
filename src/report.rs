//! Plain-text report export.

use std::path::Path;

use chrono::Utc;

use crate::error::Result;
use crate::models::Site;
use crate::repository::SiteRepository;

/// Render the monitoring report for a set of records.
pub fn render_report(sites: &[Site]) -> String {
    let mut out = String::new();
    out.push_str("Dark Web Monitoring Report\n");
    out.push_str(&format!("Generated: {}\n", Utc::now().to_rfc3339()));
    out.push_str(&format!("Tracked sites: {}\n\n", sites.len()));

    for site in sites {
        out.push_str(&format!("URL: {}\n", site.url));
        match &site.analysis {
            Some(analysis) => out.push_str(&format!("Analysis: {}\n", analysis.summary())),
            None => out.push_str("Analysis: (not yet analyzed)\n"),
        }
        if let Some(sentiment) = site.sentiment {
            out.push_str(&format!("Sentiment: {}\n", sentiment.as_str()));
        }
        out.push_str(&format!(
            "Acknowledged: {}\n",
            if site.acknowledged { "yes" } else { "no" }
        ));
        out.push_str(&format!("Last updated: {}\n\n", site.last_updated.to_rfc3339()));
    }

    out
}

/// Write the report for all tracked sites to the fixed export path.
///
/// Returns the rendered text so callers can also serve it directly.
pub async fn write_report(store: &SiteRepository, path: &Path) -> Result<String> {
    let sites = store.get_all().await?;
    let text = render_report(&sites);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &text).await?;
    Ok(text)
}
