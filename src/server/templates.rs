//! HTML templates for the dashboard.

use crate::models::Site;
use crate::monitor::CyclePhase;

/// Escape text destined for HTML. Page content and URLs come from
/// untrusted onion sites and must never reach the page unescaped.
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Base HTML template.
fn base_template(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - onionwatch</title>
    <style>
        body {{ font-family: monospace; margin: 2rem; }}
        table {{ border-collapse: collapse; width: 100%; }}
        th, td {{ border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; }}
        .negative {{ color: #b00; font-weight: bold; }}
        .positive {{ color: #070; }}
    </style>
</head>
<body>
    <header>
        <nav><a href="/">onionwatch</a> | <a href="/report">report</a></nav>
    </header>
    <main>
        <h1>{title}</h1>
        {content}
    </main>
</body>
</html>"#
    )
}

/// Render the record listing page.
pub fn index_page(sites: &[Site], phase: CyclePhase) -> String {
    let mut rows = String::new();

    for site in sites {
        let sentiment = site
            .analysis
            .as_ref()
            .map(|a| a.sentiment().as_str())
            .unwrap_or("-");
        let label = site
            .analysis
            .as_ref()
            .map(|a| escape(&a.label))
            .unwrap_or_else(|| "-".to_string());
        rows.push_str(&format!(
            r#"<tr>
    <td>{id}</td>
    <td>{url}</td>
    <td class="{sentiment}">{sentiment}</td>
    <td>{label}</td>
    <td>{keywords}</td>
    <td>{acknowledged}</td>
    <td>{updated}</td>
</tr>
"#,
            id = site.id,
            url = escape(&site.url),
            sentiment = sentiment,
            label = label,
            keywords = escape(&site.keywords.join(", ")),
            acknowledged = if site.acknowledged { "yes" } else { "no" },
            updated = site.last_updated.format("%Y-%m-%d %H:%M"),
        ));
    }

    let content = format!(
        r#"<p>Loop phase: <strong>{phase}</strong> | Tracked sites: {count}</p>
<table>
<tr><th>id</th><th>url</th><th>sentiment</th><th>label</th><th>keywords</th><th>ack</th><th>updated</th></tr>
{rows}</table>"#,
        phase = phase.as_str(),
        count = sites.len(),
    );

    base_template("Tracked sites", &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Analysis;
    use chrono::Utc;

    fn site(url: &str) -> Site {
        Site {
            id: 7,
            url: url.to_string(),
            content: None,
            analysis: Some(Analysis::new("NEGATIVE", 0.9, "sst-2")),
            sentiment: None,
            keywords: vec!["market".to_string()],
            entities: vec![],
            acknowledged: false,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_index_lists_records() {
        let html = index_page(&[site("http://abc123.onion")], CyclePhase::Idle);
        assert!(html.contains("http://abc123.onion"));
        assert!(html.contains("negative"));
        assert!(html.contains("market"));
        assert!(html.contains("Loop phase: <strong>idle</strong>"));
    }

    #[test]
    fn test_untrusted_text_is_escaped() {
        let html = index_page(&[site("http://x.onion/<script>alert(1)</script>")], CyclePhase::Idle);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
