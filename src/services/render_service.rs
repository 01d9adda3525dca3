use std::fs;
use std::path::Path;

use askama::Template;

use crate::domain::Digest;
use crate::errors::DigestResult;

/// The published page; every interpolated value is HTML-escaped by askama
#[derive(Template)]
#[template(path = "digest.html")]
struct DigestPage<'a> {
    digest: &'a Digest,
    title_date: String,
    heading_date: String,
}

pub struct RenderService;

impl RenderService {
    /// Render the digest as a standalone HTML page
    pub fn render(digest: &Digest) -> DigestResult<String> {
        let page = DigestPage {
            digest,
            title_date: digest.generated_at.format("%B %d, %Y").to_string(),
            heading_date: digest.generated_at.format("%A, %B %d, %Y").to_string(),
        };
        Ok(page.render()?)
    }

    /// Render and write the page, creating parent directories as needed
    pub fn write_html(digest: &Digest, path: &Path) -> DigestResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, Self::render(digest)?)?;
        tracing::info!(path = %path.display(), deals = digest.total_kept(), "Wrote digest");
        Ok(())
    }

    /// Write the kept deals as pretty JSON
    pub fn write_json(digest: &Digest, path: &Path) -> DigestResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(digest)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Deal, RawEntry};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn deal(title: &str, sector: &str) -> Deal {
        let published = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        Deal::from_entry(
            RawEntry::new(title.to_string(), "https://n.example/a?x=1&y=2".to_string())
                .with_summary("Acme pays $2 billion".to_string())
                .with_source(Some("Reuters".to_string())),
            published,
            sector,
            Some("$2 billion".to_string()),
        )
    }

    fn digest(deals: Vec<Deal>) -> Digest {
        let generated_at = Utc.with_ymd_and_hms(2026, 10, 18, 13, 0, 0).unwrap();
        let order = vec!["Consumer & Retail".to_string(), "Technology".to_string()];
        let total = deals.len();
        Digest::assemble(generated_at, "Centerstone Capital", 24, &order, deals, total)
    }

    #[test]
    fn test_empty_digest_message() {
        let html = RenderService::render(&digest(Vec::new())).unwrap();

        assert!(html.contains("No relevant deals found in the past 24 hours."));
        assert!(!html.contains("<h2>"));
        assert!(html.contains("Centerstone Capital M&amp;A Deal Landscape – October 18, 2026"));
        assert!(html.contains("<small>Sunday, October 18, 2026</small>"));
    }

    #[test]
    fn test_sections_in_order_with_meta() {
        let html = RenderService::render(&digest(vec![
            deal("Cloudco buys DataCorp", "Technology"),
            deal("Grocer sells bakery unit", "Consumer & Retail"),
        ]))
        .unwrap();

        let retail = html.find("<h2>Consumer &amp; Retail</h2>").unwrap();
        let tech = html.find("<h2>Technology</h2>").unwrap();
        assert!(retail < tech);
        assert!(html.contains("📅 2026-10-18 | 💰 $2 billion | 📰 Reuters"));
        assert!(html.contains("target=\"_blank\""));
        assert!(!html.contains("No relevant deals"));
    }

    #[test]
    fn test_text_and_links_are_escaped() {
        let html = RenderService::render(&digest(vec![deal(
            "<script>alert('x')</script> buys \"Widget\"",
            "Technology",
        )]))
        .unwrap();

        assert!(!html.contains("<script>"));
        assert!(!html.contains("\"Widget\""));
        assert!(html.contains("&lt;script&gt;alert("));
        assert!(html.contains("x=1&amp;y=2"));
    }

    #[test]
    fn test_write_html_and_json() {
        let temp_dir = TempDir::new().unwrap();
        let html_path = temp_dir.path().join("site/index.html");
        let json_path = temp_dir.path().join("deals.json");
        let d = digest(vec![deal("Cloudco buys DataCorp", "Technology")]);

        RenderService::write_html(&d, &html_path).unwrap();
        RenderService::write_json(&d, &json_path).unwrap();

        let html = fs::read_to_string(&html_path).unwrap();
        assert!(html.contains("Cloudco buys DataCorp"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["sections"][0]["deals"][0]["title"], "Cloudco buys DataCorp");
        assert_eq!(json["sections"][0]["sector"], "Technology");
    }
}
