use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publisher label used when a feed entry does not name its source
pub const FALLBACK_SOURCE: &str = "Google News";

/// Value label used when no amount is found in the summary
pub const UNDISCLOSED: &str = "Undisclosed";

/// A feed entry as parsed, before any filtering
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
    pub source: Option<String>,
}

impl RawEntry {
    pub fn new(title: String, link: String) -> Self {
        Self {
            title,
            link,
            summary: String::new(),
            published: None,
            source: None,
        }
    }

    pub fn with_summary(mut self, summary: String) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_published(mut self, published: Option<DateTime<Utc>>) -> Self {
        self.published = published;
        self
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub title: String,
    pub link: String,
    pub summary: String,
    /// Publication day, `YYYY-MM-DD`
    pub date: String,
    pub published: DateTime<Utc>,
    pub sector: String,
    pub deal_value: String,
    pub source: String,
}

impl Deal {
    pub fn from_entry(
        entry: RawEntry,
        published: DateTime<Utc>,
        sector: &str,
        deal_value: Option<String>,
    ) -> Self {
        Self {
            title: entry.title,
            link: entry.link,
            summary: entry.summary,
            date: published.format("%Y-%m-%d").to_string(),
            published,
            sector: sector.to_string(),
            deal_value: deal_value.unwrap_or_else(|| UNDISCLOSED.to_string()),
            source: entry
                .source
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_SOURCE.to_string()),
        }
    }
}
