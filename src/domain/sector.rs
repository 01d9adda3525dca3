use serde::{Deserialize, Serialize};

/// Heading for deals whose sector is not configured; always rendered last
pub const OTHER_SECTOR: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    GoogleNews,
    RssAtom,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::GoogleNews => "google_news",
            SourceKind::RssAtom => "rss_atom",
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google_news" | "google" => Ok(SourceKind::GoogleNews),
            "rss_atom" | "rss" | "atom" => Ok(SourceKind::RssAtom),
            _ => Err(format!("Unknown source kind: {}", s)),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named feed whose entries are grouped under one heading of the digest.
///
/// Sectors created from a search query keep the query so the feed URL can be
/// rebuilt; sectors imported from OPML only carry the URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: Option<i64>,
    pub name: String,
    pub query: Option<String>,
    pub feed_url: String,
    pub position: i64,
}

impl Sector {
    pub fn from_query(name: String, query: String) -> Self {
        let feed_url = crate::sources::google_news_url(&query);
        Self {
            id: None,
            name,
            query: Some(query),
            feed_url,
            position: 0,
        }
    }

    pub fn from_url(name: String, feed_url: String) -> Self {
        Self {
            id: None,
            name,
            query: None,
            feed_url,
            position: 0,
        }
    }

    pub fn with_position(mut self, position: i64) -> Self {
        self.position = position;
        self
    }

    /// The sectors a fresh database starts with
    pub fn defaults() -> Vec<Sector> {
        DEFAULT_SECTORS
            .iter()
            .enumerate()
            .map(|(i, (name, query))| {
                Sector::from_query(name.to_string(), query.to_string()).with_position(i as i64)
            })
            .collect()
    }
}

const DEFAULT_SECTORS: &[(&str, &str)] = &[
    (
        "Consumer & Retail",
        r#"("acquires" OR "acquisition" OR "merger" OR "buys") AND (consumer OR retail OR fashion OR food)"#,
    ),
    (
        "Healthcare",
        r#"("acquires" OR "acquisition" OR "merger") AND (healthcare OR pharma OR medtech)"#,
    ),
    (
        "Technology",
        r#"("acquires" OR "acquisition" OR "merger") AND (software OR cloud OR AI OR SaaS)"#,
    ),
    (
        "Business Services",
        r#"("acquires" OR "acquisition") AND ("business services" OR B2B OR outsourcing)"#,
    ),
];
