use reqwest::blocking::Client;
use url::{form_urlencoded, Url};

use crate::domain::{RawEntry, Sector, SourceKind};
use crate::errors::DigestResult;
use crate::sources::rss_atom::RssAtomSource;
use crate::sources::traits::DealSource;

const SEARCH_ENDPOINT: &str = "https://news.google.com/rss/search";
const GOOGLE_NEWS_HOST: &str = "news.google.com";

/// Build the Google News search feed URL for a query (US English edition)
pub fn google_news_url(query: &str) -> String {
    let params = form_urlencoded::Serializer::new(String::new())
        .append_pair("q", query)
        .append_pair("hl", "en-US")
        .append_pair("gl", "US")
        .append_pair("ceid", "US:en")
        .finish();
    format!("{}?{}", SEARCH_ENDPOINT, params)
}

/// Google News search results. Headlines arrive as "Title - Publisher", and
/// the publisher suffix is what the deduplicator ranks on.
pub struct GoogleNewsSource {
    client: Client,
}

impl GoogleNewsSource {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: super::build_client(timeout_secs),
        }
    }

    #[cfg(test)]
    fn entries_from_bytes(bytes: &[u8]) -> DigestResult<Vec<RawEntry>> {
        let parsed = RssAtomSource::parse_bytes(bytes)?;
        Ok(RssAtomSource::entries_from_feed(parsed, publisher_from_title))
    }
}

impl DealSource for GoogleNewsSource {
    fn source_kind(&self) -> SourceKind {
        SourceKind::GoogleNews
    }

    fn can_handle(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.eq_ignore_ascii_case(GOOGLE_NEWS_HOST)))
            .unwrap_or(false)
    }

    fn fetch(&self, sector: &Sector) -> DigestResult<Vec<RawEntry>> {
        let parsed = RssAtomSource::fetch_and_parse(&self.client, &sector.feed_url)?;
        Ok(RssAtomSource::entries_from_feed(parsed, publisher_from_title))
    }
}

/// "Acme buys Widget - Reuters" -> "Reuters"
fn publisher_from_title(title: &str) -> Option<String> {
    let (headline, publisher) = title.rsplit_once(" - ")?;
    let publisher = publisher.trim();
    if headline.trim().is_empty() || publisher.is_empty() {
        return None;
    }
    Some(publisher.to_string())
}
