use feed_rs::parser;
use reqwest::blocking::Client;
use scraper::Html;

use crate::domain::{RawEntry, Sector, SourceKind};
use crate::errors::{DigestError, DigestResult};
use crate::sources::traits::DealSource;

/// Generic RSS/Atom/JSON feed; entries are attributed to the feed's own title
pub struct RssAtomSource {
    client: Client,
}

impl RssAtomSource {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: super::build_client(timeout_secs),
        }
    }

    pub(crate) fn fetch_and_parse(
        client: &Client,
        url: &str,
    ) -> DigestResult<feed_rs::model::Feed> {
        let response = client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let bytes = response.bytes()?;

        Self::parse_bytes(&bytes)
    }

    pub(crate) fn parse_bytes(bytes: &[u8]) -> DigestResult<feed_rs::model::Feed> {
        parser::parse(bytes).map_err(|e| DigestError::FeedParse(e.to_string()))
    }

    /// Convert parsed entries, taking the publisher name from `source_of`
    pub(crate) fn entries_from_feed<F>(feed: feed_rs::model::Feed, source_of: F) -> Vec<RawEntry>
    where
        F: Fn(&str) -> Option<String>,
    {
        feed.entries
            .into_iter()
            .map(|entry| {
                let title = entry
                    .title
                    .map(|t| decode_entities(&t.content))
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| "Untitled".to_string());

                let link = entry
                    .links
                    .into_iter()
                    .map(|l| l.href)
                    .next()
                    .unwrap_or_else(|| entry.id.clone());

                let summary = entry
                    .summary
                    .map(|s| s.content)
                    .or_else(|| entry.content.and_then(|c| c.body))
                    .map(|s| html_to_text(&s))
                    .unwrap_or_default();

                let published = entry.published.or(entry.updated);
                let source = source_of(&title);

                RawEntry::new(title, link)
                    .with_summary(summary)
                    .with_published(published)
                    .with_source(source)
            })
            .collect()
    }

    #[cfg(test)]
    fn entries_from_bytes(bytes: &[u8]) -> DigestResult<Vec<RawEntry>> {
        let parsed = Self::parse_bytes(bytes)?;
        let feed_title = parsed.title.as_ref().map(|t| decode_entities(&t.content));
        Ok(Self::entries_from_feed(parsed, |_| feed_title.clone()))
    }
}

impl DealSource for RssAtomSource {
    fn source_kind(&self) -> SourceKind {
        SourceKind::RssAtom
    }

    fn can_handle(&self, _url: &str) -> bool {
        // RssAtomSource is the fallback, it can try to handle any URL
        true
    }

    fn fetch(&self, sector: &Sector) -> DigestResult<Vec<RawEntry>> {
        let parsed = Self::fetch_and_parse(&self.client, &sector.feed_url)?;
        let feed_title = parsed
            .title
            .as_ref()
            .map(|t| decode_entities(&t.content))
            .filter(|t| !t.is_empty());

        Ok(Self::entries_from_feed(parsed, |_| feed_title.clone()))
    }
}

/// Decode entities and drop markup, collapsing runs of whitespace
pub(crate) fn html_to_text(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let text: String = fragment.root_element().text().collect::<Vec<_>>().join(" ");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode entities in plain text such as a headline, keeping any `<` literal
pub(crate) fn decode_entities(raw: &str) -> String {
    html_to_text(&raw.replace('<', "&lt;"))
}
