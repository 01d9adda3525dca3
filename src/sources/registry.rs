use crate::domain::{RawEntry, Sector};
use crate::errors::{DigestError, DigestResult};
use crate::sources::traits::DealSource;
use crate::sources::{google_news::GoogleNewsSource, rss_atom::RssAtomSource};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct SourceRegistry {
    sources: Vec<Box<dyn DealSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let mut registry = Self::empty();

        // Most specific first; RssAtomSource accepts anything
        registry.register(Box::new(GoogleNewsSource::new(timeout_secs)));
        registry.register(Box::new(RssAtomSource::new(timeout_secs)));

        registry
    }

    /// A registry with no sources, for callers that register their own
    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register(&mut self, source: Box<dyn DealSource>) {
        self.sources.push(source);
    }

    /// Find appropriate source for URL
    pub fn find_source(&self, url: &str) -> Option<&dyn DealSource> {
        self.sources
            .iter()
            .find(|s| s.can_handle(url))
            .map(|s| s.as_ref())
    }

    /// Fetch every entry of a sector's feed
    pub fn fetch(&self, sector: &Sector) -> DigestResult<Vec<RawEntry>> {
        let source = self
            .find_source(&sector.feed_url)
            .ok_or_else(|| DigestError::UnsupportedSource(sector.feed_url.clone()))?;

        source.fetch(sector)
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
