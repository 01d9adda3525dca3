use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;

use crate::domain::{Deal, RawEntry};
use crate::errors::{DigestError, DigestResult};

/// First currency amount in a summary, e.g. "$1.2 billion" or "€300M"
const DEAL_VALUE_PATTERN: &str = r"(?i)([$€£]\s?\d+[.,]?\d*\s?(million|billion|M|B)?)";

/// Why an entry did not make it into the digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Undated,
    Stale,
    Excluded(String),
}

pub struct FilterService {
    window: TimeDelta,
    exclude_keywords: Vec<String>,
    deal_value: Regex,
}

impl FilterService {
    pub fn new(window_hours: i64, exclude_keywords: Vec<String>) -> DigestResult<Self> {
        let deal_value = Regex::new(DEAL_VALUE_PATTERN)
            .map_err(|e| DigestError::Config(format!("deal value pattern: {}", e)))?;

        let window = TimeDelta::try_hours(window_hours)
            .filter(|w| *w > TimeDelta::zero())
            .ok_or_else(|| {
                DigestError::Config(format!("window of {} hours is out of range", window_hours))
            })?;

        Ok(Self {
            window,
            exclude_keywords: exclude_keywords
                .into_iter()
                .map(|k| k.to_lowercase())
                .collect(),
            deal_value,
        })
    }

    /// Turn an entry into a deal, or say why it was dropped
    pub fn accept(
        &self,
        entry: RawEntry,
        sector: &str,
        now: DateTime<Utc>,
    ) -> Result<Deal, Rejection> {
        let published = entry.published.ok_or(Rejection::Undated)?;

        // Future-dated entries are kept; only the age is bounded
        if now - published > self.window {
            return Err(Rejection::Stale);
        }

        let title = entry.title.to_lowercase();
        if let Some(keyword) = self.exclude_keywords.iter().find(|k| title.contains(k.as_str())) {
            return Err(Rejection::Excluded(keyword.clone()));
        }

        let deal_value = self.extract_deal_value(&entry.summary);
        Ok(Deal::from_entry(entry, published, sector, deal_value))
    }

    pub fn extract_deal_value(&self, summary: &str) -> Option<String> {
        self.deal_value
            .find(summary)
            .map(|m| m.as_str().trim().to_string())
    }
}
