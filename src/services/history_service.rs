use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::Deal;
use crate::errors::{DigestError, DigestResult};
use crate::storage::traits::{SeenDeal, SeenDealRepository};

/// Deals published by earlier runs, used to avoid repeating a story the
/// next day under a slightly different headline.
pub struct HistoryService<H: SeenDealRepository> {
    repository: H,
}

/// `now` minus `days`, or an error when that falls outside chrono's range
pub fn days_before(now: DateTime<Utc>, days: i64) -> DigestResult<DateTime<Utc>> {
    TimeDelta::try_days(days)
        .and_then(|delta| now.checked_sub_signed(delta))
        .ok_or_else(|| DigestError::InvalidInput(format!("{} days is out of range", days)))
}

impl<H: SeenDealRepository> HistoryService<H> {
    pub fn new(repository: H) -> Self {
        Self { repository }
    }

    pub fn recent(&self, days: i64, now: DateTime<Utc>) -> DigestResult<Vec<SeenDeal>> {
        if days <= 0 {
            return Ok(Vec::new());
        }
        self.repository.seen_since(days_before(now, days)?)
    }

    /// Titles from earlier digests, skipping any whose link is fetched again
    /// in `current` so a same-day re-run rebuilds the same digest
    pub fn earlier_titles(
        &self,
        days: i64,
        now: DateTime<Utc>,
        current: &[Deal],
    ) -> DigestResult<Vec<String>> {
        let current_links: HashSet<&str> = current.iter().map(|d| d.link.as_str()).collect();

        Ok(self
            .recent(days, now)?
            .into_iter()
            .filter(|seen| !current_links.contains(seen.link.as_str()))
            .map(|seen| seen.title)
            .collect())
    }

    pub fn record<'a, I>(&self, deals: I, now: DateTime<Utc>) -> DigestResult<usize>
    where
        I: IntoIterator<Item = &'a Deal>,
    {
        let mut count = 0;
        for deal in deals {
            self.repository.record(deal, now)?;
            count += 1;
        }
        Ok(count)
    }

    pub fn prune(&self, keep_days: i64, now: DateTime<Utc>) -> DigestResult<usize> {
        let removed = self
            .repository
            .prune_before(days_before(now, keep_days.max(0))?)?;
        tracing::info!(removed, keep_days, "Pruned history");
        Ok(removed)
    }
}
