use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::domain::Digest;
use crate::errors::{DigestError, DigestResult};
use crate::services::dedup_service::DedupService;
use crate::services::fetch_service::FetchService;
use crate::services::history_service::HistoryService;
use crate::storage::traits::{SectorRepository, SeenDealRepository};

pub struct BuildOutcome {
    pub digest: Digest,
    /// (sector name, error message) for feeds that could not be fetched
    pub failed: Vec<(String, String)>,
}

/// Fetch, filter, deduplicate and group one run's deals
pub struct DigestService<R: SectorRepository, H: SeenDealRepository> {
    fetch_service: FetchService<R>,
    dedup_service: DedupService,
    history_service: HistoryService<H>,
    firm_name: String,
    window_hours: i64,
    history_days: i64,
    retention_days: i64,
}

impl<R: SectorRepository, H: SeenDealRepository> DigestService<R, H> {
    pub fn new(
        fetch_service: FetchService<R>,
        history_service: HistoryService<H>,
        config: &Config,
    ) -> Self {
        Self {
            fetch_service,
            dedup_service: DedupService::new(
                config.similarity_threshold,
                config.preferred_sources.clone(),
            ),
            history_service,
            firm_name: config.firm_name.clone(),
            window_hours: config.window_hours,
            history_days: config.history_days,
            retention_days: config.history_retention_days.max(config.history_days),
        }
    }

    pub fn build(&self, now: DateTime<Utc>, use_history: bool) -> DigestResult<BuildOutcome> {
        let fetched = self.fetch_service.fetch_all(now)?;

        if !fetched.sectors.is_empty() && fetched.failed.len() == fetched.sectors.len() {
            return Err(DigestError::AllSectorsFailed(fetched.sectors.len()));
        }

        let history = if use_history {
            self.history_service
                .earlier_titles(self.history_days, now, &fetched.deals)?
        } else {
            Vec::new()
        };
        if !history.is_empty() {
            tracing::info!(titles = history.len(), "Comparing against earlier digests");
        }

        let total_found = fetched.deals.len();
        let unique = self.dedup_service.deduplicate(fetched.deals, &history);

        let sector_order: Vec<String> = fetched.sectors.iter().map(|s| s.name.clone()).collect();
        let digest = Digest::assemble(
            now,
            &self.firm_name,
            self.window_hours,
            &sector_order,
            unique,
            total_found,
        );

        Ok(BuildOutcome {
            digest,
            failed: fetched.failed,
        })
    }

    /// Remember the digest's deals for deduplication in later runs, then
    /// drop history older than the retention period
    pub fn record(&self, digest: &Digest) -> DigestResult<usize> {
        let recorded = self
            .history_service
            .record(digest.deals(), digest.generated_at)?;
        self.history_service
            .prune(self.retention_days, digest.generated_at)?;
        Ok(recorded)
    }
}
