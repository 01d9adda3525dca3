use chrono::{DateTime, Utc};

use crate::domain::{Deal, Sector};
use crate::errors::DigestResult;
use crate::services::filter_service::FilterService;
use crate::sources::SourceRegistry;
use crate::storage::traits::SectorRepository;

/// Everything gathered across sectors in one pass
#[derive(Debug, Default)]
pub struct FetchResult {
    pub sectors: Vec<Sector>,
    pub deals: Vec<Deal>,
    pub entries_seen: usize,
    pub failed: Vec<(String, String)>, // (sector name, error message)
}

pub struct FetchService<R: SectorRepository> {
    sector_repository: R,
    source_registry: SourceRegistry,
    filter: FilterService,
}

impl<R: SectorRepository> FetchService<R> {
    pub fn new(sector_repository: R, source_registry: SourceRegistry, filter: FilterService) -> Self {
        Self {
            sector_repository,
            source_registry,
            filter,
        }
    }

    /// Fetch one sector and keep the entries that pass the filter
    pub fn fetch_sector(&self, sector: &Sector, now: DateTime<Utc>) -> DigestResult<(usize, Vec<Deal>)> {
        let entries = self.source_registry.fetch(sector)?;
        let total = entries.len();

        let deals: Vec<Deal> = entries
            .into_iter()
            .filter_map(|entry| {
                let title = entry.title.clone();
                match self.filter.accept(entry, &sector.name, now) {
                    Ok(deal) => Some(deal),
                    Err(reason) => {
                        tracing::debug!(%title, ?reason, "Skipping entry");
                        None
                    }
                }
            })
            .collect();

        Ok((total, deals))
    }

    /// Fetch all sectors; one failing feed does not stop the others
    pub fn fetch_all(&self, now: DateTime<Utc>) -> DigestResult<FetchResult> {
        let sectors = self.sector_repository.get_all()?;
        let mut result = FetchResult::default();

        for sector in &sectors {
            tracing::info!("Searching news for: {}", sector.name);
            match self.fetch_sector(sector, now) {
                Ok((total, deals)) => {
                    tracing::info!(
                        sector = %sector.name,
                        entries = total,
                        kept = deals.len(),
                        "Fetched sector"
                    );
                    result.entries_seen += total;
                    result.deals.extend(deals);
                }
                Err(e) => {
                    tracing::warn!(sector = %sector.name, error = %e, "Failed to fetch sector");
                    result.failed.push((sector.name.clone(), e.to_string()));
                }
            }
        }

        result.sectors = sectors;
        Ok(result)
    }
}
