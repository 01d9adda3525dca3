use chrono::{DateTime, Utc};

use crate::domain::{Deal, Sector};
use crate::errors::DigestResult;

/// A deal that went out in an earlier digest
#[derive(Debug, Clone, PartialEq)]
pub struct SeenDeal {
    pub title: String,
    pub link: String,
    pub sector: String,
    pub published_on: String,
    pub seen_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
pub trait SectorRepository: Send + Sync {
    fn add(&self, sector: &Sector) -> DigestResult<i64>;
    fn remove(&self, id: i64) -> DigestResult<()>;
    fn get_all(&self) -> DigestResult<Vec<Sector>>;
    fn get_by_name(&self, name: &str) -> DigestResult<Option<Sector>>;
    fn exists(&self, name: &str) -> DigestResult<bool>;
    fn next_position(&self) -> DigestResult<i64>;
    fn replace_all(&self, sectors: &[Sector]) -> DigestResult<()>;
}

#[cfg_attr(test, mockall::automock)]
pub trait SeenDealRepository: Send + Sync {
    fn record(&self, deal: &Deal, seen_at: DateTime<Utc>) -> DigestResult<()>;
    fn seen_since(&self, since: DateTime<Utc>) -> DigestResult<Vec<SeenDeal>>;
    fn prune_before(&self, before: DateTime<Utc>) -> DigestResult<usize>;
}
