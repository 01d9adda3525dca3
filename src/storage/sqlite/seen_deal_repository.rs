use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::Deal;
use crate::errors::{DigestError, DigestResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::{SeenDeal, SeenDealRepository};

pub struct SqliteSeenDealRepository {
    storage: SqliteStorage,
}

impl SqliteSeenDealRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

/// Fixed-width UTC timestamps so text comparison matches time order
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl SeenDealRepository for SqliteSeenDealRepository {
    fn record(&self, deal: &Deal, seen_at: DateTime<Utc>) -> DigestResult<()> {
        let conn = self.storage.connection()?;
        conn.execute(
            "INSERT OR IGNORE INTO seen_deals (title, link, sector, published_on, seen_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            (&deal.title, &deal.link, &deal.sector, &deal.date, timestamp(seen_at)),
        )?;
        Ok(())
    }

    fn seen_since(&self, since: DateTime<Utc>) -> DigestResult<Vec<SeenDeal>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT title, link, sector, published_on, seen_at FROM seen_deals WHERE seen_at >= ?1 ORDER BY seen_at DESC, id",
        )?;

        let rows = stmt.query_map([timestamp(since)], |row| {
            let seen_at: String = row.get(4)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                seen_at,
            ))
        })?;

        let mut seen = Vec::new();
        for row in rows {
            let (title, link, sector, published_on, seen_at) = row?;
            let seen_at = DateTime::parse_from_rfc3339(&seen_at)
                .map_err(|e| DigestError::CorruptRecord(format!("seen_at {}: {}", seen_at, e)))?
                .with_timezone(&Utc);
            seen.push(SeenDeal {
                title,
                link,
                sector,
                published_on,
                seen_at,
            });
        }

        Ok(seen)
    }

    fn prune_before(&self, before: DateTime<Utc>) -> DigestResult<usize> {
        let conn = self.storage.connection()?;
        let removed = conn.execute(
            "DELETE FROM seen_deals WHERE seen_at < ?1",
            [timestamp(before)],
        )?;
        Ok(removed)
    }
}
