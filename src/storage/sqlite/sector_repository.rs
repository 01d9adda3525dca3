use rusqlite::Row;

use crate::domain::Sector;
use crate::errors::{DigestError, DigestResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::SectorRepository;

const SELECT_SECTOR: &str = "SELECT id, name, query, feed_url, position FROM sectors";

pub struct SqliteSectorRepository {
    storage: SqliteStorage,
}

impl SqliteSectorRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Sector> {
        Ok(Sector {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            query: row.get(2)?,
            feed_url: row.get(3)?,
            position: row.get(4)?,
        })
    }
}

impl SectorRepository for SqliteSectorRepository {
    fn add(&self, sector: &Sector) -> DigestResult<i64> {
        let conn = self.storage.connection()?;

        // Check within the same connection to avoid deadlock
        let mut stmt = conn.prepare("SELECT EXISTS(SELECT 1 FROM sectors WHERE name = ?1)")?;
        let exists: bool = stmt.query_row([&sector.name], |row| row.get(0))?;
        drop(stmt);

        if exists {
            return Err(DigestError::SectorAlreadyExists(sector.name.clone()));
        }

        conn.execute(
            "INSERT INTO sectors (name, query, feed_url, position) VALUES (?1, ?2, ?3, ?4)",
            (&sector.name, &sector.query, &sector.feed_url, sector.position),
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn remove(&self, id: i64) -> DigestResult<()> {
        let conn = self.storage.connection()?;
        let removed = conn.execute("DELETE FROM sectors WHERE id = ?1", [id])?;
        if removed == 0 {
            return Err(DigestError::SectorNotFound(format!("id {}", id)));
        }
        Ok(())
    }

    fn get_all(&self) -> DigestResult<Vec<Sector>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY position, id", SELECT_SECTOR))?;

        let sectors = stmt.query_map([], Self::from_row)?;

        sectors.collect::<Result<Vec<_>, _>>().map_err(DigestError::from)
    }

    fn get_by_name(&self, name: &str) -> DigestResult<Option<Sector>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!("{} WHERE name = ?1", SELECT_SECTOR))?;

        match stmt.query_row([name], Self::from_row) {
            Ok(s) => Ok(Some(s)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DigestError::from(e)),
        }
    }

    fn exists(&self, name: &str) -> DigestResult<bool> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare("SELECT EXISTS(SELECT 1 FROM sectors WHERE name = ?1)")?;
        let exists: bool = stmt.query_row([name], |row| row.get(0))?;
        Ok(exists)
    }

    fn next_position(&self) -> DigestResult<i64> {
        let conn = self.storage.connection()?;
        let next: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM sectors",
            [],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    fn replace_all(&self, sectors: &[Sector]) -> DigestResult<()> {
        let mut conn = self.storage.connection()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM sectors", [])?;
        for sector in sectors {
            tx.execute(
                "INSERT INTO sectors (name, query, feed_url, position) VALUES (?1, ?2, ?3, ?4)",
                (&sector.name, &sector.query, &sector.feed_url, sector.position),
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_repo() -> SqliteSectorRepository {
        let storage = SqliteStorage::in_memory().unwrap();
        SqliteSectorRepository::new(storage)
    }

    #[test]
    fn test_add_and_get_sector() {
        let repo = setup_repo();
        let sector = Sector::from_query("Energy".to_string(), "acquires AND energy".to_string());

        let id = repo.add(&sector).unwrap();
        assert!(id > 0);

        let retrieved = repo.get_by_name("Energy").unwrap().unwrap();
        assert_eq!(retrieved.id, Some(id));
        assert_eq!(retrieved.query.as_deref(), Some("acquires AND energy"));
        assert_eq!(retrieved.feed_url, sector.feed_url);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let repo = setup_repo();
        let sector = Sector::from_url("Wire".to_string(), "https://wire.example/rss".to_string());

        repo.add(&sector).unwrap();
        let result = repo.add(&sector);

        assert!(matches!(result, Err(DigestError::SectorAlreadyExists(_))));
    }

    #[test]
    fn test_remove_sector() {
        let repo = setup_repo();
        let sector = Sector::from_url("Wire".to_string(), "https://wire.example/rss".to_string());

        let id = repo.add(&sector).unwrap();
        repo.remove(id).unwrap();

        assert!(repo.get_by_name("Wire").unwrap().is_none());
        assert!(matches!(repo.remove(id), Err(DigestError::SectorNotFound(_))));
    }

    #[test]
    fn test_get_all_ordered_by_position() {
        let repo = setup_repo();

        repo.add(&Sector::from_url("B".to_string(), "https://b.example/rss".to_string()).with_position(2))
            .unwrap();
        repo.add(&Sector::from_url("A".to_string(), "https://a.example/rss".to_string()).with_position(1))
            .unwrap();

        let names: Vec<String> = repo.get_all().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_next_position() {
        let repo = setup_repo();
        assert_eq!(repo.next_position().unwrap(), 0);

        repo.add(&Sector::from_url("A".to_string(), "https://a.example/rss".to_string()).with_position(5))
            .unwrap();
        assert_eq!(repo.next_position().unwrap(), 6);
    }

    #[test]
    fn test_replace_all() {
        let repo = setup_repo();
        repo.add(&Sector::from_url("Old".to_string(), "https://old.example/rss".to_string()))
            .unwrap();

        repo.replace_all(&Sector::defaults()).unwrap();

        let all = repo.get_all().unwrap();
        assert_eq!(all.len(), 4);
        assert!(!repo.exists("Old").unwrap());
        assert!(repo.exists("Healthcare").unwrap());
    }
}
