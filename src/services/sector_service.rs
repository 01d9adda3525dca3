use url::Url;

use crate::domain::Sector;
use crate::errors::{DigestError, DigestResult};
use crate::storage::traits::SectorRepository;

pub struct SectorService<R: SectorRepository> {
    repository: R,
}

impl<R: SectorRepository> SectorService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Add a Google News search sector, appended after existing sectors
    pub fn add_query(&self, name: &str, query: &str) -> DigestResult<Sector> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DigestError::InvalidInput("Query must not be empty".to_string()));
        }
        self.add(Sector::from_query(Self::clean_name(name)?, query.to_string()))
    }

    /// Add a sector backed by an arbitrary RSS/Atom feed
    pub fn add_url(&self, name: &str, url: &str) -> DigestResult<Sector> {
        let parsed = Url::parse(url.trim()).map_err(|e| DigestError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DigestError::InvalidUrl(format!(
                "Unsupported scheme: {}",
                parsed.scheme()
            )));
        }
        self.add(Sector::from_url(Self::clean_name(name)?, parsed.to_string()))
    }

    fn add(&self, sector: Sector) -> DigestResult<Sector> {
        if self.repository.exists(&sector.name)? {
            return Err(DigestError::SectorAlreadyExists(sector.name));
        }

        let position = self.repository.next_position()?;
        let sector = sector.with_position(position);
        let id = self.repository.add(&sector)?;

        Ok(Sector {
            id: Some(id),
            ..sector
        })
    }

    fn clean_name(name: &str) -> DigestResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DigestError::InvalidInput("Sector name must not be empty".to_string()));
        }
        Ok(name.to_string())
    }

    /// Remove a sector by ID
    pub fn remove(&self, id: i64) -> DigestResult<()> {
        self.repository.remove(id)
    }

    /// List all sectors in display order
    pub fn list(&self) -> DigestResult<Vec<Sector>> {
        self.repository.get_all()
    }

    /// Replace every sector with the built-in defaults
    pub fn reset(&self) -> DigestResult<Vec<Sector>> {
        self.repository.replace_all(&Sector::defaults())?;
        self.repository.get_all()
    }
}
