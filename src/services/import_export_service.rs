use opml::{Outline, OPML};

use crate::domain::Sector;
use crate::errors::{DigestError, DigestResult};
use crate::storage::traits::SectorRepository;

pub struct ImportResult {
    pub added: Vec<Sector>,
    pub invalid: Vec<(String, String)>, // (name, error_message)
    pub duplicates: Vec<String>,
}

pub struct ImportExportService<R: SectorRepository> {
    repository: R,
}

impl<R: SectorRepository> ImportExportService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Import sectors from OPML content; outline text becomes the sector name
    pub fn import_opml(&self, content: &str) -> DigestResult<ImportResult> {
        let opml = OPML::from_str(content).map_err(|e| DigestError::OpmlParse(e.to_string()))?;

        let mut result = ImportResult {
            added: Vec::new(),
            invalid: Vec::new(),
            duplicates: Vec::new(),
        };

        let mut position = self.repository.next_position()?;

        for (name, url, query) in Self::extract_feeds(&opml.body.outlines) {
            if self.repository.exists(&name)? {
                result.duplicates.push(name);
                continue;
            }

            if let Err(e) = url::Url::parse(&url) {
                result.invalid.push((name, format!("Invalid feed URL: {}", e)));
                continue;
            }

            let sector = Sector {
                query,
                ..Sector::from_url(name.clone(), url).with_position(position)
            };
            match self.repository.add(&sector) {
                Ok(id) => {
                    position += 1;
                    result.added.push(Sector {
                        id: Some(id),
                        ..sector
                    });
                }
                Err(e) => {
                    result.invalid.push((name, e.to_string()));
                }
            }
        }

        Ok(result)
    }

    /// Recursively collect (name, feed url, query) from outlines with an xmlUrl.
    /// The query travels in the outline description, as written by `export_opml`.
    fn extract_feeds(outlines: &[Outline]) -> Vec<(String, String, Option<String>)> {
        let mut feeds = Vec::new();

        for outline in outlines {
            if let Some(url) = outline.xml_url.as_deref().map(str::trim) {
                if !url.is_empty() {
                    let name = outline
                        .title
                        .as_deref()
                        .filter(|t| !t.trim().is_empty())
                        .unwrap_or(&outline.text)
                        .trim()
                        .to_string();
                    let name = if name.is_empty() { url.to_string() } else { name };
                    let query = outline
                        .description
                        .as_deref()
                        .map(str::trim)
                        .filter(|d| !d.is_empty())
                        .map(str::to_string);
                    feeds.push((name, url.to_string(), query));
                }
            }

            feeds.extend(Self::extract_feeds(&outline.outlines));
        }

        feeds
    }

    /// Export sectors to OPML format
    pub fn export_opml(&self) -> DigestResult<String> {
        let sectors = self.repository.get_all()?;

        let mut opml = OPML::default();
        opml.head = Some(opml::Head {
            title: Some("Deal Digest Sectors".to_string()),
            ..Default::default()
        });

        for sector in sectors {
            let outline = Outline {
                text: sector.name.clone(),
                r#type: Some("rss".to_string()),
                xml_url: Some(sector.feed_url.clone()),
                title: Some(sector.name),
                description: sector.query,
                ..Default::default()
            };
            opml.body.outlines.push(outline);
        }

        opml.to_string()
            .map_err(|e| DigestError::OpmlParse(e.to_string()))
    }
}
