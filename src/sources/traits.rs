use crate::domain::{RawEntry, Sector, SourceKind};
use crate::errors::DigestResult;

pub trait DealSource: Send + Sync {
    /// Identifies this source kind
    fn source_kind(&self) -> SourceKind;

    /// Check if this source can fetch the given feed URL
    fn can_handle(&self, url: &str) -> bool;

    /// Fetch and parse every entry of the sector's feed
    fn fetch(&self, sector: &Sector) -> DigestResult<Vec<RawEntry>>;
}
