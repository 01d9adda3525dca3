pub mod sector;
pub mod deal;
pub mod digest;

pub use sector::{Sector, SourceKind, OTHER_SECTOR};
pub use deal::{Deal, RawEntry};
pub use digest::{Digest, DigestSection};
