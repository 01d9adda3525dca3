pub mod traits;
pub mod sqlite;

pub use traits::{SectorRepository, SeenDeal, SeenDealRepository};
pub use sqlite::{SqliteSectorRepository, SqliteSeenDealRepository, SqliteStorage};
