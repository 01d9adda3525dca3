mod connection;
mod sector_repository;
mod seen_deal_repository;

pub use connection::SqliteStorage;
pub use sector_repository::SqliteSectorRepository;
pub use seen_deal_repository::SqliteSeenDealRepository;
