pub mod sector_service;
pub mod fetch_service;
pub mod filter_service;
pub mod dedup_service;
pub mod history_service;
pub mod digest_service;
pub mod render_service;
pub mod publish_service;
pub mod import_export_service;

pub use sector_service::SectorService;
pub use fetch_service::{FetchResult, FetchService};
pub use filter_service::{FilterService, Rejection};
pub use dedup_service::{token_set_ratio, DedupService};
pub use history_service::HistoryService;
pub use digest_service::{BuildOutcome, DigestService};
pub use render_service::RenderService;
pub use publish_service::{CommandGitRunner, GitRunner, PublishOutcome, PublishService};
pub use import_export_service::ImportExportService;
