pub mod traits;
pub mod rss_atom;
pub mod google_news;
pub mod registry;

pub use traits::DealSource;
pub use google_news::{google_news_url, GoogleNewsSource};
pub use rss_atom::RssAtomSource;
pub use registry::SourceRegistry;

use std::time::Duration;

use reqwest::blocking::Client;

const USER_AGENT: &str = concat!("deal-digest/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
}
