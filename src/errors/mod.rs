use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigestError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Sector errors
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(String),

    #[error("Sector not found: {0}")]
    SectorNotFound(String),

    #[error("Sector already exists: {0}")]
    SectorAlreadyExists(String),

    #[error("Unsupported feed source: {0}")]
    UnsupportedSource(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed returned HTTP {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Every sector failed to fetch ({0} sectors)")]
    AllSectorsFailed(usize),

    // Parsing errors
    #[error("Feed parsing failed: {0}")]
    FeedParse(String),

    #[error("OPML parsing failed: {0}")]
    OpmlParse(String),

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Corrupt history record: {0}")]
    CorruptRecord(String),

    // Output errors
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Page rendering failed: {0}")]
    Template(#[from] askama::Error),

    // Publishing errors
    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type DigestResult<T> = Result<T, DigestError>;
