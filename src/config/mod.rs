use std::str::FromStr;

use chrono::TimeDelta;

use crate::errors::{DigestError, DigestResult};

pub const DEFAULT_EXCLUDE_KEYWORDS: &[&str] = &["lawsuit", "fraud", "earnings", "ipo"];

/// Publishers ranked ahead of everyone else when near-duplicate headlines collide
pub const DEFAULT_PREFERRED_SOURCES: &[&str] = &[
    "Bloomberg",
    "Reuters",
    "CNBC",
    "Financial Times",
    "Yahoo Finance",
    "Investopedia",
    "BusinessWire",
    "PR Newswire",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub output_path: String,
    pub firm_name: String,
    pub window_hours: i64,
    pub similarity_threshold: f64,
    pub history_days: i64,
    pub history_retention_days: i64,
    pub exclude_keywords: Vec<String>,
    pub preferred_sources: Vec<String>,
    pub git: GitConfig,
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct GitConfig {
    pub remote: String,
    pub branch: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            branch: "main".to_string(),
            user_name: None,
            user_email: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "./deal-digest.db".to_string(),
            output_path: "index.html".to_string(),
            firm_name: "Centerstone Capital".to_string(),
            window_hours: 24,
            similarity_threshold: 85.0,
            history_days: 3,
            history_retention_days: 30,
            exclude_keywords: to_strings(DEFAULT_EXCLUDE_KEYWORDS),
            preferred_sources: to_strings(DEFAULT_PREFERRED_SOURCES),
            git: GitConfig::default(),
            http_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> DigestResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok(), exe_dir)
    }

    /// Build a config from an arbitrary variable lookup, so parsing can be
    /// tested without touching the process environment.
    pub fn from_lookup<F>(lookup: F, exe_dir: Option<std::path::PathBuf>) -> DigestResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // Default db_path is relative to executable directory
        let db_path = lookup("DIGEST_DB_PATH").unwrap_or_else(|| {
            exe_dir
                .map(|d| d.join("deal-digest.db").to_string_lossy().into_owned())
                .unwrap_or(defaults.db_path)
        });

        let similarity_threshold: f64 = parse_var(&lookup, "DIGEST_SIMILARITY_THRESHOLD")?
            .unwrap_or(defaults.similarity_threshold);
        if !(0.0..=100.0).contains(&similarity_threshold) {
            return Err(DigestError::Config(format!(
                "DIGEST_SIMILARITY_THRESHOLD must be between 0 and 100, got {}",
                similarity_threshold
            )));
        }

        let window_hours: i64 =
            parse_var(&lookup, "DIGEST_WINDOW_HOURS")?.unwrap_or(defaults.window_hours);
        if window_hours <= 0 || TimeDelta::try_hours(window_hours).is_none() {
            return Err(DigestError::Config(format!(
                "DIGEST_WINDOW_HOURS must be a positive number of hours, got {}",
                window_hours
            )));
        }

        let history_days = parse_days(&lookup, "DIGEST_HISTORY_DAYS", defaults.history_days)?;
        let history_retention_days = parse_days(
            &lookup,
            "DIGEST_HISTORY_RETENTION_DAYS",
            defaults.history_retention_days,
        )?;

        let git = GitConfig {
            remote: lookup("DIGEST_GIT_REMOTE").unwrap_or(defaults.git.remote),
            branch: lookup("DIGEST_GIT_BRANCH").unwrap_or(defaults.git.branch),
            user_name: lookup("DIGEST_GIT_USER_NAME").filter(|s| !s.is_empty()),
            user_email: lookup("DIGEST_GIT_USER_EMAIL").filter(|s| !s.is_empty()),
        };

        Ok(Self {
            db_path,
            output_path: lookup("DIGEST_OUTPUT").unwrap_or(defaults.output_path),
            firm_name: lookup("DIGEST_FIRM_NAME").unwrap_or(defaults.firm_name),
            window_hours,
            similarity_threshold,
            history_days,
            history_retention_days,
            exclude_keywords: lookup("DIGEST_EXCLUDE_KEYWORDS")
                .map(|v| split_list(&v, true))
                .unwrap_or(defaults.exclude_keywords),
            preferred_sources: lookup("DIGEST_PREFERRED_SOURCES")
                .map(|v| split_list(&v, false))
                .unwrap_or(defaults.preferred_sources),
            git,
            http_timeout_secs: parse_var(&lookup, "DIGEST_HTTP_TIMEOUT_SECS")?
                .unwrap_or(defaults.http_timeout_secs),
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> DigestResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| DigestError::Config(format!("{} has an invalid value: {}", key, raw))),
    }
}

/// A non-negative day count small enough to subtract from a timestamp
fn parse_days<F>(lookup: &F, key: &str, default: i64) -> DigestResult<i64>
where
    F: Fn(&str) -> Option<String>,
{
    let days: i64 = parse_var(lookup, key)?.unwrap_or(default);
    // Upper bound keeps `now - days` representable
    if !(0..=3_650_000).contains(&days) || TimeDelta::try_days(days).is_none() {
        return Err(DigestError::Config(format!(
            "{} must be between 0 and 3650000 days, got {}",
            key, days
        )));
    }
    Ok(days)
}

fn split_list(value: &str, lowercase: bool) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| if lowercase { s.to_lowercase() } else { s.to_string() })
        .collect()
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
