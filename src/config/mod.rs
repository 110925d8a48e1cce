//! Configuration handling for the reader.
//!
//! Everything here has a development default so the binary runs with no
//! environment at all. `Config::from_env` reads overrides and rejects values
//! that do not parse, naming the offending variable.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable names, public so tests can set them.
pub const ENV_STORAGE_PATH: &str = "RSS_READER_STORAGE_PATH";
pub const ENV_FEED_TIMEOUT_SECS: &str = "RSS_READER_FEED_TIMEOUT_SECS";
pub const ENV_FEED_ATTEMPTS: &str = "RSS_READER_FEED_ATTEMPTS";
pub const ENV_FEED_BACKOFF_MS: &str = "RSS_READER_FEED_BACKOFF_MS";
pub const ENV_PAGE_TIMEOUT_SECS: &str = "RSS_READER_PAGE_TIMEOUT_SECS";
pub const ENV_PROBE_TIMEOUT_SECS: &str = "RSS_READER_PROBE_TIMEOUT_SECS";
pub const ENV_CONCURRENCY: &str = "RSS_READER_CONCURRENCY";
pub const ENV_MAX_PROBES: &str = "RSS_READER_MAX_PROBES";
pub const ENV_PDF_FONT: &str = "RSS_READER_PDF_FONT";

const DEFAULT_STORAGE_PATH: &str = "stored_news.json";
const DEFAULT_FEED_TIMEOUT_SECS: u64 = 3;
const DEFAULT_FEED_ATTEMPTS: u32 = 3;
const DEFAULT_FEED_BACKOFF_MS: u64 = 500;
const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONCURRENCY: usize = 16;
const DEFAULT_MAX_PROBES: usize = 8;

/// Reader runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    storage_path: PathBuf,
    feed_timeout: Duration,
    feed_attempts: u32,
    feed_backoff: Duration,
    page_timeout: Duration,
    probe_timeout: Duration,
    concurrency: usize,
    max_probes: usize,
    pdf_font: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            feed_timeout: Duration::from_secs(DEFAULT_FEED_TIMEOUT_SECS),
            feed_attempts: DEFAULT_FEED_ATTEMPTS,
            feed_backoff: Duration::from_millis(DEFAULT_FEED_BACKOFF_MS),
            page_timeout: Duration::from_secs(DEFAULT_PAGE_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            max_probes: DEFAULT_MAX_PROBES,
            pdf_font: None,
        }
    }
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage_path = env::var(ENV_STORAGE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_PATH));

        let feed_attempts = read_positive(ENV_FEED_ATTEMPTS, DEFAULT_FEED_ATTEMPTS)?;
        let concurrency = read_positive(ENV_CONCURRENCY, DEFAULT_CONCURRENCY)?;
        let max_probes = read_positive(ENV_MAX_PROBES, DEFAULT_MAX_PROBES)?;

        Ok(Self {
            storage_path,
            feed_timeout: Duration::from_secs(read_positive(
                ENV_FEED_TIMEOUT_SECS,
                DEFAULT_FEED_TIMEOUT_SECS,
            )?),
            feed_attempts,
            feed_backoff: Duration::from_millis(read_var(ENV_FEED_BACKOFF_MS, DEFAULT_FEED_BACKOFF_MS)?),
            page_timeout: Duration::from_secs(read_positive(
                ENV_PAGE_TIMEOUT_SECS,
                DEFAULT_PAGE_TIMEOUT_SECS,
            )?),
            probe_timeout: Duration::from_secs(read_positive(
                ENV_PROBE_TIMEOUT_SECS,
                DEFAULT_PROBE_TIMEOUT_SECS,
            )?),
            concurrency,
            max_probes,
            pdf_font: env::var_os(ENV_PDF_FONT)
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }

    pub fn with_feed_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.feed_attempts = attempts.max(1);
        self.feed_backoff = backoff;
        self
    }

    pub fn with_timeouts(mut self, feed: Duration, page: Duration, probe: Duration) -> Self {
        self.feed_timeout = feed;
        self.page_timeout = page;
        self.probe_timeout = probe;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize, max_probes: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self.max_probes = max_probes.max(1);
        self
    }

    pub fn with_pdf_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdf_font = Some(path.into());
        self
    }

    /// JSON file holding the date-grouped news.
    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }
    pub fn feed_timeout(&self) -> Duration {
        self.feed_timeout
    }
    /// Total tries for the feed download, first one included.
    pub fn feed_attempts(&self) -> u32 {
        self.feed_attempts
    }
    /// Base delay between feed download attempts.
    pub fn feed_backoff(&self) -> Duration {
        self.feed_backoff
    }
    pub fn page_timeout(&self) -> Duration {
        self.page_timeout
    }
    /// Timeout for image reachability and existence checks.
    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }
    /// Articles enriched at the same time.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
    /// Image probes in flight per article page.
    pub fn max_probes(&self) -> usize {
        self.max_probes
    }
    /// TrueType font embedded in PDF output; Helvetica when unset.
    pub fn pdf_font(&self) -> Option<&Path> {
        self.pdf_font.as_deref()
    }
}

fn read_var<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            field: key,
            reason: format!("'{raw}': {e}"),
        }),
        Err(_) => Ok(default),
    }
}

fn read_positive<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default + Copy,
    T::Err: Display,
{
    let value = read_var(key, default)?;
    if value <= T::default() {
        return Err(ConfigError::InvalidValue {
            field: key,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
