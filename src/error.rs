use chrono::NaiveDate;
use thiserror::Error;

use crate::config::ConfigError;

/// Failures that stop a run. Per-article page problems never show up here;
/// the enricher absorbs them.
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("can't reach {url}: {reason}")]
    FeedUnavailable { url: String, reason: String },

    #[error("403 Forbidden, can't connect to the server at this time")]
    FeedForbidden,

    #[error("404 Not Found, page not found")]
    FeedNotFound,

    #[error("the website should provide RSS-news: {0}")]
    NotRss(String),

    #[error("can't parse publication date '{0}'")]
    InvalidDate(String),

    #[error("no news for the specified date ({})", .0.format("%Y%m%d"))]
    NoNewsForDate(NaiveDate),

    #[error("news storage file doesn't exist, run program with the 'source' argument first")]
    StorageMissing,

    #[error("news storage: {0}")]
    Storage(#[from] std::io::Error),

    #[error("news serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("can't write output: {0}")]
    Output(std::io::Error),

    #[error("can't render pdf: {0}")]
    Pdf(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("article task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ReaderError>;
