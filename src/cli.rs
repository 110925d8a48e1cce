use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use url::Url;

use crate::error::{ReaderError, Result};
use crate::storage::GROUP_KEY_FORMAT;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "rss-reader", version, about = "Pure Rust command-line RSS reader")]
pub struct Args {
    /// RSS URL
    pub source: Option<String>,

    /// Print result as JSON in stdout
    #[arg(long)]
    pub json: bool,

    /// Outputs verbose status messages
    #[arg(long)]
    pub verbose: bool,

    /// Limit news topics if this parameter provided
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,

    /// Read stored news published on this day (YYYYMMDD)
    #[arg(long, value_parser = parse_cli_date)]
    pub date: Option<NaiveDate>,

    /// Save news to DIR/news.html
    #[arg(long = "to-html", value_name = "DIR")]
    pub to_html: Option<PathBuf>,

    /// Save news to DIR/news.pdf
    #[arg(long = "to-pdf", value_name = "DIR")]
    pub to_pdf: Option<PathBuf>,

    /// Print news in random colours
    #[arg(long)]
    pub colorize: bool,
}

impl Args {
    pub fn limit(&self) -> Option<usize> {
        self.limit.map(|limit| usize::try_from(limit).unwrap_or(usize::MAX))
    }

    /// Checks the combinations clap cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.source.is_none() && self.date.is_none() {
            return Err(ReaderError::InvalidInput(
                "the 'source' argument or the '--date' option is required".to_string(),
            ));
        }

        if let Some(source) = &self.source {
            validate_source(source)?;
        }

        for (kind, dir) in [("html", &self.to_html), ("pdf", &self.to_pdf)] {
            if let Some(dir) = dir
                && !dir.is_dir()
            {
                return Err(ReaderError::InvalidInput(format!(
                    "the path for the {kind} file doesn't exist: {}",
                    dir.display()
                )));
            }
        }

        if self.limit == Some(0) {
            return Err(ReaderError::InvalidInput("the limit must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn validate_source(source: &str) -> Result<()> {
    let invalid = || ReaderError::InvalidInput(format!("invalid url: '{source}'"));

    if !source.contains("http") {
        return Err(invalid());
    }
    let url = Url::parse(source).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none_or(str::is_empty) {
        return Err(invalid());
    }
    Ok(())
}

/// Accepts exactly eight digits forming a real calendar day, e.g. `20240305`.
pub fn parse_cli_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{raw}' doesn't match the YYYYMMDD format"));
    }
    NaiveDate::parse_from_str(raw, GROUP_KEY_FORMAT).map_err(|e| format!("'{raw}': {e}"))
}
