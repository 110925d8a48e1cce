use std::io::{self, Write};
use std::time::Instant;
use tracing::{info, instrument};

use crate::article::{ArticleRecord, Enricher};
use crate::batch::BatchFormer;
use crate::cli::Args;
use crate::config::Config;
use crate::error::{ReaderError, Result};
use crate::extractor::{PageResolver, ResolverSettings};
use crate::feed::fetch_feed;
use crate::fetcher::build_client;
use crate::render;
use crate::storage::NewsStore;

/// One reader invocation. With a `source` the freshly formed batch is stored
/// and shown; without one the store is read for the requested day and limit.
#[instrument(skip_all, fields(source = args.source.as_deref().unwrap_or("storage")))]
pub async fn run(args: &Args, config: &Config) -> Result<()> {
    args.validate()?;
    let started = Instant::now();

    let records = gather(args, config).await?;
    present(&records, args, config).await?;

    info!(elapsed = ?started.elapsed(), articles = records.len(), "done");
    Ok(())
}

/// The records a run shows, after storing them when they come from a feed.
pub async fn gather(args: &Args, config: &Config) -> Result<Vec<ArticleRecord>> {
    let store = NewsStore::new(config.storage_path());
    match &args.source {
        Some(source) => {
            let records = collect(source, args, config).await?;
            store.save(&records)?;
            Ok(records)
        }
        None => store.load(args.date, args.limit()),
    }
}

/// Downloads the feed and enriches the selected articles.
pub async fn collect(source: &str, args: &Args, config: &Config) -> Result<Vec<ArticleRecord>> {
    let client = build_client().map_err(|e| ReaderError::FeedUnavailable {
        url: source.to_string(),
        reason: e.to_string(),
    })?;

    let feed = fetch_feed(&client, source, config).await?;

    let resolver = PageResolver::new(client, ResolverSettings::from(config));
    let former = BatchFormer::new(Enricher::new(resolver), config.concurrency());
    former
        .form(&feed.title, &feed.items, args.limit(), args.date)
        .await
}

async fn present(records: &[ArticleRecord], args: &Args, config: &Config) -> Result<()> {
    if let Some(dir) = &args.to_html {
        render::write_html(records, dir)?;
    }
    if let Some(dir) = &args.to_pdf {
        let client = build_client().map_err(|e| ReaderError::Pdf(e.to_string()))?;
        render::write_pdf(records, dir, &client, config).await?;
    }
    let to_file = args.to_html.is_some() || args.to_pdf.is_some();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.json {
        render::json::print_records(records, args.colorize, &mut out).map_err(ReaderError::Output)?;
    } else if !to_file {
        render::console::print_records(records, args.colorize, &mut out).map_err(ReaderError::Output)?;
    }

    out.flush().map_err(ReaderError::Output)
}
