use chrono::NaiveDate;
use std::sync::Arc;
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{Instrument, debug, info, info_span, instrument};

use crate::article::{ArticleRecord, Enricher, NO_LINK, parse_pub_date};
use crate::error::{ReaderError, Result};
use crate::feed::FeedItem;

/// Enriches a selection of feed items concurrently and hands them back in
/// feed order.
#[derive(Debug, Clone)]
pub struct BatchFormer {
    enricher: Enricher,
    concurrency: usize,
}

impl BatchFormer {
    pub fn new(enricher: Enricher, concurrency: usize) -> Self {
        Self {
            enricher,
            concurrency: concurrency.max(1),
        }
    }

    #[instrument(skip_all, fields(feed = %feed_title, items = items.len()))]
    pub async fn form(
        &self,
        feed_title: &str,
        items: &[FeedItem],
        limit: Option<usize>,
        target_date: Option<NaiveDate>,
    ) -> Result<Vec<ArticleRecord>> {
        let selected = select_items(items, limit, target_date)?;
        let count = selected.len();
        info!(selected = count, concurrency = self.concurrency, "forming batch");

        let feed_title: Arc<str> = Arc::from(feed_title);
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, item) in selected.into_iter().enumerate() {
            let item = item.clone();
            let enricher = self.enricher.clone();
            let feed_title = Arc::clone(&feed_title);
            let semaphore = Arc::clone(&semaphore);
            let span = info_span!(
                "article",
                index,
                link = item.link.as_deref().unwrap_or(NO_LINK)
            );

            tasks.spawn(
                async move {
                    let _permit = semaphore.acquire_owned().await;
                    let record = enricher.enrich(&feed_title, &item).await;
                    (index, record)
                }
                .instrument(span),
            );
        }

        // Completion order is arbitrary; each result goes back to its slot.
        // Returning early drops the set, which aborts whatever is still running.
        let mut slots: Vec<Option<ArticleRecord>> = vec![None; count];
        while let Some(joined) = tasks.join_next().await {
            let (index, record) = joined?;
            debug!(index, "article finished");
            slots[index] = Some(record?);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

/// Date filter first, then the limit. Both keep feed order.
pub fn select_items<'a>(
    items: &'a [FeedItem],
    limit: Option<usize>,
    target_date: Option<NaiveDate>,
) -> Result<Vec<&'a FeedItem>> {
    let mut selected: Vec<&FeedItem> = match target_date {
        Some(date) => {
            let mut matching = Vec::new();
            for item in items {
                let raw = item.pub_date.as_deref().unwrap_or_default();
                if parse_pub_date(raw)?.date() == date {
                    matching.push(item);
                }
            }
            if matching.is_empty() {
                return Err(ReaderError::NoNewsForDate(date));
            }
            matching
        }
        None => items.iter().collect(),
    };

    if let Some(limit) = limit {
        selected.truncate(limit);
    }
    Ok(selected)
}
