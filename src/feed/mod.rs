pub mod backoff;

pub use backoff::calculate_backoff_delay;

use reqwest::{Client, StatusCode};
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::{ReaderError, Result};
use crate::fetcher::{self, FetchError};

/// One `<item>` of the channel, as read from the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub pub_date: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

impl From<&rss::Item> for FeedItem {
    fn from(item: &rss::Item) -> Self {
        Self {
            title: item.title().unwrap_or_default().to_string(),
            pub_date: item.pub_date().map(str::to_string),
            link: item
                .link()
                .map(str::trim)
                .filter(|link| !link.is_empty())
                .map(str::to_string),
            description: item.description().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    pub title: String,
    pub items: Vec<FeedItem>,
}

impl Feed {
    pub fn from_channel(channel: &rss::Channel) -> Self {
        Self {
            title: channel.title().to_string(),
            items: channel.items().iter().map(FeedItem::from).collect(),
        }
    }

    /// Parses an RSS 2.0 document. Anything else is `NotRss`.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let channel =
            rss::Channel::read_from(body).map_err(|e| ReaderError::NotRss(e.to_string()))?;
        Ok(Self::from_channel(&channel))
    }
}

/// Downloads and parses the feed, retrying transient failures.
#[instrument(skip(client, config))]
pub async fn fetch_feed(client: &Client, url: &str, config: &Config) -> Result<Feed> {
    let attempts = config.feed_attempts().max(1);
    let mut attempt = 0;

    let body = loop {
        match fetcher::fetch_bytes(client, url, config.feed_timeout()).await {
            Ok(body) => break body,
            Err(e) if e.should_retry() && attempt + 1 < attempts => {
                let delay = calculate_backoff_delay(attempt, config.feed_backoff());
                warn!(attempt = attempt + 1, error = %e, ?delay, "feed download failed, retrying");
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(feed_error(url, e)),
        }
    };

    let feed = Feed::parse(&body)?;
    info!(title = %feed.title, items = feed.items.len(), "feed loaded");
    Ok(feed)
}

fn feed_error(url: &str, err: FetchError) -> ReaderError {
    match err {
        FetchError::Http { status, .. } if status == StatusCode::FORBIDDEN => {
            ReaderError::FeedForbidden
        }
        FetchError::Http { status, .. } if status == StatusCode::NOT_FOUND => {
            ReaderError::FeedNotFound
        }
        other => ReaderError::FeedUnavailable {
            url: url.to_string(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example News</title>
    <link>https://news.example.com/</link>
    <description>Latest</description>
    <item>
      <title>First story</title>
      <link>https://news.example.com/first</link>
      <pubDate>Tue, 05 Mar 2024 10:15:00 GMT</pubDate>
      <description>&lt;p&gt;Summary&lt;/p&gt;</description>
    </item>
    <item>
      <title>Linkless story</title>
      <link>   </link>
      <pubDate>Wed, 06 Mar 2024 08:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_channel() {
        let feed = Feed::parse(SAMPLE.as_bytes()).unwrap();

        assert_eq!(feed.title, "Example News");
        assert_eq!(feed.items.len(), 2);

        let first = &feed.items[0];
        assert_eq!(first.title, "First story");
        assert_eq!(first.link.as_deref(), Some("https://news.example.com/first"));
        assert_eq!(first.pub_date.as_deref(), Some("Tue, 05 Mar 2024 10:15:00 GMT"));
        assert_eq!(first.description.as_deref(), Some("<p>Summary</p>"));

        let second = &feed.items[1];
        assert_eq!(second.link, None);
        assert_eq!(second.description, None);
    }

    #[test]
    fn test_html_is_not_rss() {
        let err = Feed::parse(b"<html><body>not a feed</body></html>").unwrap_err();
        assert!(matches!(err, ReaderError::NotRss(_)));
    }

    #[test]
    fn test_status_mapping() {
        let forbidden = FetchError::Http {
            status: StatusCode::FORBIDDEN,
            retriable: false,
        };
        assert!(matches!(feed_error("u", forbidden), ReaderError::FeedForbidden));

        let missing = FetchError::Http {
            status: StatusCode::NOT_FOUND,
            retriable: false,
        };
        assert!(matches!(feed_error("u", missing), ReaderError::FeedNotFound));

        let err = feed_error("https://x.test/rss", FetchError::ConnectTimeout);
        assert_eq!(err.to_string(), "can't reach https://x.test/rss: connect timeout");
    }
}
