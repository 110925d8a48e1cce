pub mod date;

pub use date::{DATE_FORMAT, normalize_pub_date, parse_pub_date};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::{instrument, warn};

use crate::error::{ReaderError, Result};
use crate::extractor::{ImageCandidate, NO_DESCRIPTION, PageResolver, ResolvedPage, strip_markup};
use crate::feed::FeedItem;

/// Stands in for the link of an item that has none.
pub const NO_LINK: &str = "no link provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Link,
    Image,
}

impl Display for LinkKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkKind::Link => write!(f, "link"),
            LinkKind::Image => write!(f, "image"),
        }
    }
}

/// One numbered reference of an article. `label` is `[N]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageLink {
    pub label: String,
    pub url: String,
    pub kind: LinkKind,
}

impl ImageLink {
    fn numbered(number: usize, url: impl Into<String>, kind: LinkKind) -> Self {
        Self {
            label: format!("[{number}]"),
            url: url.into(),
            kind,
        }
    }
}

/// A feed item with its page images and description worked in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub feed: String,
    pub title: String,
    pub date: String,
    pub link: String,
    pub description: String,
    pub images: Vec<ImageLink>,
}

impl ArticleRecord {
    pub fn published(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, DATE_FORMAT).ok()
    }

    pub fn published_on(&self) -> Option<NaiveDate> {
        self.published().map(|published| published.date())
    }
}

/// Turns feed items into article records. Cheap to clone into tasks.
#[derive(Debug, Clone)]
pub struct Enricher {
    resolver: PageResolver,
}

impl Enricher {
    pub fn new(resolver: PageResolver) -> Self {
        Self { resolver }
    }

    /// Fails only when the item's date cannot be read. Page problems leave
    /// the article without images.
    #[instrument(skip_all, fields(title = %item.title))]
    pub async fn enrich(&self, feed_title: &str, item: &FeedItem) -> Result<ArticleRecord> {
        let date = match item.pub_date.as_deref() {
            Some(raw) => normalize_pub_date(raw)?,
            None => return Err(ReaderError::InvalidDate(String::new())),
        };

        let Some(link) = item.link.as_deref() else {
            return Ok(ArticleRecord {
                feed: format!("{feed_title}\n"),
                title: item.title.clone(),
                date,
                link: NO_LINK.to_string(),
                description: inline_description(item).unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                images: build_links(None, &[]),
            });
        };

        let page = match self.resolver.resolve(link).await {
            Ok(page) => Some(page),
            Err(e) => {
                warn!(link, error = %e, "article page unavailable");
                None
            }
        };

        let images = page.as_ref().map(|p| p.images.as_slice()).unwrap_or_default();
        let description = compose_description(images, inline_description(item), || {
            page.as_ref()
                .map(|ResolvedPage { description, .. }| description.resolve())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string())
        });

        Ok(ArticleRecord {
            feed: format!("{feed_title}\n"),
            title: item.title.clone(),
            date,
            link: link.to_string(),
            description,
            images: build_links(Some(link), images),
        })
    }
}

/// The item's own description without markup, if it says anything.
fn inline_description(item: &FeedItem) -> Option<String> {
    item.description
        .as_deref()
        .map(strip_markup)
        .filter(|text| !text.trim().is_empty())
}

/// Image markers numbered from 2, then the inline text or the page fallback.
pub fn compose_description(
    images: &[ImageCandidate],
    inline: Option<String>,
    fallback: impl FnOnce() -> String,
) -> String {
    let mut description: String = images
        .iter()
        .enumerate()
        .map(|(i, image)| {
            let caption = image
                .caption
                .as_deref()
                .filter(|caption| !caption.trim().is_empty())
                .unwrap_or(NO_DESCRIPTION);
            format!("[image {n}: {caption}][{n}]", n = i + 2)
        })
        .collect();

    description.push_str(&inline.unwrap_or_else(fallback));
    description
}

/// `[1]` is the article itself; images follow from `[2]`.
pub fn build_links(link: Option<&str>, images: &[ImageCandidate]) -> Vec<ImageLink> {
    let Some(link) = link else {
        return vec![ImageLink::numbered(1, NO_LINK, LinkKind::Link)];
    };

    std::iter::once(ImageLink::numbered(1, link, LinkKind::Link))
        .chain(
            images
                .iter()
                .enumerate()
                .map(|(i, image)| ImageLink::numbered(i + 2, image.url.clone(), LinkKind::Image)),
        )
        .collect()
}
