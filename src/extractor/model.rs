use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::extractor::description::DescriptionFallback;

/// Placeholder used wherever a caption or description could not be found.
pub const NO_DESCRIPTION: &str = "no description";

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<.*?>").unwrap());

/// An image kept for an article, in page discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCandidate {
    pub url: String,
    pub caption: Option<String>,
}

/// The attributes of one `<img>` element the acceptance filter looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageTag {
    pub src: Option<String>,
    pub alt: Option<String>,
    pub has_srcset: bool,
    pub parent_is_link: bool,
}

impl ImageTag {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Self::default()
        }
    }
}

/// Everything the resolver needs from a page, detached from the parsed tree.
#[derive(Debug, Clone, Default)]
pub struct PageScan {
    pub image_tags: Vec<ImageTag>,
    pub image_links: Vec<String>,
    pub description: DescriptionFallback,
}

/// Drops every `<...>` span and decodes HTML entities.
pub fn strip_markup(text: &str) -> String {
    let without_tags = TAG_REGEX.replace_all(text, "");
    if !without_tags.contains('&') {
        return without_tags.trim().to_string();
    }

    let fragment = Html::parse_fragment(&without_tags);
    fragment
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}
