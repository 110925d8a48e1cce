use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::extractor::model::ImageTag;

static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Every `<img>` in document order.
pub fn collect_image_tags(document: &Html) -> Vec<ImageTag> {
    document
        .select(&IMG)
        .map(|element| ImageTag {
            src: element.value().attr("src").map(str::to_string),
            alt: element.value().attr("alt").map(str::to_string),
            has_srcset: element.value().attr("srcset").is_some(),
            parent_is_link: parent_is_link(element),
        })
        .collect()
}

/// Targets of `<a href>` links that point straight at a jpg or png file.
pub fn collect_image_links(document: &Html) -> Vec<String> {
    document
        .select(&ANCHOR)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| href.ends_with(".jpg") || href.ends_with(".png"))
        .map(str::to_string)
        .collect()
}

fn parent_is_link(element: ElementRef<'_>) -> bool {
    element
        .parent()
        .and_then(ElementRef::wrap)
        .is_some_and(|parent| parent.value().name() == "a")
}

/// Joins a source that has no scheme or host onto the page origin.
/// Absolute and otherwise unparsable sources give `None`.
pub fn nested_url(src: &str, origin: &Url) -> Option<Url> {
    match Url::parse(src) {
        Err(url::ParseError::RelativeUrlWithoutBase) => origin.join(src).ok(),
        _ => None,
    }
}

/// Only jpg and png files are taken from a resolved relative source. The
/// whole address has to end with the extension, query strings included.
pub fn has_image_extension(url: &Url) -> bool {
    let address = url.as_str();
    address.ends_with("jpg") || address.ends_with("png")
}
