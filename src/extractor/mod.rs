pub mod description;
pub mod filter;
pub mod images;
pub mod model;
pub mod resolver;

#[cfg(test)]
mod tests;

pub use description::DescriptionFallback;
pub use filter::{RejectRule, ScanSession};
pub use model::{ImageCandidate, ImageTag, NO_DESCRIPTION, PageScan, strip_markup};
pub use resolver::{PageResolver, ResolvedPage, ResolverSettings};

use scraper::Html;

/// Parses the page once and pulls out everything the resolver needs.
/// The parsed tree never leaves this function.
pub fn scan_page(html: &str) -> PageScan {
    let document = Html::parse_document(html);

    PageScan {
        image_tags: images::collect_image_tags(&document),
        image_links: images::collect_image_links(&document),
        description: DescriptionFallback::from_document(&document),
    }
}
