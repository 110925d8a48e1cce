use scraper::{ElementRef, Html, Selector};
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::extractor::model::{NO_DESCRIPTION, strip_markup};

static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static LEAD_PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p.lead").unwrap());
static OG_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:description"]"#).unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());

/// Raw text of every page element that can stand in for a missing feed
/// description. Nothing is chosen until [`DescriptionFallback::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionFallback {
    pub meta_description: Option<String>,
    pub lead: Option<String>,
    pub og_description: Option<String>,
    pub title: Option<String>,
    pub heading: Option<String>,
}

impl DescriptionFallback {
    pub fn from_document(document: &Html) -> Self {
        Self {
            meta_description: first_attr(document, &META_DESCRIPTION, "content"),
            lead: first_text(document, &LEAD_PARAGRAPH),
            og_description: first_attr(document, &OG_DESCRIPTION, "content"),
            title: first_text(document, &TITLE),
            heading: first_text(document, &HEADING),
        }
    }

    /// First non-blank source in priority order, else the title as-is.
    pub fn resolve(&self) -> String {
        let found = self
            .meta_description
            .iter()
            .map(|text| Cow::Borrowed(text.as_str()))
            .chain(self.lead.iter().map(|text| Cow::Borrowed(text.as_str())))
            .chain(self.og_description.iter().map(|og| Cow::Owned(strip_markup(og))))
            .chain(self.title.iter().map(|text| Cow::Borrowed(text.as_str())))
            .chain(self.heading.iter().map(|text| Cow::Borrowed(text.as_str())))
            .find(|text| !text.trim().is_empty());

        match (found, &self.title) {
            (Some(text), _) => text.trim().to_string(),
            (None, Some(title)) => title.clone(),
            (None, None) => NO_DESCRIPTION.to_string(),
        }
    }
}

fn first_attr(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(str::to_string)
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}
