use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use crate::extractor::model::ImageTag;

const PROHIBITED_EXTENSIONS: [&str; 2] = ["gif", "svg"];

const TRACKING_MARKERS: [&str; 5] = [
    "stats",
    "scorecardresearch",
    "noscript",
    "top-fwz1",
    "mc.yandex.ru",
];

// 200x200, 670x50, 10:10 ...
static ICON_DIMENSIONS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d0{1,2}(:|x)\d{1,2}0").unwrap());

/// Why an image tag was turned away. Variants are listed in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectRule {
    MissingSource,
    ProhibitedExtension,
    LinkWrapped,
    Duplicate,
    DoubleColon,
    BbcPlaceholder,
    TrackingDomain,
    IconDimensions,
}

const RULES: [RejectRule; 8] = [
    RejectRule::MissingSource,
    RejectRule::ProhibitedExtension,
    RejectRule::LinkWrapped,
    RejectRule::Duplicate,
    RejectRule::DoubleColon,
    RejectRule::BbcPlaceholder,
    RejectRule::TrackingDomain,
    RejectRule::IconDimensions,
];

impl RejectRule {
    fn matches(self, tag: &ImageTag, src: &str, session: &ScanSession) -> bool {
        match self {
            Self::MissingSource => src.is_empty(),
            Self::ProhibitedExtension => PROHIBITED_EXTENSIONS.iter().any(|ext| src.ends_with(ext)),
            Self::LinkWrapped => tag.parent_is_link,
            Self::Duplicate => session.has_accepted(src),
            Self::DoubleColon => src.contains("::"),
            Self::BbcPlaceholder => src.contains("bbc") && (!tag.has_srcset || src.contains("line")),
            Self::TrackingDomain => TRACKING_MARKERS.iter().any(|marker| src.contains(marker)),
            Self::IconDimensions => ICON_DIMENSIONS_REGEX.is_match(src),
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Self::MissingSource => "no image source",
            Self::ProhibitedExtension => "prohibited extension",
            Self::LinkWrapped => "wrapped in a hyperlink",
            Self::Duplicate => "already accepted on this page",
            Self::DoubleColon => "broken '::' link",
            Self::BbcPlaceholder => "bbc placeholder",
            Self::TrackingDomain => "tracking pixel",
            Self::IconDimensions => "icon-sized image",
        }
    }
}

/// Sources accepted during one page scan. Each scan owns a fresh session.
#[derive(Debug, Default)]
pub struct ScanSession {
    accepted: HashSet<String>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_accepted(&self, src: &str) -> bool {
        self.accepted.contains(src)
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }
}

/// First rule that rejects `tag`, if any. Does not touch the session.
pub fn rejection(tag: &ImageTag, session: &ScanSession) -> Option<RejectRule> {
    let src = tag.src.as_deref().unwrap_or_default();
    RULES
        .iter()
        .copied()
        .find(|rule| rule.matches(tag, src, session))
}

/// Runs the rule chain and records the source in `session` when accepted.
pub fn accept(tag: &ImageTag, session: &mut ScanSession) -> bool {
    match rejection(tag, session) {
        Some(rule) => {
            debug!(src = tag.src.as_deref().unwrap_or_default(), reason = rule.reason(), "image rejected");
            false
        }
        None => {
            if let Some(src) = &tag.src {
                session.accepted.insert(src.clone());
            }
            true
        }
    }
}

/// Alt text that embeds markup is dropped; the image itself is unaffected.
pub fn accept_caption(alt: Option<&str>) -> Option<String> {
    alt.filter(|caption| !caption.contains("href"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(src: &str) -> ImageTag {
        ImageTag {
            has_srcset: true,
            ..ImageTag::new(src)
        }
    }

    #[test]
    fn test_accept_plain_image() {
        let mut session = ScanSession::new();
        assert!(accept(&tag("https://example.com/photo.jpg"), &mut session));
        assert_eq!(session.accepted_count(), 1);
    }

    #[test]
    fn test_reject_missing_source() {
        let session = ScanSession::new();
        assert_eq!(
            rejection(&ImageTag::default(), &session),
            Some(RejectRule::MissingSource)
        );
        assert_eq!(rejection(&tag(""), &session), Some(RejectRule::MissingSource));
    }

    #[test]
    fn test_reject_prohibited_extensions() {
        let mut session = ScanSession::new();
        assert!(!accept(&tag("https://example.com/spinner.gif"), &mut session));
        assert!(!accept(&tag("https://example.com/logo.svg"), &mut session));
        assert_eq!(session.accepted_count(), 0);
    }

    #[test]
    fn test_reject_link_wrapped() {
        let mut wrapped = tag("https://example.com/thumb.jpg");
        wrapped.parent_is_link = true;
        assert_eq!(
            rejection(&wrapped, &ScanSession::new()),
            Some(RejectRule::LinkWrapped)
        );
    }

    #[test]
    fn test_duplicate_within_session() {
        let mut session = ScanSession::new();
        let image = tag("https://example.com/photo.jpg");

        assert!(accept(&image, &mut session));
        assert!(!accept(&image, &mut session));
        assert_eq!(rejection(&image, &session), Some(RejectRule::Duplicate));
    }

    #[test]
    fn test_fresh_session_accepts_again() {
        let image = tag("https://example.com/photo.jpg");

        let mut first = ScanSession::new();
        assert!(accept(&image, &mut first));
        assert!(!accept(&image, &mut first));

        let mut second = ScanSession::new();
        assert!(accept(&image, &mut second));
    }

    #[test]
    fn test_rejected_source_is_not_recorded() {
        let mut session = ScanSession::new();
        let mut wrapped = tag("https://example.com/photo.jpg");
        wrapped.parent_is_link = true;

        assert!(!accept(&wrapped, &mut session));
        assert!(accept(&tag("https://example.com/photo.jpg"), &mut session));
    }

    #[test]
    fn test_reject_double_colon() {
        assert_eq!(
            rejection(&tag("https://example.com/a::b.jpg"), &ScanSession::new()),
            Some(RejectRule::DoubleColon)
        );
    }

    #[test]
    fn test_bbc_rules() {
        let session = ScanSession::new();

        let mut no_srcset = tag("https://ichef.bbci.co.uk/news/photo.jpg");
        no_srcset.has_srcset = false;
        assert_eq!(rejection(&no_srcset, &session), Some(RejectRule::BbcPlaceholder));

        let line_art = tag("https://ichef.bbci.co.uk/news/grey-placeholder-line.png");
        assert_eq!(rejection(&line_art, &session), Some(RejectRule::BbcPlaceholder));

        let responsive = tag("https://ichef.bbci.co.uk/news/photo.jpg");
        assert_eq!(rejection(&responsive, &session), None);
    }

    #[test]
    fn test_reject_tracking_domains() {
        let session = ScanSession::new();
        for src in [
            "https://stats.example.com/p.jpg",
            "https://sb.scorecardresearch.com/p?c1=2",
            "https://example.com/noscript/pixel.png",
            "https://top-fwz1.mail.ru/counter",
            "https://mc.yandex.ru/watch/123",
        ] {
            assert_eq!(
                rejection(&tag(src), &session),
                Some(RejectRule::TrackingDomain),
                "{src}"
            );
        }
    }

    #[test]
    fn test_reject_icon_dimensions() {
        let mut session = ScanSession::new();
        assert!(!accept(&tag("https://example.com/img/200x200/a.jpg"), &mut session));
        assert!(!accept(&tag("https://example.com/img/670x50/a.jpg"), &mut session));
        assert!(!accept(&tag("https://example.com/img/a_10:10.jpg"), &mut session));
        assert!(accept(&tag("https://example.com/img/1024x768/a.jpg"), &mut session));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mut wrapped_gif = tag("https://example.com/banner.gif");
        wrapped_gif.parent_is_link = true;
        assert_eq!(
            rejection(&wrapped_gif, &ScanSession::new()),
            Some(RejectRule::ProhibitedExtension)
        );
    }

    #[test]
    fn test_caption_with_markup_dropped() {
        assert_eq!(accept_caption(Some("A storm")), Some("A storm".to_string()));
        assert_eq!(accept_caption(Some(r#"<a href="/x">x</a>"#)), None);
        assert_eq!(accept_caption(None), None);
    }
}
