use std::fs;

use crate::extractor::filter::{self, RejectRule, ScanSession};
use crate::extractor::{NO_DESCRIPTION, scan_page};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

#[test]
fn test_scan_article_page() {
    let scan = scan_page(&fixture("article.html"));

    assert_eq!(scan.image_tags.len(), 8);
    assert_eq!(
        scan.image_links,
        vec!["https://cdn.example.com/maps/closures.png"]
    );
    assert_eq!(
        scan.description.resolve(),
        "Heavy rain and high winds closed roads along the coast overnight."
    );
}

#[test]
fn test_filter_article_images_in_document_order() {
    let scan = scan_page(&fixture("article.html"));
    let mut session = ScanSession::new();

    let verdicts: Vec<Option<RejectRule>> = scan
        .image_tags
        .iter()
        .map(|tag| {
            let verdict = filter::rejection(tag, &session);
            filter::accept(tag, &mut session);
            verdict
        })
        .collect();

    assert_eq!(
        verdicts,
        vec![
            Some(RejectRule::LinkWrapped),
            Some(RejectRule::ProhibitedExtension),
            Some(RejectRule::TrackingDomain),
            None,
            None,
            Some(RejectRule::Duplicate),
            Some(RejectRule::IconDimensions),
            None,
        ]
    );
    assert_eq!(session.accepted_count(), 3);
}

#[test]
fn test_captions_of_accepted_images() {
    let scan = scan_page(&fixture("article.html"));
    let mut session = ScanSession::new();

    let captions: Vec<Option<String>> = scan
        .image_tags
        .iter()
        .filter(|tag| filter::accept(tag, &mut session))
        .map(|tag| filter::accept_caption(tag.alt.as_deref()))
        .collect();

    assert_eq!(
        captions,
        vec![
            Some("A flooded road near the harbour".to_string()),
            Some("The harbour at dawn".to_string()),
            None,
        ]
    );
}

#[test]
fn test_bare_page_falls_back_to_title() {
    let scan = scan_page(&fixture("bare.html"));

    assert!(scan.image_tags.is_empty());
    assert!(scan.image_links.is_empty());
    assert_eq!(scan.description.resolve(), "Council meeting postponed");
}

#[test]
fn test_malformed_html() {
    let html = "<html><head><title>Broken</title><body><p>Unclosed tags<img src=\"/a.jpg\" alt=\"x\"><div>More";
    let scan = scan_page(html);

    assert_eq!(scan.image_tags.len(), 1);
    assert_eq!(scan.image_tags[0].src.as_deref(), Some("/a.jpg"));
    assert_eq!(scan.description.resolve(), "Broken");
}

#[test]
fn test_empty_document() {
    let scan = scan_page("");

    assert!(scan.image_tags.is_empty());
    assert_eq!(scan.description.resolve(), NO_DESCRIPTION);
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_scan_never_panics(html in ".*") {
            let scan = scan_page(&html);
            let mut session = ScanSession::new();
            for tag in &scan.image_tags {
                filter::accept(tag, &mut session);
            }
            let _ = scan.description.resolve();
        }

        #[test]
        fn test_session_only_holds_accepted(srcs in prop::collection::vec("[a-z0-9/:.x]{0,24}", 0..16)) {
            let html: String = srcs
                .iter()
                .map(|src| format!("<img src=\"{src}\">"))
                .collect();
            let scan = scan_page(&html);
            let mut session = ScanSession::new();
            let accepted = scan
                .image_tags
                .iter()
                .filter(|tag| filter::accept(tag, &mut session))
                .count();
            prop_assert_eq!(accepted, session.accepted_count());
        }
    }
}
