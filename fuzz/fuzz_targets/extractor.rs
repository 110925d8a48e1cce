#![no_main]

use libfuzzer_sys::fuzz_target;

use rss_reader::extractor::{ScanSession, filter, scan_page};

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);

    // Scanning and filtering must never panic, whatever the page looks like
    let scan = scan_page(&html);
    let mut session = ScanSession::new();
    for tag in &scan.image_tags {
        filter::accept(tag, &mut session);
    }
    let _ = scan.description.resolve();
});
