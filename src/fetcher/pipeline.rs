use crate::fetcher::types::PageResponse;
use encoding_rs::Encoding;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

/// How many leading bytes are searched for a `<meta charset>` declaration.
const META_SNIFF_LEN: usize = 4096;

pub fn process_response(url_final: Url, content_type: &str, body_raw: &[u8]) -> PageResponse {
    let encoding = detect_encoding(content_type, body_raw);
    let body_utf8 = decode_to_utf8(body_raw, encoding);

    PageResponse { url_final, body_utf8 }
}

/// Header charset first, then the page's own meta declaration, then a guess.
pub fn detect_encoding(content_type: &str, body: &[u8]) -> &'static Encoding {
    if let Some(encoding) = label_from(&CHARSET_REGEX, content_type) {
        return encoding;
    }

    let head = &body[..body.len().min(META_SNIFF_LEN)];
    let head_str = String::from_utf8_lossy(head);
    if let Some(encoding) = label_from(&META_CHARSET_REGEX, &head_str) {
        return encoding;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, false);
    detector.guess(None, true)
}

fn label_from(regex: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = regex.captures(haystack)?.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes())
}

/// News pages regularly carry stray bytes; undecodable sequences become U+FFFD.
fn decode_to_utf8(body: &[u8], encoding: &'static Encoding) -> String {
    let (decoded, _encoding, _had_errors) = encoding.decode(body);
    decoded.into_owned()
}
