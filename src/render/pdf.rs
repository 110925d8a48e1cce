//! PDF output.
//!
//! Images are downloaded up front, then the document is laid out top to
//! bottom on A4 pages. An image that can't be downloaded or decoded is
//! printed as its address instead. Text uses Helvetica unless a TrueType
//! font is configured; Helvetica only covers ASCII, other characters
//! become `?`.

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use image::DynamicImage;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::article::{ArticleRecord, LinkKind};
use crate::config::Config;
use crate::error::{ReaderError, Result};
use crate::fetcher::fetch_bytes;
use crate::render::html::{image_caption, strip_markers};

pub const PDF_FILE_NAME: &str = "news.pdf";

const DOCUMENT_TITLE: &str = "RSS news";
const LAYER_NAME: &str = "news";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const BLOCK_GAP: f32 = 5.0;
const IMAGE_WIDTH: f32 = 48.0;
const MAX_IMAGE_HEIGHT: f32 = 120.0;

const PT_TO_MM: f32 = 0.3528;
const MM_PER_INCH: f32 = 25.4;
const LINE_SPACING: f32 = 1.35;
// average glyph advance relative to the font size
const GLYPH_WIDTH_EM: f32 = 0.5;

const BODY_SIZE: f32 = 12.0;
const FEED_SIZE: f32 = 18.0;
const TITLE_SIZE: f32 = 16.0;
const CAPTION_SIZE: f32 = 10.0;

const IMAGE_DOWNLOADS: usize = 8;

/// A laid out document and what went into it.
#[derive(Debug)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub embedded_images: usize,
    /// Images printed as their address.
    pub url_fallbacks: usize,
}

/// Writes every record into `dir/news.pdf` and returns the file path.
pub async fn write_pdf(
    records: &[ArticleRecord],
    dir: &Path,
    client: &Client,
    config: &Config,
) -> Result<PathBuf> {
    let images = fetch_images(client, records, config.page_timeout()).await;
    let rendered = render_document(records, &images, config.pdf_font())?;

    let path = dir.join(PDF_FILE_NAME);
    fs::write(&path, &rendered.bytes)?;
    info!(
        path = %path.display(),
        articles = records.len(),
        images = rendered.embedded_images,
        fallbacks = rendered.url_fallbacks,
        "pdf written"
    );
    Ok(path)
}

/// Downloads every distinct image once. Failed downloads are left out.
pub async fn fetch_images(
    client: &Client,
    records: &[ArticleRecord],
    timeout: Duration,
) -> HashMap<String, Bytes> {
    let mut seen = HashSet::new();
    let urls: Vec<&str> = records
        .iter()
        .flat_map(|record| &record.images)
        .filter(|link| matches!(link.kind, LinkKind::Image))
        .map(|link| link.url.as_str())
        .filter(|url| seen.insert(*url))
        .collect();

    let downloads: Vec<Option<(String, Bytes)>> = stream::iter(urls)
        .map(|url| async move {
            match fetch_bytes(client, url, timeout).await {
                Ok(bytes) => Some((url.to_string(), bytes)),
                Err(e) => {
                    warn!(url, error = %e, "image unavailable for pdf");
                    None
                }
            }
        })
        .buffer_unordered(IMAGE_DOWNLOADS)
        .collect()
        .await;

    downloads.into_iter().flatten().collect()
}

/// Lays out `records` with the downloaded `images`. Runs without I/O apart
/// from reading the font file.
pub fn render_document(
    records: &[ArticleRecord],
    images: &HashMap<String, Bytes>,
    font: Option<&Path>,
) -> Result<RenderedPdf> {
    let mut cursor = PageCursor::new(font)?;

    let feed = records
        .first()
        .map(|record| record.feed.trim_end())
        .unwrap_or(DOCUMENT_TITLE);
    cursor.with_size(FEED_SIZE).text(feed);

    for (index, record) in records.iter().enumerate() {
        cursor.article(index + 1, record, images);
    }
    cursor.finish()
}

struct PageCursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    unicode: bool,
    size: f32,
    y: f32,
    embedded: usize,
    fallbacks: usize,
}

/// A font size held for one scope; the previous size is restored on drop.
struct FontScope<'a> {
    cursor: &'a mut PageCursor,
    previous: f32,
}

impl Deref for FontScope<'_> {
    type Target = PageCursor;

    fn deref(&self) -> &PageCursor {
        self.cursor
    }
}

impl DerefMut for FontScope<'_> {
    fn deref_mut(&mut self) -> &mut PageCursor {
        self.cursor
    }
}

impl Drop for FontScope<'_> {
    fn drop(&mut self) {
        self.cursor.size = self.previous;
    }
}

impl PageCursor {
    fn new(font: Option<&Path>) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(DOCUMENT_TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);

        let (font, unicode) = match font {
            Some(path) => {
                let file = File::open(path)
                    .map_err(|e| ReaderError::Pdf(format!("font {}: {e}", path.display())))?;
                (doc.add_external_font(file).map_err(pdf_error)?, true)
            }
            None => (doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?, false),
        };
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            font,
            unicode,
            size: BODY_SIZE,
            y: PAGE_HEIGHT - MARGIN,
            embedded: 0,
            fallbacks: 0,
        })
    }

    fn with_size(&mut self, size: f32) -> FontScope<'_> {
        let previous = std::mem::replace(&mut self.size, size);
        FontScope { cursor: self, previous }
    }

    fn article(&mut self, number: usize, record: &ArticleRecord, images: &HashMap<String, Bytes>) {
        self.rule();
        self.with_size(TITLE_SIZE)
            .text(&format!("{number}: {}", record.title));
        self.text(&record.date);

        for link in record.images.iter().filter(|link| matches!(link.kind, LinkKind::Image)) {
            self.image(&link.url, images.get(&link.url));
            let number = link.label.trim_matches(|c| c == '[' || c == ']');
            self.with_size(CAPTION_SIZE)
                .text(&image_caption(&record.description, number));
        }

        self.text(&strip_markers(&record.description));
        self.text(&format!("Source: {}", record.link));
        self.rule();
    }

    fn text(&mut self, text: &str) {
        let text = if self.unicode {
            text.to_string()
        } else {
            latin_text(text)
        };
        let height = self.size * PT_TO_MM * LINE_SPACING;

        for line in wrap(&text, chars_per_line(self.size)) {
            self.ensure_room(height);
            self.y -= height;
            self.layer
                .use_text(line, self.size, Mm(MARGIN), Mm(self.y), &self.font);
        }
        self.y -= BLOCK_GAP;
    }

    fn image(&mut self, url: &str, data: Option<&Bytes>) {
        let picture = data.and_then(|bytes| match image::load_from_memory(bytes) {
            Ok(picture) if picture.width() > 0 && picture.height() > 0 => Some(picture),
            Ok(_) => None,
            Err(e) => {
                debug!(url, error = %e, "image can't be decoded");
                None
            }
        });
        let Some(picture) = picture else {
            self.fallbacks += 1;
            self.text(url);
            return;
        };

        let (width, height) = (picture.width() as f32, picture.height() as f32);
        let mut dpi = width * MM_PER_INCH / IMAGE_WIDTH;
        let mut shown_height = height * MM_PER_INCH / dpi;
        if shown_height > MAX_IMAGE_HEIGHT {
            dpi = height * MM_PER_INCH / MAX_IMAGE_HEIGHT;
            shown_height = MAX_IMAGE_HEIGHT;
        }

        self.ensure_room(shown_height);
        self.y -= shown_height;
        Image::from_dynamic_image(&DynamicImage::ImageRgb8(picture.to_rgb8())).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(self.y)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        self.y -= BLOCK_GAP;
        self.embedded += 1;
    }

    fn rule(&mut self) {
        self.ensure_room(BLOCK_GAP);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(0.0), Mm(self.y)), false),
                (Point::new(Mm(PAGE_WIDTH), Mm(self.y)), false),
            ],
            is_closed: false,
        });
        self.y -= BLOCK_GAP;
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height >= MARGIN {
            return;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn finish(self) -> Result<RenderedPdf> {
        let Self {
            doc,
            embedded,
            fallbacks,
            ..
        } = self;
        Ok(RenderedPdf {
            bytes: doc.save_to_bytes().map_err(pdf_error)?,
            embedded_images: embedded,
            url_fallbacks: fallbacks,
        })
    }
}

fn pdf_error(err: printpdf::Error) -> ReaderError {
    ReaderError::Pdf(err.to_string())
}

fn chars_per_line(size: f32) -> usize {
    (TEXT_WIDTH / (size * GLYPH_WIDTH_EM * PT_TO_MM)).floor().max(1.0) as usize
}

/// Greedy word wrap at `width` characters. Words longer than a line are
/// split across lines.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for chunk in chars.chunks(width) {
            if line_len > 0 && line_len + 1 + chunk.len() > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(chunk);
            line_len += chunk.len();
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn latin_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            c if c.is_whitespace() => ' ',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::build_links;
    use crate::extractor::ImageCandidate;
    use image::{ImageOutputFormat, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Bytes {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .unwrap();
        Bytes::from(buf)
    }

    fn record(image_urls: &[&str]) -> ArticleRecord {
        let candidates: Vec<ImageCandidate> = image_urls
            .iter()
            .map(|url| ImageCandidate {
                url: url.to_string(),
                caption: Some("Harbour [east]".to_string()),
            })
            .collect();
        let description = (0..image_urls.len())
            .map(|i| format!("[image {}: Harbour [east]][{}]", i + 2, i + 2))
            .collect::<String>()
            + "Crews worked overnight to clear the harbour road.";

        ArticleRecord {
            feed: "Example News\n".to_string(),
            title: "Storm closes coastal roads".to_string(),
            date: "2024-03-05 10:15:00".to_string(),
            link: "https://news.example.com/storm".to_string(),
            description,
            images: build_links(Some("https://news.example.com/storm"), &candidates),
        }
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        assert_eq!(wrap("a bb ccc dd", 4), vec!["a bb", "ccc", "dd"]);
        assert_eq!(wrap("  spaced   out  ", 20), vec!["spaced out"]);
        assert!(wrap("", 10).is_empty());
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap("go abcdefghij", 4), vec!["go", "abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_latin_text_replaces_other_scripts() {
        assert_eq!(latin_text("Новости\tdaily"), "??????? daily");
        assert_eq!(latin_text("plain [1]"), "plain [1]");
    }

    #[test]
    fn test_font_scope_restores_size() {
        let mut cursor = PageCursor::new(None).unwrap();
        {
            let scoped = cursor.with_size(TITLE_SIZE);
            assert_eq!(scoped.size, TITLE_SIZE);
        }
        assert_eq!(cursor.size, BODY_SIZE);

        cursor.with_size(CAPTION_SIZE).text("caption");
        assert_eq!(cursor.size, BODY_SIZE);
    }

    #[test]
    fn test_render_embeds_and_falls_back() {
        let ok = "https://cdn.example.com/ok.png";
        let missing = "https://cdn.example.com/missing.png";
        let broken = "https://cdn.example.com/broken.jpg";
        let images = HashMap::from([
            (ok.to_string(), png(40, 30)),
            (broken.to_string(), Bytes::from_static(b"not an image")),
        ]);

        let rendered = render_document(&[record(&[ok, missing, broken])], &images, None).unwrap();

        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert_eq!(rendered.embedded_images, 1);
        assert_eq!(rendered.url_fallbacks, 2);
    }

    #[test]
    fn test_long_document_spans_pages() {
        let records: Vec<ArticleRecord> = (0..40).map(|_| record(&[])).collect();
        let rendered = render_document(&records, &HashMap::new(), None).unwrap();
        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert_eq!(rendered.embedded_images, 0);
    }

    #[test]
    fn test_empty_record_list_still_renders() {
        let rendered = render_document(&[], &HashMap::new(), None).unwrap();
        assert!(rendered.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_missing_font_is_an_error() {
        let err = render_document(
            &[record(&[])],
            &HashMap::new(),
            Some(Path::new("/nonexistent/fonts/DejaVuSans.ttf")),
        )
        .unwrap_err();
        assert!(matches!(err, ReaderError::Pdf(message) if message.contains("DejaVuSans.ttf")));
    }
}
