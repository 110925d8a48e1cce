use ammonia::clean_text;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::info;

use crate::article::{ArticleRecord, LinkKind, NO_LINK};
use crate::error::Result;
use crate::extractor::NO_DESCRIPTION;

pub const HTML_FILE_NAME: &str = "news.html";

static IMAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[image (\d+): (.*?)\]\[\d+\]").unwrap());

/// Writes every record into `dir/news.html` and returns the file path.
pub fn write_html(records: &[ArticleRecord], dir: &Path) -> Result<PathBuf> {
    let path = dir.join(HTML_FILE_NAME);
    fs::write(&path, render_page(records))?;
    info!(path = %path.display(), articles = records.len(), "html written");
    Ok(path)
}

pub fn render_page(records: &[ArticleRecord]) -> String {
    let mut page = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>RSS news</title>\n</head>\n<body>\n",
    );
    for record in records {
        render_article(&mut page, record);
    }
    page.push_str("</body>\n</html>\n");
    page
}

fn render_article(page: &mut String, record: &ArticleRecord) {
    page.push_str("<article>\n");
    page.push_str(&format!("<h2>{}</h2>\n", clean_text(&record.title)));
    page.push_str(&format!("<p class=\"feed\">{}</p>\n", clean_text(record.feed.trim_end())));
    page.push_str(&format!("<p class=\"date\">{}</p>\n", clean_text(&record.date)));

    for image in &record.images {
        let line = match image.kind {
            LinkKind::Link if image.url == NO_LINK => format!("<p>{}</p>\n", clean_text(NO_LINK)),
            LinkKind::Link => {
                let url = clean_text(&image.url);
                format!("<p><a href=\"{url}\">{url}</a></p>\n")
            }
            LinkKind::Image => {
                let number = image.label.trim_matches(|c| c == '[' || c == ']');
                let caption = clean_text(&image_caption(&record.description, number));
                format!(
                    "<figure><img src=\"{}\" alt=\"{caption}\"><figcaption>{caption}</figcaption></figure>\n",
                    clean_text(&image.url)
                )
            }
        };
        page.push_str(&line);
    }

    page.push_str(&format!("<p>{}</p>\n", clean_text(&strip_markers(&record.description))));
    page.push_str("</article>\n");
}

/// Caption of image `number` from its `[image N: caption][N]` marker.
pub fn image_caption(description: &str, number: &str) -> String {
    IMAGE_MARKER
        .captures_iter(description)
        .find(|caps| &caps[1] == number)
        .map(|caps| caps[2].to_string())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

pub fn strip_markers(description: &str) -> String {
    IMAGE_MARKER.replace_all(description, "").trim().to_string()
}
