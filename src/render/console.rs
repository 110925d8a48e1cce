use crossterm::style::Stylize;
use std::io::{self, Write};

use crate::article::ArticleRecord;
use crate::render::{record_colour, separator};

/// Human-readable listing, one block per article.
pub fn print_records(records: &[ArticleRecord], colorize: bool, out: &mut impl Write) -> io::Result<()> {
    let line = separator();
    writeln!(out, "{line}")?;

    for record in records {
        let block = format_record(record);
        match record_colour(colorize) {
            Some(colour) => writeln!(out, "{}", block.with(colour))?,
            None => writeln!(out, "{block}")?,
        }
        writeln!(out, "{line}")?;
    }
    Ok(())
}

pub fn format_record(record: &ArticleRecord) -> String {
    // `feed` already ends with a newline
    let mut block = format!(
        "Feed: {}Title: {}\nDate: {}\nLink: {}\nDescription: {}\nLinks:",
        record.feed, record.title, record.date, record.link, record.description
    );
    for image in &record.images {
        block.push_str(&format!("\n{}: {} ({})", image.label, image.url, image.kind));
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::{ImageLink, LinkKind};

    fn record() -> ArticleRecord {
        ArticleRecord {
            feed: "Example News\n".to_string(),
            title: "Storm closes roads".to_string(),
            date: "2024-03-05 10:15:00".to_string(),
            link: "https://news.example.com/storm".to_string(),
            description: "[image 2: Harbour][2]Crews worked overnight.".to_string(),
            images: vec![
                ImageLink {
                    label: "[1]".to_string(),
                    url: "https://news.example.com/storm".to_string(),
                    kind: LinkKind::Link,
                },
                ImageLink {
                    label: "[2]".to_string(),
                    url: "https://cdn.example.com/harbour.png".to_string(),
                    kind: LinkKind::Image,
                },
            ],
        }
    }

    #[test]
    fn test_format_record() {
        assert_eq!(
            format_record(&record()),
            "Feed: Example News\n\
             Title: Storm closes roads\n\
             Date: 2024-03-05 10:15:00\n\
             Link: https://news.example.com/storm\n\
             Description: [image 2: Harbour][2]Crews worked overnight.\n\
             Links:\n\
             [1]: https://news.example.com/storm (link)\n\
             [2]: https://cdn.example.com/harbour.png (image)"
        );
    }

    #[test]
    fn test_print_plain_has_no_escape_codes() {
        let mut out = Vec::new();
        print_records(&[record(), record()], false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(!text.contains('\u{1b}'));
        assert_eq!(text.matches("Title: Storm closes roads").count(), 2);
        assert!(text.starts_with('-'));
    }

    #[test]
    fn test_print_colorized() {
        let mut out = Vec::new();
        print_records(&[record()], true, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        if std::env::var_os("NO_COLOR").is_none() {
            assert!(text.contains('\u{1b}'));
        }
        assert!(text.contains("Storm closes roads"));
    }
}
