use crossterm::style::Stylize;
use std::io::{self, Write};

use crate::article::ArticleRecord;
use crate::render::{record_colour, separator};

/// One pretty JSON document per article, between separator lines.
pub fn print_records(records: &[ArticleRecord], colorize: bool, out: &mut impl Write) -> io::Result<()> {
    let line = separator();
    writeln!(out, "{line}")?;

    for record in records {
        let document = serde_json::to_string_pretty(record)?;
        match record_colour(colorize) {
            Some(colour) => writeln!(out, "{}", document.with(colour))?,
            None => writeln!(out, "{document}")?,
        }
        writeln!(out, "{line}")?;
    }
    Ok(())
}
