pub mod console;
pub mod html;
pub mod json;
pub mod pdf;

pub use console::print_records;
pub use html::write_html;
pub use pdf::write_pdf;

use crossterm::style::Color;
use rand::seq::SliceRandom;

const FALLBACK_WIDTH: usize = 100;

const PALETTE: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];

/// A row of dashes as wide as the terminal.
pub fn separator() -> String {
    let width = crossterm::terminal::size()
        .map(|(columns, _)| columns as usize)
        .ok()
        .filter(|&columns| columns > 0)
        .unwrap_or(FALLBACK_WIDTH);
    "-".repeat(width)
}

/// A random foreground colour when colouring is on.
pub(crate) fn record_colour(colorize: bool) -> Option<Color> {
    if !colorize {
        return None;
    }
    PALETTE.choose(&mut rand::thread_rng()).copied()
}
