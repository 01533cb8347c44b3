//! Segment Scanner
//!
//! Collapses each buffer row into the shortest list of text runs whose
//! cells share identical rendering attributes. Renderers consume these
//! runs directly instead of walking cells.

use serde::{Deserialize, Serialize};

use super::buffer::ScreenBuffer;
use super::cell::Cell;
use crate::codepage;
use crate::config::BlinkMode;

/// A run of adjacent cells in one row with the same attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    /// `None` when transparency is on and no foreground was ever set
    pub fg_color: Option<u8>,
    /// `None` when transparency is on and no background was ever set
    pub bg_color: Option<u8>,
    /// Whether the glyphs blink (only with blinking enabled)
    pub blink: bool,
    /// Whether the background should be left undrawn
    pub transparent: bool,
}

impl Segment {
    /// Foreground to draw for the given blink phase.
    ///
    /// A blinking segment in its hidden phase draws its glyphs in the
    /// background colour, so only the background remains visible.
    pub fn display_fg(&self, blinked: bool) -> Option<u8> {
        if self.blink && blinked {
            self.bg_color
        } else {
            self.fg_color
        }
    }

    /// Number of cells covered
    pub fn width(&self) -> usize {
        self.text.chars().count()
    }
}

/// One screen row as segments, left to right
pub type Line = Vec<Segment>;

/// How cell attributes are interpreted while scanning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub blink_mode: BlinkMode,
    pub transparency: bool,
}

/// Result of scanning a whole buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan {
    pub lines: Vec<Line>,
    /// Whether any segment blinks
    pub will_blink: bool,
}

/// Scan every row of the buffer
pub fn scan(buffer: &ScreenBuffer, options: ScanOptions) -> Scan {
    let lines: Vec<Line> = buffer
        .iter_rows()
        .map(|row| scan_row(row, options))
        .collect();
    let will_blink = lines.iter().flatten().any(|segment| segment.blink);
    Scan { lines, will_blink }
}

/// Scan a single row of cells
pub fn scan_row(cells: &[Cell], options: ScanOptions) -> Line {
    let mut line = Line::new();
    let mut current: Option<(u32, Cell)> = None;
    let mut text = String::new();

    for &cell in cells {
        let attributes = cell.attributes();
        match current {
            Some((attr, _)) if attr == attributes => {}
            _ => {
                if let Some((_, first)) = current {
                    line.push(make_segment(std::mem::take(&mut text), first, options));
                }
                current = Some((attributes, cell));
            }
        }
        let codepoint = if cell.is_untouched() { b' ' } else { cell.codepoint() };
        text.push(codepage::glyph(codepoint));
    }
    if let Some((_, first)) = current {
        line.push(make_segment(text, first, options));
    }
    line
}

fn make_segment(text: String, cell: Cell, options: ScanOptions) -> Segment {
    let blinking = options.blink_mode.is_enabled();
    let blink = blinking && cell.blink_bit();
    // With blinking on, bit 3 of the background is the blink bit
    let bg = if blinking { cell.bg() & 0x07 } else { cell.bg() };
    let fg_drawn = !options.transparency || cell.fg_explicit();
    let bg_drawn = !options.transparency || cell.bg_explicit();
    Segment {
        text,
        fg_color: fg_drawn.then_some(cell.fg()),
        bg_color: bg_drawn.then_some(bg),
        blink,
        transparent: !bg_drawn,
    }
}
