//! Colour palettes
//!
//! Segments carry colour indices 0-15; a palette turns them into RGB for
//! display.

use serde::{Deserialize, Serialize};

use crate::core::Segment;

/// The IBM CGA palette
pub const CGA: [[u8; 3]; 16] = [
    [0x00, 0x00, 0x00], // Black
    [0xaa, 0x00, 0x00], // Red
    [0x00, 0xaa, 0x00], // Green
    [0xaa, 0x55, 0x00], // Brown
    [0x00, 0x00, 0xaa], // Blue
    [0xaa, 0x00, 0xaa], // Magenta
    [0x00, 0xaa, 0xaa], // Cyan
    [0xaa, 0xaa, 0xaa], // Light gray
    [0x55, 0x55, 0x55], // Dark gray
    [0xff, 0x55, 0x55], // Bright red
    [0x55, 0xff, 0x55], // Bright green
    [0xff, 0xff, 0x55], // Yellow
    [0x55, 0x55, 0xff], // Bright blue
    [0xff, 0x55, 0xff], // Bright magenta
    [0x55, 0xff, 0xff], // Bright cyan
    [0xff, 0xff, 0xff], // White
];

/// Sixteen display colours indexed by attribute colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub colors: [[u8; 3]; 16],
}

impl Default for Palette {
    fn default() -> Self {
        Self { colors: CGA }
    }
}

impl Palette {
    /// RGB for a colour index; indices wrap at 16
    pub fn rgb(&self, index: u8) -> [u8; 3] {
        self.colors[(index & 0x0F) as usize]
    }

    /// CSS-style `#rrggbb`
    pub fn hex(&self, index: u8) -> String {
        let [r, g, b] = self.rgb(index);
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Foreground and background to draw a segment with, `None` for
    /// undrawn colours
    pub fn segment_colors(
        &self,
        segment: &Segment,
        blinked: bool,
    ) -> (Option<[u8; 3]>, Option<[u8; 3]>) {
        let fg = segment.display_fg(blinked).map(|c| self.rgb(c));
        let bg = segment.bg_color.map(|c| self.rgb(c));
        (fg, bg)
    }
}
