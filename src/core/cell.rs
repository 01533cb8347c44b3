//! Screen Cell
//!
//! A cell packs a CP437 codepoint and its attributes into one 32-bit word:
//!
//! ```text
//! bits  0-7   codepoint (0 = never written)
//! bits  8-11  background colour (bit 11 is the blink / bright-background bit)
//! bits 12-15  foreground colour
//! bit  16     foreground explicitly set (transparency mode only)
//! bit  17     background explicitly set (transparency mode only)
//! ```
//!
//! The pen holds the current SGR attribute state and stamps cells with it.

use serde::{Deserialize, Serialize};

const CODEPOINT_MASK: u32 = 0x0000_00FF;
const BG_SHIFT: u32 = 8;
const FG_SHIFT: u32 = 12;
const BLINK_BIT: u32 = 0x0000_0800;
const FG_EXPLICIT: u32 = 0x0001_0000;
const BG_EXPLICIT: u32 = 0x0002_0000;
const ATTRIBUTE_MASK: u32 = 0x000F_FF00;

pub const DEFAULT_FG: u8 = 7;
pub const DEFAULT_BG: u8 = 0;

/// A single packed cell in the screen buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cell(u32);

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

impl Cell {
    /// An untouched cell with default attributes
    pub const BLANK: Cell = Cell((DEFAULT_FG as u32) << FG_SHIFT | (DEFAULT_BG as u32) << BG_SHIFT);

    /// Pack a codepoint with colours and explicit-colour flags
    pub fn new(codepoint: u8, fg: u8, bg: u8, fg_explicit: bool, bg_explicit: bool) -> Self {
        let mut word = codepoint as u32
            | ((fg & 0x0F) as u32) << FG_SHIFT
            | ((bg & 0x0F) as u32) << BG_SHIFT;
        if fg_explicit {
            word |= FG_EXPLICIT;
        }
        if bg_explicit {
            word |= BG_EXPLICIT;
        }
        Cell(word)
    }

    pub fn codepoint(self) -> u8 {
        (self.0 & CODEPOINT_MASK) as u8
    }

    /// Whether nothing was ever printed here
    pub fn is_untouched(self) -> bool {
        self.codepoint() == 0
    }

    /// Foreground colour, 0-15
    pub fn fg(self) -> u8 {
        ((self.0 >> FG_SHIFT) & 0x0F) as u8
    }

    /// Background colour, 0-15. Bit 3 doubles as the blink bit.
    pub fn bg(self) -> u8 {
        ((self.0 >> BG_SHIFT) & 0x0F) as u8
    }

    pub fn blink_bit(self) -> bool {
        self.0 & BLINK_BIT != 0
    }

    pub fn fg_explicit(self) -> bool {
        self.0 & FG_EXPLICIT != 0
    }

    pub fn bg_explicit(self) -> bool {
        self.0 & BG_EXPLICIT != 0
    }

    /// The attribute word with the codepoint masked off
    pub fn attributes(self) -> u32 {
        self.0 & ATTRIBUTE_MASK
    }

    /// Raw packed value
    pub fn bits(self) -> u32 {
        self.0
    }
}

/// Current graphic rendition (SGR) state.
///
/// Colours are kept as a 3-bit base plus a bright flag; SGR 1 and SGR 5
/// toggle the bright halves independently of the base colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pen {
    pub fg_base: u8,
    pub bg_base: u8,
    pub fg_bright: bool,
    pub bg_bright: bool,
    pub fg_explicit: bool,
    pub bg_explicit: bool,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            fg_base: DEFAULT_FG,
            bg_base: DEFAULT_BG,
            fg_bright: false,
            bg_bright: false,
            fg_explicit: false,
            bg_explicit: false,
        }
    }
}

impl Pen {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Effective foreground colour, 0-15
    pub fn fg(&self) -> u8 {
        self.fg_base + if self.fg_bright { 8 } else { 0 }
    }

    /// Effective background colour, 0-15
    pub fn bg(&self) -> u8 {
        self.bg_base + if self.bg_bright { 8 } else { 0 }
    }

    /// Apply SGR codes in order. Unknown codes are ignored.
    pub fn apply_sgr<I: IntoIterator<Item = u16>>(&mut self, codes: I) {
        for code in codes {
            match code {
                0 => self.reset(),
                1 => self.fg_bright = true,
                2 | 22 => self.fg_bright = false,
                // Blink is read as bright background (iCE colours)
                5 | 6 => self.bg_bright = true,
                7 => {
                    std::mem::swap(&mut self.fg_base, &mut self.bg_base);
                    self.fg_explicit = true;
                    self.bg_explicit = true;
                }
                8 => {
                    self.fg_base = self.bg_base;
                    self.fg_explicit = true;
                }
                25 => self.bg_bright = false,
                30..=37 => {
                    self.fg_base = (code - 30) as u8;
                    self.fg_explicit = true;
                }
                40..=47 => {
                    self.bg_base = (code - 40) as u8;
                    self.bg_explicit = true;
                }
                _ => {}
            }
        }
    }

    /// Stamp a codepoint with the current attributes.
    ///
    /// Explicit-colour flags are only recorded when `transparency` is on, so
    /// that cells compare equal on colour alone otherwise.
    pub fn cell(&self, codepoint: u8, transparency: bool) -> Cell {
        Cell::new(
            codepoint,
            self.fg(),
            self.bg(),
            transparency && self.fg_explicit,
            transparency && self.bg_explicit,
        )
    }

    /// An erased cell carrying the current attributes
    pub fn blank(&self, transparency: bool) -> Cell {
        self.cell(0, transparency)
    }
}
