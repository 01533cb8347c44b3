//! Parser Actions
//!
//! Semantic operations produced by the parser that should be applied to the screen.

use serde::{Deserialize, Serialize};

/// Longest parameter string kept for a single CSI sequence
pub const MAX_PARAM_BYTES: usize = 64;

/// An action produced by the parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Put a CP437 codepoint at the cursor
    Print(u8),

    /// Execute a C0 control character
    Control(ControlCode),

    /// Execute a CSI (Control Sequence Introducer) command
    Csi(CsiAction),

    /// SUB (0x1A) was seen; the visual part of the stream is over
    EndOfText,

    /// One string from the trailer that follows the end-of-text marker
    Metadata(String),
}

/// C0 control codes the interpreter acts upon.
///
/// Every other byte below 0x20 is printed as its CP437 glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlCode {
    /// BEL - Bell
    Bell,
    /// BS - Backspace
    Backspace,
    /// HT - Horizontal Tab
    Tab,
    /// LF - Line Feed
    LineFeed,
    /// FF - Form Feed (clears the screen)
    FormFeed,
    /// CR - Carriage Return
    CarriageReturn,
}

impl ControlCode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x07 => Some(ControlCode::Bell),
            0x08 => Some(ControlCode::Backspace),
            0x09 => Some(ControlCode::Tab),
            0x0A => Some(ControlCode::LineFeed),
            0x0C => Some(ControlCode::FormFeed),
            0x0D => Some(ControlCode::CarriageReturn),
            _ => None,
        }
    }
}

/// CSI (Control Sequence Introducer) actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsiAction {
    /// The final byte (0x40-0x7E) that identifies the command
    pub final_byte: u8,
    /// Semicolon-separated parameters; `None` marks an empty or unreadable one
    pub params: Vec<Option<u16>>,
}

impl CsiAction {
    /// Build an action from the raw parameter bytes collected after `ESC [`
    pub fn new(raw: &[u8], final_byte: u8) -> Self {
        Self {
            final_byte,
            params: raw.split(|&b| b == b';').map(parse_param).collect(),
        }
    }

    /// The command as a character
    pub fn final_char(&self) -> char {
        self.final_byte as char
    }

    /// Get parameter at index, or default value if missing or empty
    pub fn param(&self, index: usize, default: u16) -> u16 {
        self.params.get(index).copied().flatten().unwrap_or(default)
    }

    /// All parameters with empty ones replaced by `default`
    pub fn params_or(&self, default: u16) -> impl Iterator<Item = u16> + '_ {
        self.params.iter().map(move |p| p.unwrap_or(default))
    }
}

/// Parse one decimal parameter, saturating on overflow.
fn parse_param(text: &[u8]) -> Option<u16> {
    if text.is_empty() || !text.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let value = text
        .iter()
        .fold(0u32, |acc, &d| acc.saturating_mul(10).saturating_add((d - b'0') as u32));
    Some(value.min(u16::MAX as u32) as u16)
}
