//! Frames
//!
//! A frame is the complete observable state of a playback session at one
//! instant. Frames are produced fresh each time and never patched, so a
//! consumer may keep any of them around.

use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::config::{BlinkMode, PlaybackConfig};
use crate::core::{scan, Line, ScanOptions, ScreenBuffer};
use crate::error::SourceError;

/// How far playback has progressed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackStatus {
    /// Fraction of the source bytes consumed, 0.0-1.0
    pub position: f64,
    /// Whether more bytes remain to be played
    pub playing: bool,
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        Self {
            position: 0.0,
            playing: true,
        }
    }
}

impl PlaybackStatus {
    pub fn stopped(position: f64) -> Self {
        Self {
            position,
            playing: false,
        }
    }
}

/// Snapshot of the virtual screen
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    /// One entry per screen row
    pub lines: Vec<Line>,
    pub blink_mode: BlinkMode,
    /// Current blink phase: blinking glyphs are hidden while set
    pub blinked: bool,
    /// Whether any segment of this frame blinks
    pub will_blink: bool,
    pub status: PlaybackStatus,
    /// Strings from the trailer after the end-of-text marker, `None` until
    /// rendering has begun
    pub metadata: Option<Vec<String>>,
    /// Why the source could not be read; the frame then shows this message
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<Arc<SourceError>>,
}

fn serialize_error<S: Serializer>(
    error: &Option<Arc<SourceError>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_some(&error.to_string()),
        None => serializer.serialize_none(),
    }
}

impl Frame {
    /// Build a frame from the live buffer
    pub fn capture(
        buffer: &ScreenBuffer,
        options: ScanOptions,
        blinked: bool,
        status: PlaybackStatus,
    ) -> Self {
        let scan = scan(buffer, options);
        Self {
            width: buffer.cols(),
            height: buffer.rows(),
            lines: scan.lines,
            blink_mode: options.blink_mode,
            blinked,
            will_blink: scan.will_blink,
            status,
            metadata: None,
            error: None,
        }
    }

    /// An empty screen at the configured minimum size
    pub fn blank(config: &PlaybackConfig, status: PlaybackStatus) -> Self {
        let buffer = ScreenBuffer::new(config.min_width, config.min_height);
        Self::capture(&buffer, config.scan_options(), false, status)
    }

    pub fn with_metadata(mut self, metadata: Vec<String>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_error(mut self, error: Option<Arc<SourceError>>) -> Self {
        self.error = error;
        self
    }

    /// The same screen in the given blink phase
    pub fn with_blinked(&self, blinked: bool) -> Self {
        Self {
            blinked,
            ..self.clone()
        }
    }

    /// Text of one row
    pub fn line_text(&self, row: usize) -> String {
        self.lines
            .get(row)
            .map(|segments| segments.iter().map(|s| s.text.as_str()).collect())
            .unwrap_or_default()
    }

    /// Convert to plain text, one row per line
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for row in 0..self.lines.len() {
            text.push_str(&self.line_text(row));
            text.push('\n');
        }
        text
    }

    /// Convert to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Whether two frames show the same screen, ignoring status and
    /// side-channel fields
    pub fn content_equals(&self, other: &Frame) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.lines == other.lines
            && self.blinked == other.blinked
    }
}
