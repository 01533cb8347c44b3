//! Screen Core Module
//!
//! Platform-independent screen state. This module contains:
//! - Packed cell representation and the SGR pen
//! - Cursor state and positioning
//! - The fixed-size screen buffer
//! - The segment scanner that turns rows into attribute runs
//!
//! The core is completely deterministic: given the same sequence of
//! actions, it always produces the same state.

mod buffer;
mod cell;
mod cursor;
mod segment;

pub use buffer::{EraseMode, ScreenBuffer};
pub use cell::{Cell, Pen, DEFAULT_BG, DEFAULT_FG};
pub use cursor::Cursor;
pub use segment::{scan, scan_row, Line, Scan, ScanOptions, Segment};
