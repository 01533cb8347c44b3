//! ANSI Art Replay Library
//!
//! Plays back ANSI art (CP437 text with ANSI escape sequences) the way it
//! arrived over a modem. This crate provides:
//!
//! - `codepage`: CP437 byte/glyph mapping
//! - `parser`: escape sequence parser
//! - `core`: packed cells, cursor, screen buffer, segment scanner
//! - `terminal`: executor applying parsed actions, for both the measuring
//!   and the rendering pass
//! - `playback`: timed driver producing frames, data sources, timers
//! - `palette`: CGA colours for display

pub mod codepage;
pub mod config;
pub mod core;
pub mod error;
pub mod palette;
pub mod parser;
pub mod playback;
pub mod terminal;

pub use config::{BlinkMode, ModemSpeed, PlaybackConfig, Seek};
pub use error::{ConfigError, SourceError};
pub use palette::Palette;
pub use playback::{
    render, CancellationToken, DataSource, Frame, Host, ManualTimer, NoopHost, Playback,
    PlaybackStatus, SystemTimer, Timer,
};
pub use terminal::Terminal;
