//! Timed playback
//!
//! Drives a byte stream through the terminal at a simulated line speed and
//! produces a frame per burst, plus optional blink animation afterwards.

mod frame;
mod host;
mod player;
mod source;
mod timer;

pub use frame::{Frame, PlaybackStatus};
pub use host::{Host, NoopHost};
pub use player::{render, Playback};
pub use source::{DataSource, PendingSource};
pub use timer::{CancellationToken, ManualTimer, SystemTimer, Timer};
