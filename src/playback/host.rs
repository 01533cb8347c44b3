//! Host callbacks
//!
//! Side channels the embedding application may observe while frames are
//! produced. Every method defaults to doing nothing.

use super::frame::PlaybackStatus;
use crate::error::SourceError;

pub trait Host {
    /// A BEL byte was rendered
    fn on_beep(&mut self) {}

    /// Called with each rendered frame's status
    fn on_status(&mut self, _status: PlaybackStatus) {}

    /// Trailer metadata changed
    fn on_metadata(&mut self, _metadata: &[String]) {}

    /// The source could not be read
    fn on_error(&mut self, _error: &SourceError) {}
}

/// Ignores every callback
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl Host for NoopHost {}

impl<H: Host + ?Sized> Host for &mut H {
    fn on_beep(&mut self) {
        (**self).on_beep()
    }

    fn on_status(&mut self, status: PlaybackStatus) {
        (**self).on_status(status)
    }

    fn on_metadata(&mut self, metadata: &[String]) {
        (**self).on_metadata(metadata)
    }

    fn on_error(&mut self, error: &SourceError) {
        (**self).on_error(error)
    }
}
