//! Playback Driver
//!
//! Replays a byte stream as a sequence of frames. The driver is a state
//! machine advanced by [`Iterator::next`]:
//!
//! ```text
//! Start -> Rendering -> BlinkSustain -> Done
//!   |          |                          ^
//!   |          +--------------------------+
//!   +-- placeholder frame while a pending source is unresolved
//! ```
//!
//! Resolving the source and the sizing pass happen on the first call that
//! renders; neither produces a frame of its own. Waits between frames go
//! through the injected [`Timer`] and stop as soon as the
//! [`CancellationToken`] fires.

use std::ops::Range;
use std::sync::Arc;

use super::frame::{Frame, PlaybackStatus};
use super::host::{Host, NoopHost};
use super::source::DataSource;
use super::timer::{CancellationToken, SystemTimer, Timer};
use crate::config::{BlinkMode, ModemSpeed, PlaybackConfig};
use crate::error::SourceError;
use crate::terminal::Terminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Rendering,
    BlinkSustain { started: bool },
    Done,
}

/// State that exists once the source has been resolved
struct Session {
    data: Arc<[u8]>,
    error: Option<Arc<SourceError>>,
    terminal: Terminal,
    bursts: Vec<Range<usize>>,
    next_burst: usize,
}

/// A playback session
pub struct Playback<T: Timer = SystemTimer, H: Host = NoopHost> {
    source: DataSource,
    config: PlaybackConfig,
    timer: T,
    host: H,
    token: CancellationToken,
    phase: Phase,
    session: Option<Session>,
    sizing_performed: bool,
    sustain: bool,
    blinked: bool,
    blink_frames_remaining: u32,
    last_frame: Option<Frame>,
    last_status: Option<PlaybackStatus>,
    metadata_reported: Option<usize>,
}

/// Everything in a [`Playback`] apart from its timer and host
struct Parts {
    source: DataSource,
    config: PlaybackConfig,
    token: CancellationToken,
    phase: Phase,
    session: Option<Session>,
    sizing_performed: bool,
    sustain: bool,
    blinked: bool,
    blink_frames_remaining: u32,
    last_frame: Option<Frame>,
    last_status: Option<PlaybackStatus>,
    metadata_reported: Option<usize>,
}

impl Parts {
    fn assemble<T: Timer, H: Host>(self, timer: T, host: H) -> Playback<T, H> {
        Playback {
            source: self.source,
            config: self.config,
            timer,
            host,
            token: self.token,
            phase: self.phase,
            session: self.session,
            sizing_performed: self.sizing_performed,
            sustain: self.sustain,
            blinked: self.blinked,
            blink_frames_remaining: self.blink_frames_remaining,
            last_frame: self.last_frame,
            last_status: self.last_status,
            metadata_reported: self.metadata_reported,
        }
    }
}

impl Playback {
    /// Play `source` in real time
    pub fn new(source: DataSource, config: PlaybackConfig) -> Self {
        Self::with_parts(source, config, SystemTimer, NoopHost)
    }
}

impl<T: Timer, H: Host> Playback<T, H> {
    pub fn with_parts(source: DataSource, config: PlaybackConfig, timer: T, host: H) -> Self {
        let blink_frames_remaining = config.blink_frame_count();
        Self {
            source,
            config,
            timer,
            host,
            token: CancellationToken::new(),
            phase: Phase::Start,
            session: None,
            sizing_performed: false,
            sustain: true,
            blinked: false,
            blink_frames_remaining,
            last_frame: None,
            last_status: None,
            metadata_reported: None,
        }
    }

    /// Replace the timer
    pub fn with_timer<U: Timer>(self, timer: U) -> Playback<U, H> {
        let (_, host, rest) = self.into_parts();
        rest.assemble(timer, host)
    }

    /// Replace the host
    pub fn with_host<G: Host>(self, host: G) -> Playback<T, G> {
        let (timer, _, rest) = self.into_parts();
        rest.assemble(timer, host)
    }

    fn into_parts(self) -> (T, H, Parts) {
        let rest = Parts {
            source: self.source,
            config: self.config,
            token: self.token,
            phase: self.phase,
            session: self.session,
            sizing_performed: self.sizing_performed,
            sustain: self.sustain,
            blinked: self.blinked,
            blink_frames_remaining: self.blink_frames_remaining,
            last_frame: self.last_frame,
            last_status: self.last_status,
            metadata_reported: self.metadata_reported,
        };
        (self.timer, self.host, rest)
    }

    /// Share an existing cancellation token
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Stop after the stream is rendered even if blinking text remains
    pub fn without_blink_sustain(mut self) -> Self {
        self.sustain = false;
        self
    }

    /// Token that stops this session
    pub fn cancel_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Whether the measuring pass ran
    pub fn sizing_performed(&self) -> bool {
        self.sizing_performed
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Drive the session to completion, handing every frame to `on_frame`.
    /// Returns the last frame produced.
    pub fn run<F: FnMut(&Frame)>(mut self, mut on_frame: F) -> Option<Frame> {
        let mut last = None;
        while let Some(frame) = self.next() {
            on_frame(&frame);
            last = Some(frame);
        }
        last
    }

    fn stop(&mut self) -> Option<Frame> {
        if self.phase != Phase::Done && self.token.is_cancelled() {
            tracing::debug!("playback cancelled");
        }
        self.phase = Phase::Done;
        self.session = None;
        None
    }

    fn start(&mut self) -> Option<Frame> {
        if !self.source.is_ready() {
            // Shown while the source is loading; resolving happens on the
            // next call
            self.phase = Phase::Rendering;
            let frame = Frame::blank(&self.config, PlaybackStatus::default());
            self.report_status(frame.status);
            return Some(frame);
        }
        self.phase = Phase::Rendering;
        self.render_next()
    }

    fn open(&mut self) -> Session {
        let (data, error) = self.source.resolve();
        if let Some(error) = &error {
            self.host.on_error(error);
        }

        let bursts = plan_bursts(&self.config, data.len());
        let (cols, rows) = if bursts.is_empty() {
            (self.config.min_width, self.config.min_height)
        } else {
            self.measure(&data)
        };
        let terminal = Terminal::rendering(
            cols,
            rows,
            self.config.max_width,
            self.config.max_height,
            self.config.transparency,
        );
        Session {
            data,
            error,
            terminal,
            bursts,
            next_burst: 0,
        }
    }

    /// Sizing pass: replay everything without a buffer and size the screen
    /// to fit the furthest printed position
    fn measure(&mut self, data: &[u8]) -> (usize, usize) {
        let config = &self.config;
        if !config.needs_sizing() {
            tracing::debug!(
                width = config.min_width,
                height = config.min_height,
                "sizing pass skipped"
            );
            return (config.min_width, config.min_height);
        }

        let mut terminal = Terminal::measuring(config.max_width, config.max_height);
        terminal.process(data);
        terminal.finish();
        self.sizing_performed = true;

        let (cols, rows) = terminal.extent();
        let width = cols
            .max(config.min_width)
            .min(config.max_width.max(config.min_width));
        let height = rows
            .max(config.min_height)
            .min(config.max_height.max(config.min_height));
        tracing::debug!(width, height, "sizing pass complete");
        (width, height)
    }

    fn render_next(&mut self) -> Option<Frame> {
        let mut session = match self.session.take() {
            Some(session) => session,
            None => self.open(),
        };

        if session.bursts.is_empty() {
            let total = session.data.len();
            let position = match total {
                0 => 0.0,
                total => self.config.seek.prefix_len(total) as f64 / total as f64,
            };
            let frame = Frame::blank(&self.config, PlaybackStatus::stopped(position))
                .with_metadata(Vec::new())
                .with_error(session.error.clone());
            self.report_metadata(&[]);
            self.report_status(frame.status);
            self.phase = Phase::Done;
            return Some(frame);
        }

        if session.next_burst > 0 {
            if !self.timer.sleep(self.config.frame_interval(), &self.token) {
                return self.stop();
            }
            self.advance_blink();
        }

        let burst = session.bursts[session.next_burst].clone();
        session.next_burst += 1;
        let last = session.next_burst == session.bursts.len();

        let total = session.data.len();
        session.terminal.process(&session.data[burst.clone()]);
        if last {
            session.terminal.finish();
        }

        for _ in 0..session.terminal.take_bells() {
            self.host.on_beep();
        }
        let metadata = session.terminal.metadata().to_vec();
        self.report_metadata(&metadata);

        let status = PlaybackStatus {
            position: burst.end as f64 / total as f64,
            playing: !last,
        };
        self.report_status(status);

        let buffer = session.terminal.buffer()?;
        let frame = Frame::capture(buffer, self.config.scan_options(), self.blinked, status)
            .with_metadata(metadata)
            .with_error(session.error.clone());

        if last {
            self.phase = if self.sustain
                && self.config.blink_mode == BlinkMode::Auto
                && frame.will_blink
            {
                tracing::debug!("blink sustain started");
                Phase::BlinkSustain { started: false }
            } else {
                Phase::Done
            };
            self.last_frame = Some(frame.clone());
        } else {
            self.session = Some(session);
        }
        Some(frame)
    }

    fn advance_blink(&mut self) {
        if !self.config.blink_mode.is_enabled() {
            return;
        }
        self.blink_frames_remaining = self.blink_frames_remaining.saturating_sub(1);
        if self.blink_frames_remaining == 0 {
            self.blinked = !self.blinked;
            self.blink_frames_remaining = self.config.blink_frame_count();
        }
    }

    fn sustain_next(&mut self, started: bool) -> Option<Frame> {
        let wait = if started {
            self.config.blink_duration()
        } else {
            // Finish the blink phase that was running when the stream ended
            self.config.frame_interval() * self.blink_frames_remaining
        };
        if !self.timer.sleep(wait, &self.token) {
            return self.stop();
        }
        self.phase = Phase::BlinkSustain { started: true };
        self.blinked = !self.blinked;
        let frame = self.last_frame.as_ref()?.with_blinked(self.blinked);
        Some(frame)
    }

    /// The first rendered frame always reports, even an empty list; after
    /// that only growth does
    fn report_metadata(&mut self, metadata: &[String]) {
        if self.metadata_reported.map_or(true, |len| metadata.len() > len) {
            self.metadata_reported = Some(metadata.len());
            self.host.on_metadata(metadata);
        }
    }

    fn report_status(&mut self, status: PlaybackStatus) {
        if self.last_status != Some(status) {
            self.last_status = Some(status);
            self.host.on_status(status);
        }
    }
}

impl<T: Timer, H: Host> Iterator for Playback<T, H> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.token.is_cancelled() {
            return self.stop();
        }
        match self.phase {
            Phase::Start => self.start(),
            Phase::Rendering => self.render_next(),
            Phase::BlinkSustain { started } => self.sustain_next(started),
            Phase::Done => None,
        }
    }
}

/// Split `0..total` into the byte ranges rendered as frames: the seek
/// prefix first, then one range per burst if playback resumes
fn plan_bursts(config: &PlaybackConfig, total: usize) -> Vec<Range<usize>> {
    let mut bursts = Vec::new();
    let prefix = config.seek.prefix_len(total);
    if prefix > 0 {
        bursts.push(0..prefix);
    }
    if config.seek.resume {
        let step = config.burst_len().unwrap_or(total).max(1);
        let mut start = prefix;
        while start < total {
            let end = start.saturating_add(step).min(total);
            bursts.push(start..end);
            start = end;
        }
    }
    bursts
}

/// Render `source` in one shot and return the final frame
pub fn render(source: &DataSource, config: &PlaybackConfig) -> Frame {
    let config = PlaybackConfig {
        modem_speed: ModemSpeed::Unlimited,
        ..config.clone()
    };
    Playback::with_parts(source.clone(), config.clone(), SystemTimer, NoopHost)
        .without_blink_sustain()
        .last()
        .unwrap_or_else(|| Frame::blank(&config, PlaybackStatus::stopped(0.0)))
}
