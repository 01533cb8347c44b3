//! Configuration for a playback session

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::ScanOptions;
use crate::error::ConfigError;

/// Simulated line speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModemSpeed {
    /// Bits per second, ten bits per byte on the wire
    Bps(u32),
    /// No throttling: the whole stream renders as a single frame
    Unlimited,
}

impl Default for ModemSpeed {
    fn default() -> Self {
        ModemSpeed::Bps(56_000)
    }
}

impl ModemSpeed {
    /// Bytes delivered per frame interval, `None` when unthrottled
    pub fn burst_len(&self, frame_interval: Duration) -> Option<usize> {
        match self {
            ModemSpeed::Bps(bps) => {
                let bytes = *bps as u128 * frame_interval.as_millis() / 10_000;
                Some(bytes.clamp(1, usize::MAX as u128) as usize)
            }
            ModemSpeed::Unlimited => None,
        }
    }
}

/// What to do with the blink attribute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlinkMode {
    /// The blink bit is the high bit of a 16-colour background (iCE colours)
    #[default]
    Off,
    /// Segments blink and the driver keeps toggling the phase after the
    /// stream ends
    Auto,
    /// Segments are marked as blinking but animation is left to the host
    Host,
}

impl BlinkMode {
    /// Whether the blink bit means blinking rather than bright background
    pub fn is_enabled(&self) -> bool {
        !matches!(self, BlinkMode::Off)
    }
}

/// Where to start playback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seek {
    /// Fraction of the stream to skip, 0.0-1.0
    pub position: f64,
    /// Keep playing after the skipped prefix has been rendered
    pub resume: bool,
}

impl Default for Seek {
    fn default() -> Self {
        Self {
            position: 0.0,
            resume: true,
        }
    }
}

impl Seek {
    /// Number of bytes the seek position covers
    pub fn prefix_len(&self, total: usize) -> usize {
        ((self.position * total as f64).floor() as usize).min(total)
    }
}

/// Playback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub modem_speed: ModemSpeed,
    /// Time between frames
    pub frame_interval_ms: u64,
    /// Time blinking text stays visible or hidden
    pub blink_duration_ms: u64,
    pub blink_mode: BlinkMode,
    /// Leave colours that were never set undrawn
    pub transparency: bool,
    pub min_width: usize,
    pub min_height: usize,
    pub max_width: usize,
    pub max_height: usize,
    pub seek: Seek,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            modem_speed: ModemSpeed::default(),
            frame_interval_ms: 50,
            blink_duration_ms: 500,
            blink_mode: BlinkMode::Off,
            transparency: false,
            min_width: 79,
            min_height: 22,
            max_width: 80,
            max_height: 25,
            seek: Seek::default(),
        }
    }
}

impl PlaybackConfig {
    /// Parse and validate a JSON config document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: PlaybackConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(ConfigError::Invalid(
                "maximum dimensions must be at least 1".to_string(),
            ));
        }
        if self.min_width > self.max_width || self.min_height > self.max_height {
            return Err(ConfigError::Invalid(format!(
                "minimum size {}x{} exceeds maximum size {}x{}",
                self.min_width, self.min_height, self.max_width, self.max_height
            )));
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid("frame interval must be positive".to_string()));
        }
        if self.blink_duration_ms == 0 {
            return Err(ConfigError::Invalid("blink duration must be positive".to_string()));
        }
        if self.modem_speed == ModemSpeed::Bps(0) {
            return Err(ConfigError::Invalid("modem speed must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.seek.position) {
            return Err(ConfigError::Invalid(format!(
                "seek position {} outside 0.0-1.0",
                self.seek.position
            )));
        }
        Ok(())
    }

    /// The sizing pass only runs when the screen may grow
    pub fn needs_sizing(&self) -> bool {
        self.min_width != self.max_width || self.min_height != self.max_height
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn blink_duration(&self) -> Duration {
        Duration::from_millis(self.blink_duration_ms)
    }

    /// Frames per blink phase
    pub fn blink_frame_count(&self) -> u32 {
        let interval = self.frame_interval_ms.max(1);
        let frames = self.blink_duration_ms.saturating_add(interval - 1) / interval;
        frames.clamp(1, u32::MAX as u64) as u32
    }

    /// Bytes per frame, `None` when unthrottled
    pub fn burst_len(&self) -> Option<usize> {
        self.modem_speed.burst_len(self.frame_interval())
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            blink_mode: self.blink_mode,
            transparency: self.transparency,
        }
    }
}
