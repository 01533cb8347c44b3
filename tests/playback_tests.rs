//! Playback driver tests
//!
//! Drive whole sessions with a virtual clock and check frame sequences,
//! timing, blinking, seeking and the host callbacks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ansi_replay::playback::{
    DataSource, Frame, Host, ManualTimer, NoopHost, Playback, PlaybackStatus,
};
use ansi_replay::{BlinkMode, ModemSpeed, PlaybackConfig, Seek, SourceError};

fn config(speed: ModemSpeed, blink_mode: BlinkMode) -> PlaybackConfig {
    PlaybackConfig {
        modem_speed: speed,
        blink_mode,
        ..PlaybackConfig::default()
    }
}

fn play(source: DataSource, config: PlaybackConfig) -> Vec<Frame> {
    Playback::with_parts(source, config, ManualTimer::new(), NoopHost).collect()
}

/// Records every callback
#[derive(Default)]
struct Recorder {
    beeps: usize,
    statuses: Vec<PlaybackStatus>,
    metadata: Vec<Vec<String>>,
    errors: Vec<String>,
}

impl Host for Recorder {
    fn on_beep(&mut self) {
        self.beeps += 1;
    }

    fn on_status(&mut self, status: PlaybackStatus) {
        self.statuses.push(status);
    }

    fn on_metadata(&mut self, metadata: &[String]) {
        self.metadata.push(metadata.to_vec());
    }

    fn on_error(&mut self, error: &SourceError) {
        self.errors.push(error.to_string());
    }
}

#[test]
fn test_playback_unlimited_speed_single_frame() {
    let frames = play(
        DataSource::text("\x1b[2J\x1b[10;5Hcentre"),
        config(ModemSpeed::Unlimited, BlinkMode::Off),
    );

    assert_eq!(frames.len(), 1);
    let frame = &frames[0];
    assert_eq!(frame.lines.len(), frame.height);
    assert_eq!(frame.status, PlaybackStatus::stopped(1.0));
    assert!(frame.line_text(9).starts_with("    centre"));
}

#[test]
fn test_playback_frames_in_position_order() {
    let mut host = Recorder::default();
    let data = vec![b'.'; 1000];
    let frames: Vec<Frame> = Playback::with_parts(
        DataSource::bytes(data),
        config(ModemSpeed::Bps(9600), BlinkMode::Off),
        ManualTimer::new(),
        &mut host,
    )
    .collect();

    // 48 bytes per 50ms frame
    assert_eq!(frames.len(), 21);
    for pair in frames.windows(2) {
        assert!(pair[0].status.position <= pair[1].status.position);
        assert!(pair[0].status.playing);
    }
    assert_eq!(frames[20].status, PlaybackStatus::stopped(1.0));
    assert_eq!(host.statuses.len(), 21);
}

#[test]
fn test_playback_waits_frame_interval_between_bursts() {
    let mut timer = ManualTimer::new();
    let frames: Vec<Frame> = Playback::with_parts(
        DataSource::bytes(vec![b'x'; 100]),
        config(ModemSpeed::Bps(4000), BlinkMode::Off),
        &mut timer,
        NoopHost,
    )
    .collect();

    // 20 bytes per frame
    assert_eq!(frames.len(), 5);
    assert_eq!(timer.sleeps(), &[Duration::from_millis(50); 4]);
}

#[test]
fn test_playback_sizing_only_when_dimensions_can_grow() {
    let fixed = PlaybackConfig {
        min_width: 80,
        min_height: 25,
        ..config(ModemSpeed::Unlimited, BlinkMode::Off)
    };
    let mut playback =
        Playback::with_parts(DataSource::text("abc"), fixed, ManualTimer::new(), NoopHost);
    assert!(playback.by_ref().count() == 1);
    assert!(!playback.sizing_performed());

    let mut playback = Playback::with_parts(
        DataSource::text("abc"),
        config(ModemSpeed::Unlimited, BlinkMode::Off),
        ManualTimer::new(),
        NoopHost,
    );
    assert!(playback.by_ref().count() == 1);
    assert!(playback.sizing_performed());
}

#[test]
fn test_playback_auto_blink_toggles_within_two_periods() {
    let mut timer = ManualTimer::new();
    let mut playback = Playback::with_parts(
        DataSource::text("\x1b[5;33mBLINK"),
        config(ModemSpeed::Bps(56_000), BlinkMode::Auto),
        &mut timer,
        NoopHost,
    );

    let rendered = playback.next().unwrap();
    assert!(rendered.will_blink);
    assert!(!rendered.blinked);

    let first = playback.next().unwrap();
    let second = playback.next().unwrap();
    assert!(first.blinked);
    assert!(!second.blinked);
    assert_eq!(first.lines, rendered.lines);
    assert!(!playback.is_done());
    drop(playback);

    assert!(timer.elapsed() <= Duration::from_millis(1000));
}

#[test]
fn test_playback_auto_blink_finishes_running_phase() {
    let mut timer = ManualTimer::new();
    // 2400 bps = 12 bytes per frame, 5 bursts
    let mut data = b"\x1b[5m".to_vec();
    data.extend_from_slice(&[b'*'; 56]);
    let mut playback = Playback::with_parts(
        DataSource::bytes(data),
        config(ModemSpeed::Bps(2400), BlinkMode::Auto),
        &mut timer,
        NoopHost,
    );

    let frames: Vec<Frame> = playback.by_ref().take(6).collect();
    assert!(frames[..5].iter().all(|frame| !frame.blinked));
    assert!(frames[5].blinked);
    drop(playback);

    // Four inter-frame waits, then the remaining six frames of the phase
    assert_eq!(timer.sleeps()[4], Duration::from_millis(300));
    assert_eq!(timer.elapsed(), Duration::from_millis(500));
}

#[test]
fn test_playback_off_mode_is_idempotent() {
    let data = "\x1b[5;41mstill\x1b[0m";
    let first = play(DataSource::text(data), config(ModemSpeed::Unlimited, BlinkMode::Off));
    let again = play(DataSource::text(data), config(ModemSpeed::Unlimited, BlinkMode::Off));

    assert_eq!(first.len(), 1);
    assert!(!first[0].will_blink);
    assert!(!first[0].blinked);
    assert!(first[0].content_equals(&again[0]));
}

#[test]
fn test_playback_auto_without_blinking_text_stops() {
    let frames = play(
        DataSource::text("steady"),
        config(ModemSpeed::Unlimited, BlinkMode::Auto),
    );
    assert_eq!(frames.len(), 1);
    assert!(!frames[0].will_blink);
}

#[test]
fn test_playback_host_mode_toggles_but_never_sustains() {
    let mut data = b"\x1b[5m".to_vec();
    data.extend_from_slice(&[b'x'; 296]);
    let frames = play(
        DataSource::bytes(data),
        config(ModemSpeed::Bps(2400), BlinkMode::Host),
    );

    // 12 bytes per frame, phase flips every 10 frames
    assert_eq!(frames.len(), 25);
    assert!(frames.iter().all(|frame| frame.will_blink));
    assert!(!frames[9].blinked);
    assert!(frames[10].blinked);
    assert!(!frames[20].blinked);
    assert!(!frames[24].status.playing);
}

#[test]
fn test_playback_seek_matches_unseeked_tail() {
    let data: Vec<u8> = b"\x1b[1;32m0123456789\r\n\x1b[44mabcdefghij\r\nKLMNOPQRST\r\n".to_vec();
    assert_eq!(data.len(), 48);
    // 2400 bps = 12 bytes per frame
    let speed = ModemSpeed::Bps(2400);

    let unseeked = play(DataSource::bytes(data.clone()), config(speed, BlinkMode::Off));
    let mut seek_config = config(speed, BlinkMode::Off);
    seek_config.seek = Seek {
        position: 0.5,
        resume: true,
    };
    let seeked = play(DataSource::bytes(data), seek_config);

    assert_eq!(unseeked.len(), 4);
    assert_eq!(seeked.len(), 3);
    assert_eq!(seeked[0].status.position, 0.5);
    for (a, b) in seeked.iter().zip(&unseeked[1..]) {
        assert!(a.content_equals(b));
        assert_eq!(a.status, b.status);
    }
}

#[test]
fn test_playback_seek_without_resume_pauses() {
    let mut seek_config = config(ModemSpeed::Bps(2400), BlinkMode::Off);
    seek_config.seek = Seek {
        position: 0.5,
        resume: false,
    };
    let frames = play(DataSource::text("0123456789"), seek_config.clone());

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].status, PlaybackStatus::stopped(0.5));
    assert!(frames[0].line_text(0).starts_with("01234 "));

    seek_config.seek.position = 0.0;
    let frames = play(DataSource::text("0123456789"), seek_config);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].status, PlaybackStatus::stopped(0.0));
    assert_eq!(frames[0].line_text(0).trim(), "");
}

#[test]
fn test_playback_empty_input() {
    let frames = play(DataSource::bytes(Vec::new()), PlaybackConfig::default());

    assert_eq!(frames.len(), 1);
    let frame = &frames[0];
    assert_eq!((frame.width, frame.height), (79, 22));
    assert_eq!(frame.status, PlaybackStatus::stopped(0.0));
    assert!(frame.lines.iter().all(|line| line.len() == 1));
    assert!(frame.to_text().chars().all(|c| c == ' ' || c == '\n'));
}

#[test]
fn test_playback_source_error_rendered_as_text() {
    let mut host = Recorder::default();
    let source = DataSource::pending(|| {
        Err(SourceError::Unavailable(
            "connection refused: ☺".to_string(),
        ))
    });
    let frames: Vec<Frame> = Playback::with_parts(
        source,
        config(ModemSpeed::Unlimited, BlinkMode::Off),
        ManualTimer::new(),
        &mut host,
    )
    .collect();

    // Placeholder while pending, then the rendered error
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].status, PlaybackStatus::default());
    assert!(frames[0].metadata.is_none());
    assert!(frames[0].error.is_none());

    let frame = &frames[1];
    assert!(frame.line_text(0).starts_with("connection refused: ☺"));
    assert_eq!(
        frame.error.as_ref().map(|e| e.to_string()),
        Some("connection refused: ☺".to_string())
    );
    assert_eq!(host.errors, vec!["connection refused: ☺".to_string()]);
    // The placeholder status reaches the host before the rendered one
    assert_eq!(
        host.statuses,
        vec![PlaybackStatus::default(), PlaybackStatus::stopped(1.0)]
    );
}

#[test]
fn test_playback_empty_pending_source() {
    let mut host = Recorder::default();
    let source = DataSource::pending(|| Ok(Vec::new()));
    let frames: Vec<Frame> = Playback::with_parts(
        source,
        PlaybackConfig::default(),
        ManualTimer::new(),
        &mut host,
    )
    .collect();

    // The loading placeholder, then the single empty-input frame
    assert_eq!(frames.len(), 2);
    assert!(frames[0].metadata.is_none());
    assert_eq!(frames[1].status, PlaybackStatus::stopped(0.0));
    assert_eq!(frames[1].metadata, Some(Vec::new()));
    assert_eq!(
        host.statuses,
        vec![PlaybackStatus::default(), PlaybackStatus::stopped(0.0)]
    );
    assert_eq!(host.metadata, vec![Vec::<String>::new()]);
}

#[test]
fn test_playback_unmappable_error_text_replaced() {
    let source = DataSource::pending(|| Err(SourceError::Unavailable("bad ♥ 字".to_string())));
    let frames = play(source, config(ModemSpeed::Unlimited, BlinkMode::Off));

    assert!(frames[1].line_text(0).starts_with("bad ♥ ?"));
}

#[test]
fn test_playback_pending_source_loaded_once() {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    let source = DataSource::pending(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(b"shared".to_vec())
    });

    let first = play(source.clone(), config(ModemSpeed::Unlimited, BlinkMode::Off));
    let second = play(source, config(ModemSpeed::Unlimited, BlinkMode::Off));

    assert_eq!(first.len(), 2);
    // Already resolved: no placeholder the second time
    assert_eq!(second.len(), 1);
    assert!(second[0].content_equals(&first[1]));
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_playback_host_callbacks() {
    let mut host = Recorder::default();
    let data = b"ding\x07dong\x07\x1aSAUCE00\x00Title".to_vec();
    let frames: Vec<Frame> = Playback::with_parts(
        DataSource::bytes(data),
        config(ModemSpeed::Bps(1200), BlinkMode::Off),
        ManualTimer::new(),
        &mut host,
    )
    .collect();

    // 6 bytes per frame over 24 bytes
    assert_eq!(frames.len(), 4);
    assert_eq!(host.beeps, 2);
    assert!(host.errors.is_empty());
    assert_eq!(host.metadata.first(), Some(&Vec::new()));
    assert_eq!(
        host.metadata.last(),
        Some(&vec!["SAUCE00".to_string(), "Title".to_string()])
    );
    assert_eq!(host.statuses.last(), Some(&PlaybackStatus::stopped(1.0)));
    assert!(host.statuses[..3].iter().all(|status| status.playing));
}

#[test]
fn test_playback_metadata_reported_without_trailer() {
    let mut host = Recorder::default();
    let frames: Vec<Frame> = Playback::with_parts(
        DataSource::text("hello"),
        config(ModemSpeed::Unlimited, BlinkMode::Off),
        ManualTimer::new(),
        &mut host,
    )
    .collect();

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].metadata, Some(Vec::new()));
    assert_eq!(host.metadata, vec![Vec::<String>::new()]);
}

#[test]
fn test_playback_metadata_reported_once_across_bursts() {
    let mut host = Recorder::default();
    // 12 bytes per frame over 18 bytes
    let frames: Vec<Frame> = Playback::with_parts(
        DataSource::text("hello world, again"),
        config(ModemSpeed::Bps(2400), BlinkMode::Off),
        ManualTimer::new(),
        &mut host,
    )
    .collect();

    assert_eq!(frames.len(), 2);
    assert_eq!(host.metadata, vec![Vec::<String>::new()]);
}

#[test]
fn test_playback_empty_input_reports_metadata() {
    let mut host = Recorder::default();
    let frames: Vec<Frame> = Playback::with_parts(
        DataSource::bytes(Vec::new()),
        PlaybackConfig::default(),
        ManualTimer::new(),
        &mut host,
    )
    .collect();

    assert_eq!(frames.len(), 1);
    assert_eq!(host.metadata, vec![Vec::<String>::new()]);
    assert_eq!(host.statuses, vec![PlaybackStatus::stopped(0.0)]);
}

#[test]
fn test_playback_timer_swap_keeps_sustain_disabled() {
    let frames: Vec<Frame> = Playback::new(
        DataSource::text("\x1b[5mX"),
        config(ModemSpeed::Unlimited, BlinkMode::Auto),
    )
    .without_blink_sustain()
    .with_timer(ManualTimer::new())
    .take(5)
    .collect();

    assert_eq!(frames.len(), 1);
    assert!(frames[0].will_blink);
}

#[test]
fn test_playback_cancel_stops_sustain() {
    let mut playback = Playback::with_parts(
        DataSource::text("\x1b[5mX"),
        config(ModemSpeed::Unlimited, BlinkMode::Auto),
        ManualTimer::new(),
        NoopHost,
    );
    let token = playback.cancel_token();

    assert_eq!(playback.by_ref().take(4).count(), 4);
    token.cancel();
    assert!(playback.next().is_none());
    assert!(playback.is_done());
    assert!(playback.next().is_none());
}

#[test]
fn test_playback_cancel_wakes_real_timer() {
    let mut cfg = config(ModemSpeed::Unlimited, BlinkMode::Auto);
    cfg.blink_duration_ms = 60_000;
    let playback = Playback::new(DataSource::text("\x1b[5mX"), cfg);
    let token = playback.cancel_token();

    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        token.cancel();
    });

    let start = Instant::now();
    let mut count = 0;
    let last = playback.run(|_| count += 1);
    handle.join().unwrap();

    // Only the rendered frame arrives before the first blink wait is cut short
    assert!(start.elapsed() < Duration::from_secs(30));
    assert_eq!(count, 1);
    assert!(last.is_some_and(|frame| frame.will_blink && !frame.blinked));
}
