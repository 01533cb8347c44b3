//! Property tests over arbitrary byte streams

use ansi_replay::parser::Parser;
use ansi_replay::playback::{render, DataSource, Frame, ManualTimer, NoopHost, Playback};
use ansi_replay::{ModemSpeed, PlaybackConfig, Seek};
use proptest::prelude::*;

/// Bytes biased towards escape sequences and controls
fn ansi_bytes() -> impl Strategy<Value = Vec<u8>> {
    let piece = prop_oneof![
        4 => any::<u8>().prop_map(|b| vec![b]),
        2 => "[ -~]{1,8}".prop_map(String::into_bytes),
        1 => Just(b"\r\n".to_vec()),
        1 => Just(vec![0x07]),
        2 => ("[0-9;]{0,6}", "[ABCDHJKLMPSTXfmsu]")
            .prop_map(|(params, command)| format!("\x1b[{params}{command}").into_bytes()),
    ];
    prop::collection::vec(piece, 0..40).prop_map(|pieces| pieces.concat())
}

fn play(data: &[u8], config: PlaybackConfig) -> Vec<Frame> {
    Playback::with_parts(
        DataSource::bytes(data.to_vec()),
        config,
        ManualTimer::new(),
        NoopHost,
    )
    .collect()
}

fn small_config(speed: ModemSpeed) -> PlaybackConfig {
    PlaybackConfig {
        modem_speed: speed,
        min_width: 10,
        min_height: 3,
        max_width: 20,
        max_height: 6,
        ..PlaybackConfig::default()
    }
}

proptest! {
    #[test]
    fn unlimited_speed_renders_one_frame(data in ansi_bytes()) {
        let frames = play(&data, small_config(ModemSpeed::Unlimited));

        prop_assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        prop_assert_eq!(frame.lines.len(), frame.height);
        prop_assert!((10..=20).contains(&frame.width));
        prop_assert!((3..=6).contains(&frame.height));
        for line in &frame.lines {
            let width: usize = line.iter().map(|segment| segment.width()).sum();
            prop_assert_eq!(width, frame.width);
        }
    }

    #[test]
    fn fixed_dimensions_skip_sizing(data in ansi_bytes()) {
        let config = PlaybackConfig {
            min_width: 20,
            min_height: 6,
            ..small_config(ModemSpeed::Bps(4800))
        };
        let mut playback = Playback::with_parts(
            DataSource::bytes(data),
            config,
            ManualTimer::new(),
            NoopHost,
        );
        let frames: Vec<Frame> = playback.by_ref().collect();

        prop_assert!(!playback.sizing_performed());
        prop_assert!(frames.iter().all(|frame| frame.width == 20 && frame.height == 6));
    }

    #[test]
    fn positions_never_decrease(data in ansi_bytes(), bps in 300u32..20_000) {
        let frames = play(&data, small_config(ModemSpeed::Bps(bps)));

        prop_assert!(!frames.is_empty());
        for pair in frames.windows(2) {
            prop_assert!(pair[0].status.position <= pair[1].status.position);
        }
        let last = &frames[frames.len() - 1];
        prop_assert!(!last.status.playing);
    }

    #[test]
    fn throttled_playback_ends_like_one_shot(data in ansi_bytes(), bps in 300u32..20_000) {
        let frames = play(&data, small_config(ModemSpeed::Bps(bps)));
        let one_shot = render(
            &DataSource::bytes(data),
            &small_config(ModemSpeed::Unlimited),
        );

        prop_assert!(frames[frames.len() - 1].content_equals(&one_shot));
    }

    #[test]
    fn seeking_matches_unseeked_playback(data in ansi_bytes(), position in 0.0f64..=1.0) {
        let speed = ModemSpeed::Bps(2400);
        let unseeked = play(&data, small_config(speed));
        let seeked = play(&data, PlaybackConfig {
            seek: Seek { position, resume: true },
            ..small_config(speed)
        });

        for frame in &seeked {
            if let Some(same) = unseeked
                .iter()
                .find(|other| other.status.position == frame.status.position)
            {
                prop_assert!(frame.content_equals(same));
            }
        }
        let (a, b) = (&seeked[seeked.len() - 1], &unseeked[unseeked.len() - 1]);
        prop_assert!(a.content_equals(b));
    }

    #[test]
    fn parser_ignores_chunk_boundaries(data in ansi_bytes(), split in 1usize..16) {
        let whole = Parser::new().parse(&data);

        let mut parser = Parser::new();
        let chunked: Vec<_> = data
            .chunks(split)
            .flat_map(|chunk| parser.parse(chunk))
            .collect();

        prop_assert_eq!(whole, chunked);
    }
}
