//! Screen benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ansi_replay::core::{scan, ScanOptions};
use ansi_replay::playback::{render, DataSource};
use ansi_replay::{ModemSpeed, PlaybackConfig, Terminal};

fn sample_art() -> Vec<u8> {
    let mut data = Vec::new();
    for row in 0..60 {
        data.extend_from_slice(format!("\x1b[{};1H", row % 25 + 1).as_bytes());
        for col in 0..80u8 {
            data.extend_from_slice(format!("\x1b[{}m", 30 + col % 8).as_bytes());
            data.push(0xB0 + col % 3);
        }
    }
    data
}

fn bench_terminal_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // Lines past the bottom scroll the buffer
    let data: Vec<u8> = (0..200)
        .flat_map(|i| format!("Line {}: some text content here\r\n", i).into_bytes())
        .collect();
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("scroll", |b| {
        b.iter(|| {
            let mut terminal = Terminal::rendering(80, 25, 80, 25, false);
            terminal.process(black_box(&data));
            black_box(terminal)
        })
    });

    group.finish();
}

fn bench_terminal_measure(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    let data = sample_art();
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("sizing_pass", |b| {
        b.iter(|| {
            let mut terminal = Terminal::measuring(80, 25);
            terminal.process(black_box(&data));
            black_box(terminal.extent())
        })
    });

    group.finish();
}

fn bench_segment_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    let mut terminal = Terminal::rendering(80, 25, 80, 25, false);
    terminal.process(&sample_art());

    group.bench_function("scan_buffer", |b| {
        b.iter(|| {
            if let Some(buffer) = terminal.buffer() {
                black_box(scan(buffer, ScanOptions::default()));
            }
        })
    });

    group.finish();
}

fn bench_full_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    let source = DataSource::bytes(sample_art());
    let config = PlaybackConfig {
        modem_speed: ModemSpeed::Unlimited,
        ..PlaybackConfig::default()
    };

    group.bench_function("render", |b| {
        b.iter(|| black_box(render(&source, &config)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_terminal_scroll,
    bench_terminal_measure,
    bench_segment_scan,
    bench_full_render
);
criterion_main!(benches);
