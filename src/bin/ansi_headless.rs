//! ANSI Art Headless Runner
//!
//! Renders ANSI art without a display. Reads a file or stdin and prints the
//! final frame as text, JSON, or 24-bit colour ANSI; optionally dumps every
//! frame of a simulated modem transfer as JSON lines.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use ansi_replay::playback::{DataSource, Frame, ManualTimer, NoopHost, Playback};
use ansi_replay::{BlinkMode, ModemSpeed, Palette, PlaybackConfig, SourceError};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("Try --help for usage.");
            return ExitCode::FAILURE;
        },
    };

    if options.show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let source = match &options.input_file {
        Some(path) => {
            let path = path.clone();
            DataSource::pending(move || fs::read(&path).map_err(SourceError::from))
        },
        None => {
            let mut data = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut data) {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            DataSource::bytes(data)
        },
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(&options, source, &mut out) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error writing output: {}", e);
            ExitCode::FAILURE
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Ansi,
}

#[derive(Debug, Clone)]
struct Options {
    config: PlaybackConfig,
    input_file: Option<PathBuf>,
    output_format: OutputFormat,
    /// Dump every frame at this line speed instead of the final frame only
    stream: bool,
    show_help: bool,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut config = PlaybackConfig {
        modem_speed: ModemSpeed::Unlimited,
        ..PlaybackConfig::default()
    };
    let mut input_file = None;
    let mut output_format = OutputFormat::Text;
    let mut stream = false;
    let mut show_help = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("Missing value for {}", name))
        };
        match arg.as_str() {
            "--config" => {
                let path = value(arg)?;
                let json = fs::read_to_string(&path)
                    .map_err(|e| format!("Error reading config '{}': {}", path, e))?;
                config = PlaybackConfig::from_json(&json).map_err(|e| e.to_string())?;
            },
            "-c" | "--cols" => {
                let cols = parse_number(arg, &value(arg)?)?;
                config.min_width = cols;
                config.max_width = cols;
            },
            "-r" | "--rows" => {
                let rows = parse_number(arg, &value(arg)?)?;
                config.max_height = rows;
                config.min_height = config.min_height.min(rows);
            },
            "-b" | "--baud" => {
                let bps = parse_number(arg, &value(arg)?)?;
                config.modem_speed = ModemSpeed::Bps(bps as u32);
                stream = true;
            },
            "--blink" => {
                config.blink_mode = match value(arg)?.as_str() {
                    "off" => BlinkMode::Off,
                    "auto" => BlinkMode::Auto,
                    "host" => BlinkMode::Host,
                    other => return Err(format!("Unknown blink mode '{}'", other)),
                };
            },
            "--transparency" => config.transparency = true,
            "-j" | "--json" => output_format = OutputFormat::Json,
            "-t" | "--text" => output_format = OutputFormat::Text,
            "-a" | "--ansi" => output_format = OutputFormat::Ansi,
            "-f" | "--file" => input_file = Some(PathBuf::from(value(arg)?)),
            "-h" | "--help" => show_help = true,
            _ => {
                // Treat as input file if no flag
                if input_file.is_none() && !arg.starts_with('-') {
                    input_file = Some(PathBuf::from(arg));
                } else {
                    return Err(format!("Unknown argument '{}'", arg));
                }
            },
        }
    }

    config.validate().map_err(|e| e.to_string())?;
    Ok(Options {
        config,
        input_file,
        output_format,
        stream,
        show_help,
    })
}

fn parse_number(flag: &str, value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("Invalid value '{}' for {}", value, flag)),
    }
}

/// Play `source` and write the result. Returns false when the source
/// could not be read.
fn run<W: Write>(options: &Options, source: DataSource, out: &mut W) -> io::Result<bool> {
    let playback = Playback::with_parts(
        source,
        options.config.clone(),
        ManualTimer::new(),
        NoopHost,
    )
    .without_blink_sustain();

    let mut last: Option<Frame> = None;
    for frame in playback {
        if options.stream {
            serde_json::to_writer(&mut *out, &frame)?;
            writeln!(out)?;
        }
        last = Some(frame);
    }

    let Some(frame) = last else {
        return Ok(true);
    };
    if let Some(error) = &frame.error {
        eprintln!("Error reading input: {}", error);
    }
    if !options.stream {
        write_frame(&frame, options.output_format, out)?;
    }
    Ok(frame.error.is_none())
}

fn write_frame<W: Write>(frame: &Frame, format: OutputFormat, out: &mut W) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(out, "ANSI Art ({}x{}):", frame.width, frame.height)?;
            writeln!(out, "---")?;
            write!(out, "{}", frame.to_text())?;
            writeln!(out, "---")?;
            if let Some(metadata) = frame.metadata.as_ref().filter(|m| !m.is_empty()) {
                for entry in metadata {
                    writeln!(out, "{}", entry)?;
                }
            }
        },
        OutputFormat::Json => {
            let json = frame.to_json().map_err(io::Error::from)?;
            writeln!(out, "{}", json)?;
        },
        OutputFormat::Ansi => write_ansi(frame, &Palette::default(), out)?,
    }
    Ok(())
}

/// Write the frame with 24-bit colour escapes, one row per line
fn write_ansi<W: Write>(frame: &Frame, palette: &Palette, out: &mut W) -> io::Result<()> {
    for line in &frame.lines {
        for segment in line {
            let (fg, bg) = palette.segment_colors(segment, frame.blinked);
            if let Some([r, g, b]) = fg {
                write!(out, "\x1b[38;2;{};{};{}m", r, g, b)?;
            }
            if let Some([r, g, b]) = bg {
                write!(out, "\x1b[48;2;{};{};{}m", r, g, b)?;
            }
            write!(out, "{}\x1b[0m", segment.text)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn print_help() {
    println!("ANSI Art Headless Runner");
    println!();
    println!("Usage: ansi-headless [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>         Fix the screen width (default: 79-80, detected)");
    println!("  -r, --rows <N>         Maximum screen height (default: 25)");
    println!("  -b, --baud <N>         Print every frame at N bits/s as JSON lines");
    println!("      --blink <MODE>     Blink mode: off, auto, host (default: off)");
    println!("      --transparency     Leave colours that were never set undrawn");
    println!("      --config <PATH>    Read playback settings from a JSON file");
    println!("  -f, --file <PATH>      Read input from file");
    println!("  -t, --text             Output the final frame as text (default)");
    println!("  -j, --json             Output the final frame as JSON");
    println!("  -a, --ansi             Output the final frame with 24-bit colour");
    println!("  -h, --help             Show this help message");
    println!();
    println!("If no input file is specified, reads from stdin.");
    println!("Set RUST_LOG=debug to trace sizing and playback.");
    println!();
    println!("Examples:");
    println!("  ansi-headless --ansi art.ans");
    println!("  ansi-headless -c 80 -r 50 --json < art.ans > frame.json");
    println!("  ansi-headless --baud 2400 art.ans > frames.jsonl");
}
