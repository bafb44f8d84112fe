use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::Parser;
use clap_num::{maybe_hex, number_range};
use tracing::{info, level_filters::LevelFilter};

use chip8_vm::{Chip8, Chip8Result, Chip8Runner, FRAME_TIME_STEP, MAX_SPEED, MIN_SPEED};

fn parse_speed(s: &str) -> Result<u8, String> {
    number_range(s, MIN_SPEED, MAX_SPEED)
}

fn parse_key(s: &str) -> Result<u8, String> {
    match u8::from_str_radix(s, 16) {
        Ok(key) if key <= 0xF => Ok(key),
        _ => Err(format!("Invalid key: '{}', expected 0-F", s)),
    }
}

/// Headless CHIP-8 runner.
///
/// Runs a ROM for a fixed number of frames and prints the final display.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Path to the CHIP-8 ROM file
    rom_path: PathBuf,

    /// Frames between timer ticks (1-5)
    #[arg(short, long, default_value = "1", value_parser = parse_speed)]
    speed: u8,

    /// Number of frames to run
    #[arg(short, long, default_value = "600", value_parser = maybe_hex::<u64>)]
    frames: u64,

    /// Pace frames at 60 Hz instead of running as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Keys (0-F) held down for the whole run
    #[arg(short, long, value_delimiter = ',', value_parser = parse_key)]
    keys: Vec<u8>,

    /// Print the register state after the run
    #[arg(short, long)]
    dump: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(args.verbose))
        .with_writer(std::io::stderr)
        .init();

    let rom = std::fs::read(&args.rom_path).context("Failed to read ROM file")?;

    let mut chip8 = Chip8::new();
    chip8.set_speed(args.speed);
    chip8
        .load(&rom)
        .context("Failed to load ROM into CHIP-8 memory")?;

    let mut runner = Chip8Runner::new(chip8);
    for &key in &args.keys {
        runner.press_key(key);
    }

    info!(
        "Running {} for {} frames at speed {}",
        args.rom_path.display(),
        args.frames,
        args.speed
    );

    let mut last_frame_instant = Instant::now();
    while runner.frames() < args.frames {
        let result = if args.realtime {
            thread::sleep(Duration::from_secs_f32(FRAME_TIME_STEP));
            let now = Instant::now();
            let dt = (now - last_frame_instant).as_secs_f32();
            last_frame_instant = now;

            runner.update(dt)
        } else {
            runner.run_frame()
        };

        if result.context("Chip8 Execution error")? == Chip8Result::Paused {
            break;
        }
    }

    print!("{}", runner.framebuffer().render_ascii());
    if args.dump {
        println!("{}", runner.chip8_ref().debug_state());
    }
    if runner.has_sound() {
        info!("Sound timer still active");
    }

    Ok(())
}
