//! A headless frontend: run a ROM for a fixed number of frames without any
//! window, then dump the framebuffer as a PNG, hash it for regression
//! comparisons, and print whatever the ROM wrote to the serial port.

use std::fs::{create_dir_all, read};
use std::time::Instant;

use anyhow::{bail, Context};
use blake2::{Blake2s, Digest};
use gumdrop::Options;
use image::ImageBuffer;
use simplelog::{Config, LevelFilter, TermLogger, TerminalMode};

use dotboy_core::emulator::{AudioSink, Emulator, InputSource, NullInput, NullSink, VideoSink, CYCLES_PER_FRAME};
use dotboy_core::hardware::ppu::palette::RGB;
use dotboy_core::hardware::ppu::{FRAMEBUFFER_SIZE, RESOLUTION_HEIGHT, RESOLUTION_WIDTH, RGB_CHANNELS};
use dotboy_core::EmulatorOptionsBuilder;

use crate::options::AppOptions;
use crate::report::RunReport;

mod options;
mod report;

/// Counts frames and keeps a copy of the most recent one.
struct FrameCollector {
    frames_seen: u64,
    last_frame: Vec<RGB>,
}

impl VideoSink for FrameCollector {
    fn frame_ready(&mut self, frame: &[RGB; FRAMEBUFFER_SIZE]) {
        self.frames_seen += 1;
        self.last_frame.copy_from_slice(frame);
    }
}

fn main() -> anyhow::Result<()> {
    let options: AppOptions = AppOptions::parse_args_default_or_exit();

    let log_level = if options.verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    TermLogger::init(log_level, Config::default(), TerminalMode::Mixed)?;

    let rom = read(&options.rom).with_context(|| format!("Could not read ROM {:?}", options.rom))?;
    if rom.len() < 0x8000 {
        bail!("ROM {:?} is smaller than the minimal 32 KiB image", options.rom);
    }

    let saved_ram = match &options.saved_ram {
        Some(path) => Some(read(path).with_context(|| format!("Could not read saved RAM {:?}", path))?),
        None => None,
    };

    let emu_opts = EmulatorOptionsBuilder::new().saved_ram(saved_ram).build();
    let mut emulator = Emulator::new(&rom, emu_opts);

    let mut video = FrameCollector {
        frames_seen: 0,
        last_frame: vec![RGB::default(); FRAMEBUFFER_SIZE],
    };
    let mut audio = NullSink;
    let mut input = NullInput;

    let start_time = Instant::now();
    run_frames(&mut emulator, options.frames, &mut video, &mut audio, &mut input);
    let elapsed = start_time.elapsed();

    println!(
        "Emulated {} frames ({} machine cycles) in {:.2?}",
        video.frames_seen,
        emulator.cycles_performed(),
        elapsed
    );

    let serial_output = String::from_utf8_lossy(emulator.serial_output()).into_owned();
    if !serial_output.is_empty() {
        println!("Serial output: {}", serial_output.trim_end());
    }

    let rom_stem = options
        .rom
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("unknown")
        .to_owned();

    create_dir_all(&options.output_dir)
        .with_context(|| format!("Could not create output directory {:?}", options.output_dir))?;

    let image_path = options.output_dir.join(format!("{}.png", rom_stem));
    save_image(&video.last_frame, &image_path)?;

    let frame_hash = hash_frame(&video.last_frame);
    println!("Frame hash: {}", frame_hash);

    if options.report {
        let report = RunReport {
            rom: rom_stem.clone(),
            frames: video.frames_seen,
            machine_cycles: emulator.cycles_performed(),
            frame_hash,
            serial_output,
        };
        let report_path = options.output_dir.join(format!("{}.json", rom_stem));
        report
            .save(&report_path)
            .with_context(|| format!("Could not write the run report to {:?}", report_path))?;
    }

    if let Some(battery_ram) = emulator.battery_ram() {
        let save_path = options.rom.with_extension("sav");
        std::fs::write(&save_path, battery_ram)
            .with_context(|| format!("Could not persist battery RAM to {:?}", save_path))?;
        println!("Saved battery RAM to {:?}", save_path);
    }

    Ok(())
}

/// Run the emulator until `frames` frames have been produced, a STOP
/// executes, or a generous cycle bound is hit (the LCD may be off).
fn run_frames(
    emulator: &mut Emulator,
    frames: u64,
    video: &mut FrameCollector,
    audio: &mut dyn AudioSink,
    input: &mut dyn InputSource,
) {
    let cycle_bound = frames.saturating_mul(CYCLES_PER_FRAME * 2);

    let mut spent = 0u64;
    while video.frames_seen < frames && spent < cycle_bound && !emulator.stop_requested() {
        spent += emulator.emulate_cycle(video, audio, input) as u64;
    }
}

/// Render and save the provided framebuffer as a PNG.
fn save_image(framebuffer: &[RGB], path: &std::path::Path) -> anyhow::Result<()> {
    let mut raw_buffer = vec![0u8; framebuffer.len() * RGB_CHANNELS];

    for (i, colour) in framebuffer.iter().enumerate() {
        let offset = i * RGB_CHANNELS;
        raw_buffer[offset] = colour.0;
        raw_buffer[offset + 1] = colour.1;
        raw_buffer[offset + 2] = colour.2;
    }

    let image_buffer: ImageBuffer<image::Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_raw(RESOLUTION_WIDTH as u32, RESOLUTION_HEIGHT as u32, raw_buffer)
            .context("Framebuffer dimensions no longer match the image size")?;

    image_buffer
        .save(path)
        .with_context(|| format!("Could not save the framebuffer to {:?}", path))?;

    Ok(())
}

/// Blake2s hash of the framebuffer, hex encoded.
fn hash_frame(framebuffer: &[RGB]) -> String {
    let mut hasher = Blake2s::new();
    for colour in framebuffer {
        hasher.update(&[colour.0, colour.1, colour.2]);
    }
    format!("{:x}", hasher.finalize())
}
