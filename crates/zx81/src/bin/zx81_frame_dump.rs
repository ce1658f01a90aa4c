use std::path::PathBuf;

use anyhow::{Context, Result};

use zx81::{FrameDriver, FrameRecorder, LoaderStrategy, Sample, Zx81, Zx81Config, LINE_SAMPLES};

const USAGE: &str =
    "Usage: zx81_frame_dump <rom_path> <out_gray8_path> [frames] [program_path] [--signal]";

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let rom_path: PathBuf = args.next().map(PathBuf::from).unwrap_or_else(|| {
        eprintln!("{USAGE}");
        std::process::exit(2);
    });
    let out_path: PathBuf = args.next().map(PathBuf::from).unwrap_or_else(|| {
        eprintln!("{USAGE}");
        std::process::exit(2);
    });
    let frames: u32 = match args.next() {
        Some(frames) => frames
            .parse()
            .with_context(|| format!("invalid frame count '{frames}'"))?,
        None => 100,
    };
    let mut program_path = None;
    let mut loader = LoaderStrategy::Instant;
    for arg in args {
        if arg == "--signal" {
            loader = LoaderStrategy::Signal;
        } else {
            program_path = Some(PathBuf::from(arg));
        }
    }

    let rom = std::fs::read(&rom_path)
        .with_context(|| format!("failed to read ROM '{}'", rom_path.display()))?;
    let mut zx81 = Zx81::with_config(Zx81Config::builder().loader(loader).build());
    zx81.load_rom(&rom)?;

    if let Some(path) = &program_path {
        let program = std::fs::read(path)
            .with_context(|| format!("failed to read program '{}'", path.display()))?;
        zx81.load_program(&program)?;
    }

    let mut driver = FrameDriver::default();
    let mut recorder = FrameRecorder::default();
    let mut vsyncs = 0;
    for _ in 0..frames {
        if driver.run_one_frame(&mut zx81, &mut recorder).vsync {
            vsyncs += 1;
        }
    }

    // One byte per sample, every line padded or cut to the same width.
    let lines = recorder.last_frame();
    let mut buffer = Vec::with_capacity(lines.len() * LINE_SAMPLES);
    for line in lines {
        buffer.extend((0..LINE_SAMPLES).map(|x| match line.get(x) {
            Some(Sample::Paper) => 0xFF,
            Some(Sample::Ink) | Some(Sample::Sync) | None => 0x00,
        }));
    }

    std::fs::write(&out_path, &buffer)
        .with_context(|| format!("failed to write '{}'", out_path.display()))?;

    println!(
        "Wrote {} bytes ({}x{} gray8) after {} frames ({} with vsync) to '{}'",
        buffer.len(),
        LINE_SAMPLES,
        lines.len(),
        frames,
        vsyncs,
        out_path.display()
    );
    Ok(())
}
