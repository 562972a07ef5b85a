mod replay;

use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use facesift_core::pipeline::analyze_frames_use_case::AnalyzeFramesUseCase;
use facesift_core::pipeline::engine_config::EngineConfig;
use facesift_core::pipeline::run_logger::LogRunLogger;

use crate::replay::{load_records, JsonlAnnotationSink, ReplayDetector, ReplayFrameSource};

/// Replays a recorded detection log through the adaptive filtering engine.
#[derive(Parser)]
#[command(name = "facesift")]
struct Cli {
    /// JSONL detection log: one {"frame","x","y","w","h","confidence"?} object per line.
    detections: PathBuf,

    /// Frame width of the recorded video, in pixels.
    #[arg(long)]
    width: u32,

    /// Frame height of the recorded video, in pixels.
    #[arg(long)]
    height: u32,

    /// Frame rate of the recorded video.
    #[arg(long, default_value = "30.0")]
    fps: f64,

    /// Total frame count; defaults to one past the highest logged frame index.
    #[arg(long)]
    frames: Option<usize>,

    /// Run detection every Nth frame (1 = every frame).
    #[arg(long, default_value = "3")]
    frame_step: usize,

    /// Warm-up samples to collect before calibrating thresholds.
    #[arg(long, default_value = "150")]
    warmup: usize,

    /// Grid-cell recurrences required before a detection is accepted (1 = off).
    #[arg(long, default_value = "2")]
    persistence: usize,

    /// Persistence grid cell size in pixels.
    #[arg(long, default_value = "60.0")]
    grid_size: f64,

    /// Write accepted detections as JSONL to this file (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write the run summary report to this file (default: stdout).
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let records = load_records(&cli.detections)?;
    let total_frames = cli
        .frames
        .unwrap_or_else(|| records.keys().max().map_or(0, |last| last + 1));
    log::info!(
        "loaded detections for {} frames, replaying {total_frames} frames",
        records.len()
    );

    let source = ReplayFrameSource::new(cli.width, cli.height, cli.fps, total_frames);
    let detector = ReplayDetector::new(records);
    let sink = JsonlAnnotationSink::create(cli.output.as_deref())?;

    let mut config = EngineConfig::default();
    config.frame_step = cli.frame_step;
    config.persistence_min_hits = cli.persistence;
    config.grid_size = cli.grid_size;
    config.calibration.warmup_target = cli.warmup;

    let mut use_case = AnalyzeFramesUseCase::new(
        Box::new(source),
        Box::new(detector),
        None,
        Box::new(sink),
        Some(Box::new(LogRunLogger::default())),
        config,
    )?;

    let summary = use_case.execute(&cli.detections)?;

    match cli.summary {
        Some(path) => fs::write(path, summary.render())?,
        None => io::stdout().write_all(summary.render().as_bytes())?,
    }

    Ok(())
}
