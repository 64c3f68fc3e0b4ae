use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use glyphseg::config::{
    DEFAULT_CROP_MARGIN, DEFAULT_MIN_AREA, DEFAULT_OUTLINE_THICKNESS, DEFAULT_OUTPUT_DIR,
    DEFAULT_SURROUNDINGS_SIZE, DEFAULT_THRESHOLD,
};
use glyphseg::core::progress::load_session;
use glyphseg::{
    Pipeline, Presenter, RunOutcome, ScriptedPresenter, SegmenterConfig, Session, TerminalPresenter,
};

#[derive(Parser)]
#[command(name = "glyphseg")]
#[command(about = "Segment a scanned glyph sheet into a curated dataset of glyph crops")]
struct Cli {
    /// Path to the source image
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Resume from this progress file
    #[arg(long, value_name = "PATH")]
    progress_file: Option<PathBuf>,

    /// Where progress is saved (defaults to the --progress-file path)
    #[arg(long, value_name = "PATH")]
    save_progress: Option<PathBuf>,

    /// Luminosity threshold separating page from ink
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: u8,

    /// Minimum polygon area of a segment
    #[arg(long, default_value_t = DEFAULT_MIN_AREA)]
    min_area: u32,

    /// Outline thickness in the segmentation preview
    #[arg(long, default_value_t = DEFAULT_OUTLINE_THICKNESS)]
    outline_thickness: u32,

    /// Preview crop size relative to the segment size
    #[arg(long, default_value_t = DEFAULT_SURROUNDINGS_SIZE, value_parser = parse_surroundings)]
    surroundings_size: f32,

    /// Export root directory
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Padding around exported crops, in pixels
    #[arg(long, default_value_t = DEFAULT_CROP_MARGIN)]
    crop_margin: u32,

    /// Directory the preview frames are written to
    #[arg(long, value_name = "DIR", default_value = "preview")]
    preview_dir: PathBuf,

    /// Read operator keys from this file instead of stdin
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Finite, non-negative zoom factor
fn parse_surroundings(value: &str) -> Result<f32, String> {
    let size: f32 = value.parse().map_err(|e| format!("{}", e))?;
    if !size.is_finite() || size < 0.0 {
        return Err(format!("must be a finite number >= 0, got {}", value));
    }
    Ok(size)
}

impl Cli {
    fn config(&self) -> SegmenterConfig {
        SegmenterConfig::new(&self.image_path)
            .with_threshold(self.threshold)
            .with_min_area(self.min_area)
            .with_outline_thickness(self.outline_thickness)
            .with_surroundings_size(self.surroundings_size)
            .with_output_dir(&self.output_dir)
            .with_crop_margin(self.crop_margin)
    }

    fn session(&self) -> anyhow::Result<Session> {
        let Some(path) = &self.progress_file else {
            return Ok(Session::new(self.config()));
        };

        let mut session = load_session(path)?;
        if session.config.image_path != self.image_path {
            info!(
                stored = %session.config.image_path.display(),
                given = %self.image_path.display(),
                "Using image path from the command line"
            );
            session.config.image_path = self.image_path.clone();
        }
        info!(stage = session.stage.name(), "Resuming session");
        Ok(session)
    }

    fn presenter(&self) -> anyhow::Result<Box<dyn Presenter>> {
        match &self.replay {
            Some(path) => {
                let script = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read key script {:?}", path))?;
                Ok(Box::new(ScriptedPresenter::from_script(&script)))
            }
            None => Ok(Box::new(TerminalPresenter::new(&self.preview_dir))),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let session = args.session()?;
    let mut pipeline = Pipeline::from_session(session)?;

    let save_path = args.save_progress.clone().or_else(|| args.progress_file.clone());
    match save_path {
        Some(path) => pipeline = pipeline.with_progress_file(path),
        None => warn!("No progress file given, progress will not be saved"),
    }
    if let Some(debug_dir) = args.debug_out.clone() {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    let mut presenter = args.presenter()?;
    let outcome = pipeline
        .run(presenter.as_mut())
        .context("Segmentation session failed")?;

    match outcome {
        RunOutcome::Completed(summary) => {
            println!("\n=== Export Results ===");
            println!("Correct segments:  {}", summary.correct.len());
            println!("Merged segments:   {}", summary.merged.len());
            println!("Partial sets:      {}", summary.partial_sets.len());
            println!("Total files:       {}", summary.total());
        }
        RunOutcome::Interrupted { stage } => {
            println!("\nSession stopped during {}.", stage.name());
        }
    }

    Ok(())
}
