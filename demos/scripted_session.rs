//! Runs a complete session over a generated sheet without operator input.
//!
//! Usage: cargo run --example scripted_session [OUTPUT_DIR]

use std::path::PathBuf;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use tracing_subscriber::EnvFilter;

use glyphseg::{Pipeline, RunOutcome, ScriptedPresenter, SegmenterConfig};

const INK: Rgb<u8> = Rgb([0, 0, 0]);

/// Two complete glyphs, a dotted "i" and a speck of noise.
fn sheet() -> RgbImage {
    let mut img = RgbImage::from_pixel(240, 120, Rgb([255, 255, 255]));
    draw_filled_rect_mut(&mut img, Rect::at(20, 20).of_size(40, 80), INK);
    draw_filled_rect_mut(&mut img, Rect::at(80, 40).of_size(30, 60), INK);
    draw_filled_rect_mut(&mut img, Rect::at(140, 50).of_size(10, 50), INK);
    draw_filled_circle_mut(&mut img, (145, 35), 6, INK);
    draw_filled_rect_mut(&mut img, Rect::at(200, 90).of_size(6, 6), INK);
    img
}

// Segments come largest first: two glyphs, the stem, the dot, the speck.
const SCRIPT: &str = "# thresholding and detection previews


# tagging
c
c
p
p
n
# merging: accept the dot into the stem's set
a
";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("scripted_output"));
    let work = tempfile::TempDir::new()?;
    let image_path = work.path().join("sheet.png");
    sheet().save(&image_path)?;

    let config = SegmenterConfig::new(&image_path)
        .with_output_dir(&output_dir)
        .with_poll_interval_ms(0);
    let mut presenter = ScriptedPresenter::from_script(SCRIPT);

    match Pipeline::open(config)?.run(&mut presenter)? {
        RunOutcome::Completed(summary) => {
            println!("Exported {} files to {}", summary.total(), output_dir.display());
            for path in summary.correct.iter().chain(&summary.partial_sets) {
                println!("  {}", path.display());
            }
        }
        RunOutcome::Interrupted { stage } => println!("Stopped during {}", stage.name()),
    }
    Ok(())
}
