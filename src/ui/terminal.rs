use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use image::RgbImage;
use tracing::debug;

use crate::error::{Result, SegmenterError};
use crate::ui::Presenter;

/// Interactive presenter for a terminal session.
///
/// Frames are written as PNG files under the preview directory, one file per
/// surface, so any image viewer that reloads on change can follow along.
/// Keys are read line by line from stdin: the first character of a line is
/// the key and an empty line confirms.
pub struct TerminalPresenter {
    preview_dir: PathBuf,
    keys: Option<Receiver<char>>,
    last_frames: HashMap<String, RgbImage>,
}

impl TerminalPresenter {
    pub fn new(preview_dir: impl Into<PathBuf>) -> Self {
        Self {
            preview_dir: preview_dir.into(),
            keys: None,
            last_frames: HashMap::new(),
        }
    }

    pub fn frame_path(&self, surface: &str) -> PathBuf {
        self.preview_dir.join(format!("{}.png", slug(surface)))
    }

    fn keys(&mut self) -> &Receiver<char> {
        self.keys.get_or_insert_with(spawn_stdin_reader)
    }
}

fn spawn_stdin_reader() -> Receiver<char> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let key = line.trim().chars().next().unwrap_or(' ');
            if sender.send(key).is_err() {
                break;
            }
        }
    });
    receiver
}

/// File-name friendly form of a surface name
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

impl Presenter for TerminalPresenter {
    fn open_surface(&mut self, name: &str) -> Result<()> {
        fs::create_dir_all(&self.preview_dir)?;
        println!("[{}] preview: {}", name, self.frame_path(name).display());
        Ok(())
    }

    fn close_surface(&mut self, name: &str) -> Result<()> {
        self.last_frames.remove(name);
        let path = self.frame_path(name);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn show(&mut self, name: &str, frame: &RgbImage) -> Result<()> {
        if self.last_frames.get(name) == Some(frame) {
            return Ok(());
        }
        let path = self.frame_path(name);
        frame.save(&path)?;
        debug!(path = %path.display(), "Wrote preview frame");
        self.last_frames.insert(name.to_string(), frame.clone());
        Ok(())
    }

    fn poll_key(&mut self, wait: Duration) -> Result<Option<char>> {
        match self.keys().recv_timeout(wait) {
            Ok(key) => Ok(Some(key)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(SegmenterError::Presenter("operator input closed".to_string()))
            }
        }
    }

    fn announce(&mut self, message: &str) {
        println!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Step 3. Segment tagging"), "step_3_segment_tagging");
        assert_eq!(slug("  Merge!  "), "merge");
    }

    #[test]
    fn test_frames_written_and_removed() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut presenter = TerminalPresenter::new(dir.path().join("preview"));
        let name = "Step 1. Thresholding";

        presenter.open_surface(name).unwrap();
        presenter.show(name, &RgbImage::new(3, 3)).unwrap();
        let path = presenter.frame_path(name);
        assert!(path.exists());

        presenter.close_surface(name).unwrap();
        assert!(!path.exists());
    }
}
