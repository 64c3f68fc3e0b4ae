use std::collections::VecDeque;
use std::time::Duration;

use image::RgbImage;

use crate::error::{Result, SegmenterError};
use crate::ui::Presenter;

/// Replays a fixed key sequence. Used for recorded sessions and tests.
#[derive(Debug, Default)]
pub struct ScriptedPresenter {
    keys: VecDeque<char>,
    opened: Vec<String>,
    closed: Vec<String>,
    frames_shown: usize,
    announcements: Vec<String>,
}

impl ScriptedPresenter {
    pub fn new(keys: impl IntoIterator<Item = char>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Parse a recorded session: one key per line, the first character of
    /// the line. Blank lines confirm and lines starting with `#` are skipped.
    pub fn from_script(script: &str) -> Self {
        let keys = script.lines().filter_map(|line| {
            let line = line.trim();
            if line.starts_with('#') {
                None
            } else {
                Some(line.chars().next().unwrap_or(' '))
            }
        });
        Self::new(keys)
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }

    pub fn opened(&self) -> &[String] {
        &self.opened
    }

    pub fn closed(&self) -> &[String] {
        &self.closed
    }

    pub fn frames_shown(&self) -> usize {
        self.frames_shown
    }

    pub fn announcements(&self) -> &[String] {
        &self.announcements
    }
}

impl Presenter for ScriptedPresenter {
    fn open_surface(&mut self, name: &str) -> Result<()> {
        self.opened.push(name.to_string());
        Ok(())
    }

    fn close_surface(&mut self, name: &str) -> Result<()> {
        self.closed.push(name.to_string());
        Ok(())
    }

    fn show(&mut self, _name: &str, _frame: &RgbImage) -> Result<()> {
        self.frames_shown += 1;
        Ok(())
    }

    fn poll_key(&mut self, _wait: Duration) -> Result<Option<char>> {
        self.keys
            .pop_front()
            .map(Some)
            .ok_or_else(|| SegmenterError::Presenter("key script exhausted".to_string()))
    }

    fn announce(&mut self, message: &str) {
        self.announcements.push(message.to_string());
    }
}
