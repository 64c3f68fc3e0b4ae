//! Presentation backend: display surfaces, preview frames and operator keys.

pub mod preview;
pub mod scripted;
pub mod terminal;

use std::time::Duration;

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::merging::MergeCommand;
use crate::tagging::TagCommand;

pub use scripted::ScriptedPresenter;
pub use terminal::TerminalPresenter;

/// Where preview frames are shown and operator keys come from
pub trait Presenter {
    fn open_surface(&mut self, name: &str) -> Result<()>;

    fn close_surface(&mut self, name: &str) -> Result<()>;

    fn show(&mut self, name: &str, frame: &RgbImage) -> Result<()>;

    /// Wait at most `wait` for a key press. `None` means no key arrived.
    fn poll_key(&mut self, wait: Duration) -> Result<Option<char>>;

    /// Operator instructions
    fn announce(&mut self, message: &str) {
        info!("{}", message);
    }
}

/// Session controls accepted in every interactive step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Write a progress snapshot and keep going
    Save,
    /// Write a progress snapshot and stop the pipeline
    Quit,
}

/// A decoded key press: either a step command or a session control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<C> {
    Command(C),
    Control(Control),
}

pub fn tag_command(key: char) -> Option<TagCommand> {
    match key.to_ascii_lowercase() {
        'n' => Some(TagCommand::Noise),
        'p' => Some(TagCommand::Partial),
        'm' => Some(TagCommand::Merged),
        'c' => Some(TagCommand::Correct),
        'z' => Some(TagCommand::Undo),
        _ => None,
    }
}

pub fn merge_command(key: char) -> Option<MergeCommand> {
    match key.to_ascii_lowercase() {
        'a' => Some(MergeCommand::Accept),
        'r' => Some(MergeCommand::Reject),
        'c' => Some(MergeCommand::Complete),
        _ => None,
    }
}

pub fn control(key: char) -> Option<Control> {
    match key.to_ascii_lowercase() {
        's' => Some(Control::Save),
        'q' => Some(Control::Quit),
        _ => None,
    }
}

pub fn is_confirm(key: char) -> bool {
    key == ' ' || key == '\n'
}

/// Decode `key` with a step-specific command table, falling back to the
/// session controls.
pub fn decode<C>(key: char, commands: impl Fn(char) -> Option<C>) -> Option<Input<C>> {
    commands(key)
        .map(Input::Command)
        .or_else(|| control(key).map(Input::Control))
}

/// A display surface that stays open for as long as the guard lives
pub struct Surface<'p> {
    presenter: &'p mut dyn Presenter,
    name: String,
}

impl<'p> Surface<'p> {
    pub fn open(presenter: &'p mut dyn Presenter, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        presenter.open_surface(&name)?;
        debug!(surface = %name, "Opened surface");
        Ok(Self { presenter, name })
    }

    pub fn announce(&mut self, message: &str) {
        self.presenter.announce(message);
    }

    /// Alternate between `frames` every `interval` until a key decodes to a
    /// value. Keys that do not decode are ignored.
    pub fn wait_for<T>(
        &mut self,
        frames: [&RgbImage; 2],
        interval: Duration,
        mut decode: impl FnMut(char) -> Option<T>,
    ) -> Result<T> {
        let mut current = 0;
        loop {
            self.presenter.show(&self.name, frames[current])?;
            current = 1 - current;
            if let Some(key) = self.presenter.poll_key(interval)? {
                match decode(key) {
                    Some(value) => return Ok(value),
                    None => debug!(?key, "Ignoring key"),
                }
            }
        }
    }
}

impl Drop for Surface<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.presenter.close_surface(&self.name) {
            warn!(surface = %self.name, error = %e, "Failed to close surface");
        }
    }
}
