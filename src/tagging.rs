//! Operator tagging of candidate segments.
//!
//! [`SegmentTagger`] walks the candidate list once. Every visit consumes one
//! [`TagCommand`]: a tag moves the cursor forward, an undo moves it back and
//! clears the tag of the segment it lands on, so segments at or after the
//! cursor are always [`Tag::Undefined`]. Once the walk is over,
//! [`reconcile`] splits the list into the terminal collections.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SegmenterError};
use crate::models::{Segment, SegmentCollections, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagCommand {
    Noise,
    Partial,
    Merged,
    Correct,
    Undo,
}

impl TagCommand {
    /// The tag assigned by this command, `None` for undo.
    pub fn tag(self) -> Option<Tag> {
        match self {
            TagCommand::Noise => Some(Tag::Noise),
            TagCommand::Partial => Some(Tag::Partial),
            TagCommand::Merged => Some(Tag::Merged),
            TagCommand::Correct => Some(Tag::Correct),
            TagCommand::Undo => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    Tagged { index: usize, tag: Tag },
    Undone { index: usize },
    /// Undo at the first segment
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentTagger {
    cursor: usize,
}

impl SegmentTagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a walk at `cursor`, clamped to the number of segments.
    pub fn resume(cursor: usize, segments: &[Segment]) -> Self {
        Self {
            cursor: cursor.min(segments.len()),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_done(&self, segments: &[Segment]) -> bool {
        self.cursor >= segments.len()
    }

    /// Apply one operator command to `segments`. Commands issued after the
    /// walk finished are ignored.
    pub fn apply(&mut self, segments: &mut [Segment], command: TagCommand) -> TagOutcome {
        match command.tag() {
            Some(tag) => {
                let Some(segment) = segments.get_mut(self.cursor) else {
                    return TagOutcome::Ignored;
                };
                segment.set_tag(tag);
                let index = self.cursor;
                self.cursor += 1;
                debug!(index, tag = tag.label(), "Tagged segment");
                TagOutcome::Tagged { index, tag }
            }
            None if self.cursor == 0 => TagOutcome::Ignored,
            None => {
                self.cursor -= 1;
                segments[self.cursor].set_tag(Tag::Undefined);
                debug!(index = self.cursor, "Undid tag");
                TagOutcome::Undone { index: self.cursor }
            }
        }
    }

    /// Feed commands until the walk is over. `next` sees the segments and the
    /// current cursor and returns the next command, or `None` to stop early.
    /// Returns whether the walk finished.
    pub fn run<F>(&mut self, segments: &mut [Segment], mut next: F) -> Result<bool>
    where
        F: FnMut(&[Segment], usize) -> Result<Option<TagCommand>>,
    {
        while !self.is_done(segments) {
            let Some(command) = next(segments, self.cursor)? else {
                debug!(cursor = self.cursor, "Tagging stopped");
                return Ok(false);
            };
            self.apply(segments, command);
        }
        Ok(true)
    }
}

/// Partition the tagged `todo` list in one order-preserving pass: Correct and
/// Merged segments move to their collections, Noise is dropped and Partial
/// stays in `todo`. Fails without touching anything if a segment is still
/// untagged.
pub fn reconcile(collections: &mut SegmentCollections) -> Result<()> {
    if let Some(index) = collections
        .todo
        .iter()
        .position(|s| !s.tag().is_terminal())
    {
        return Err(SegmenterError::UntaggedSegment { index });
    }

    let mut partial = Vec::new();
    let mut dropped = 0usize;
    for segment in collections.todo.drain(..) {
        match segment.tag() {
            Tag::Correct => collections.correct.push(segment),
            Tag::Merged => collections.merged.push(segment),
            Tag::Partial => partial.push(segment),
            Tag::Noise => dropped += 1,
            Tag::Undefined => unreachable!("untagged segments are rejected above"),
        }
    }
    collections.todo = partial;

    debug!(
        correct = collections.correct.len(),
        merged = collections.merged.len(),
        partial = collections.todo.len(),
        dropped,
        "Reconciled tagged segments"
    );
    Ok(())
}
