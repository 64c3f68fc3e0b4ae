//! Grouping of Partial fragments into partial sets.
//!
//! The first remaining fragment seeds a working set. The other fragments are
//! then proposed one at a time, cycling through the remaining list, until the
//! operator completes the set or nothing is left to propose.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::{Segment, SegmentCollections};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeCommand {
    /// Move the proposed fragment into the working set
    Accept,
    /// Skip to the next fragment
    Reject,
    /// Close the working set as it is
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStep {
    /// Another candidate is waiting for a decision
    Proposing,
    /// The operator closed the set
    Completed,
    /// No candidates are left
    Exhausted,
}

impl MergeStep {
    pub fn is_closed(self) -> bool {
        !matches!(self, MergeStep::Proposing)
    }
}

/// One open partial set and the cyclic pointer into the remaining fragments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialMerger {
    working_set: Vec<Segment>,
    pointer: usize,
}

impl PartialMerger {
    /// Pop the first fragment of `todo` as the seed of a new set.
    pub fn seed(todo: &mut Vec<Segment>) -> Option<Self> {
        if todo.is_empty() {
            return None;
        }
        let seed = todo.remove(0);
        Some(Self {
            working_set: vec![seed],
            pointer: 0,
        })
    }

    /// Restore an open set from saved progress.
    pub fn resume(working_set: Vec<Segment>, pointer: usize, todo: &[Segment]) -> Self {
        let pointer = if pointer < todo.len() { pointer } else { 0 };
        Self {
            working_set,
            pointer,
        }
    }

    pub fn working_set(&self) -> &[Segment] {
        &self.working_set
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// The fragment currently proposed for merging.
    pub fn candidate<'a>(&self, todo: &'a [Segment]) -> Option<&'a Segment> {
        todo.get(self.pointer)
    }

    /// Whether the set closes without operator input.
    pub fn status(&self, todo: &[Segment]) -> MergeStep {
        if todo.is_empty() {
            MergeStep::Exhausted
        } else {
            MergeStep::Proposing
        }
    }

    pub fn apply(&mut self, todo: &mut Vec<Segment>, command: MergeCommand) -> MergeStep {
        match command {
            MergeCommand::Accept => {
                if self.pointer >= todo.len() {
                    return self.status(todo);
                }
                let accepted = todo.remove(self.pointer);
                self.working_set.push(accepted);
                if self.pointer >= todo.len() {
                    self.pointer = 0;
                }
                debug!(set_size = self.working_set.len(), remaining = todo.len(), "Accepted fragment");
            }
            MergeCommand::Reject => {
                self.pointer += 1;
                if self.pointer >= todo.len() {
                    self.pointer = 0;
                }
                debug!(pointer = self.pointer, "Rejected fragment");
            }
            MergeCommand::Complete => {
                debug!(set_size = self.working_set.len(), "Completed partial set");
                return MergeStep::Completed;
            }
        }
        self.status(todo)
    }

    pub fn into_set(self) -> Vec<Segment> {
        self.working_set
    }
}

/// Source of merge decisions for [`merge_partials`]
pub trait MergeOperator {
    /// Decide on `candidate` for the open set. `None` stops merging and
    /// leaves the set open.
    fn decide(
        &mut self,
        collections: &SegmentCollections,
        merger: &PartialMerger,
        candidate: &Segment,
    ) -> Result<Option<MergeCommand>>;

    /// A set was closed, either by the operator or because nothing is left.
    fn closed(&mut self, _set: &[Segment], _step: MergeStep) {}
}

/// How a call to [`merge_partials`] ended
#[derive(Debug, Clone, PartialEq)]
pub enum MergeRun {
    /// Every fragment is in a closed set
    Finished,
    /// The operator stopped with this set still open
    Stopped(PartialMerger),
}

/// Run the merging protocol over `collections.todo`, appending every closed
/// set to `collections.partial_sets`. An `open` set from a previous run is
/// continued before new seeds are drawn.
pub fn merge_partials<O>(
    collections: &mut SegmentCollections,
    mut open: Option<PartialMerger>,
    operator: &mut O,
) -> Result<MergeRun>
where
    O: MergeOperator + ?Sized,
{
    loop {
        let mut merger = match open.take() {
            Some(merger) => merger,
            None => match PartialMerger::seed(&mut collections.todo) {
                Some(merger) => merger,
                None => return Ok(MergeRun::Finished),
            },
        };

        let step = loop {
            let Some(candidate) = merger.candidate(&collections.todo) else {
                break MergeStep::Exhausted;
            };
            let Some(command) = operator.decide(collections, &merger, candidate)? else {
                return Ok(MergeRun::Stopped(merger));
            };
            let step = merger.apply(&mut collections.todo, command);
            if step.is_closed() {
                break step;
            }
        };

        operator.closed(merger.working_set(), step);
        debug!(size = merger.working_set().len(), "Closed partial set");
        collections.partial_sets.push(merger.into_set());
    }
}
