use std::time::Duration;

use image::{GrayImage, RgbImage, imageops};
use tracing::{debug, info};

use crate::config::SegmenterConfig;
use crate::core::ProgressStore;
use crate::detection::{SegmentExtractor, preprocessing};
use crate::error::Result;
use crate::export::Exporter;
use crate::merging::{
    MergeCommand, MergeOperator, MergeRun, MergeStep, PartialMerger, merge_partials,
};
use crate::models::{Segment, SegmentCollections};
use crate::pipeline::{PipelineContext, PipelineStep, Session, Stage, StepOutcome};
use crate::tagging::{SegmentTagger, reconcile};
use crate::ui::preview::{self, PROPOSED, Palette, SELECTED};
use crate::ui::{Control, Input, Surface, decode, is_confirm, merge_command, tag_command};

const THRESHOLDING_SURFACE: &str = "Step 1. Thresholding";
const DETECTION_SURFACE: &str = "Step 2. Segment detection";
const TAGGING_SURFACE: &str = "Step 3. Segment tagging";
const MERGING_SURFACE: &str = "Step 4. Partial segment merging";

const SESSION_KEYS: &str = "   [S] Save progress\n   [Q] Save progress and quit";

const TAGGING_HELP: &str = "\
>> Tagging segments, use the following keys:
   [N] Noise segment (will be discarded)
   [P] Partial segment (will be combinable with other partial segments)
   [M] Merged segment (will be stored separately so it can be split)
   [C] Correct segment (will be stored as is)

   [Z] Undo (move back in the tagging sequence)";

const MERGING_HELP: &str = "\
>> Merging partial segments. Partial segments in [BLUE] are looking for
   partial segments to merge with. The partial segment in [GREEN] proposes
   to merge. Use the following keys:
   [A] Accept segment (green will be merged with blue)
   [R] Reject segment (green will not be merged with blue)
   [C] Complete merging (blue is complete and will be saved)";

fn confirm_key(key: char) -> Option<()> {
    is_confirm(key).then_some(())
}

fn threshold_image(image: &RgbImage, cutoff: u8) -> GrayImage {
    preprocessing::ink_mask(&imageops::grayscale(image), cutoff)
}

/// Show a single frame until the operator confirms. Returns `false` if the
/// operator quit instead.
fn confirm(
    surface: &mut Surface<'_>,
    frame: &RgbImage,
    progress: Option<&ProgressStore>,
    session: &Session,
    interval: Duration,
) -> Result<bool> {
    surface.announce(">> Press [SPACE] to continue");
    loop {
        match surface.wait_for([frame, frame], interval, |k| decode(k, confirm_key))? {
            Input::Command(()) => return Ok(true),
            Input::Control(Control::Save) => PipelineContext::checkpoint(progress, session)?,
            Input::Control(Control::Quit) => return Ok(false),
        }
    }
}

/// Separate background and foreground
pub struct ThresholdingStep;

impl PipelineStep for ThresholdingStep {
    fn run(&self, session: &mut Session, context: &mut PipelineContext<'_>) -> Result<StepOutcome> {
        let config = &session.config;
        let mask = threshold_image(context.image, config.threshold);
        info!(threshold = config.threshold, "Thresholded image");

        if let Some(debug) = context.debug {
            let path = debug.output_dir.join("01_threshold_mask.png");
            mask.save(&path)?;
            debug!(path = %path.display(), "Saved debug output");
        }

        let frame = preview::mask_frame(&mask);
        context.mask = Some(mask);

        let mut surface = Surface::open(&mut *context.presenter, THRESHOLDING_SURFACE)?;
        surface.announce("Step 1. Thresholding\n================\n>> Separating background and foreground segments.");
        if !confirm(&mut surface, &frame, context.progress, session, session.config.poll_interval())? {
            return Ok(StepOutcome::Interrupted);
        }
        drop(surface);

        session.stage = Stage::SegmentDetection;
        Ok(StepOutcome::Advanced)
    }

    fn name(&self) -> &str {
        "Thresholding"
    }
}

/// Detect candidate segments in the ink mask
pub struct SegmentDetectionStep;

impl PipelineStep for SegmentDetectionStep {
    fn run(&self, session: &mut Session, context: &mut PipelineContext<'_>) -> Result<StepOutcome> {
        let config = session.config.clone();
        let mask = match context.mask.take() {
            Some(mask) => mask,
            None => threshold_image(context.image, config.threshold),
        };

        let segments = SegmentExtractor::new(config.min_area).extract(&mask);
        info!(count = segments.len(), min_area = config.min_area, "Detected segments");

        let mut palette = Palette::new(config.preview_seed);
        let frame = preview::segmentation_frame(context.image, &segments, config.outline_thickness, &mut palette);
        if let Some(debug) = context.debug {
            let path = debug.output_dir.join("02_segmentation.png");
            frame.save(&path)?;
            debug!(path = %path.display(), "Saved debug output");
        }
        session.collections = SegmentCollections::with_candidates(segments);

        let mut surface = Surface::open(&mut *context.presenter, DETECTION_SURFACE)?;
        surface.announce(&format!(
            "Step 2. Segment detection\n================\n>> Detected {} segments.",
            session.collections.todo.len()
        ));
        if !confirm(&mut surface, &frame, context.progress, session, config.poll_interval())? {
            return Ok(StepOutcome::Interrupted);
        }
        drop(surface);

        session.stage = Stage::SegmentTagging { cursor: 0 };
        Ok(StepOutcome::Advanced)
    }

    fn name(&self) -> &str {
        "Segment Detection"
    }
}

/// Operator tags every candidate
pub struct SegmentTaggingStep;

impl PipelineStep for SegmentTaggingStep {
    fn run(&self, session: &mut Session, context: &mut PipelineContext<'_>) -> Result<StepOutcome> {
        let cursor = match session.stage {
            Stage::SegmentTagging { cursor } => cursor,
            _ => 0,
        };
        let config = &session.config;
        let SegmentCollections {
            todo,
            correct,
            merged,
            partial_sets,
        } = &mut session.collections;
        let (image, progress) = (context.image, context.progress);
        let mut tagger = SegmentTagger::resume(cursor, todo);

        let mut surface = Surface::open(&mut *context.presenter, TAGGING_SURFACE)?;
        surface.announce(&format!(
            "Step 3. Segment tagging\n================\n{}\n{}\n================",
            TAGGING_HELP, SESSION_KEYS
        ));

        let finished = tagger.run(todo, |segments, index| {
            let (plain, highlighted) =
                preview::segment_frames(image, &[(&segments[index], SELECTED)], config.surroundings_size);
            surface.announce(&format!(">> Tagging segment [{}/{}]", index + 1, segments.len()));

            loop {
                let input = surface.wait_for([&plain, &highlighted], config.poll_interval(), |k| {
                    decode(k, tag_command)
                })?;
                match input {
                    Input::Command(command) => return Ok(Some(command)),
                    Input::Control(Control::Save) => {
                        let snapshot = Session {
                            config: config.clone(),
                            stage: Stage::SegmentTagging { cursor: index },
                            collections: SegmentCollections {
                                todo: segments.to_vec(),
                                correct: correct.clone(),
                                merged: merged.clone(),
                                partial_sets: partial_sets.clone(),
                            },
                        };
                        PipelineContext::checkpoint(progress, &snapshot)?;
                    }
                    Input::Control(Control::Quit) => return Ok(None),
                }
            }
        })?;
        drop(surface);

        if !finished {
            session.stage = Stage::SegmentTagging {
                cursor: tagger.cursor(),
            };
            return Ok(StepOutcome::Interrupted);
        }

        reconcile(&mut session.collections)?;
        info!(
            correct = session.collections.correct.len(),
            merged = session.collections.merged.len(),
            partial = session.collections.todo.len(),
            "Tagging complete"
        );
        session.stage = Stage::SegmentMerging {
            working_set: None,
            pointer: 0,
        };
        Ok(StepOutcome::Advanced)
    }

    fn name(&self) -> &str {
        "Segment Tagging"
    }
}

fn open_set_stage(merger: &PartialMerger) -> Stage {
    Stage::SegmentMerging {
        working_set: Some(merger.working_set().to_vec()),
        pointer: merger.pointer(),
    }
}

/// Proposes candidates on the merging surface
struct MergeReview<'a> {
    surface: Surface<'a>,
    image: &'a RgbImage,
    config: &'a SegmenterConfig,
    progress: Option<&'a ProgressStore>,
}

impl MergeOperator for MergeReview<'_> {
    fn decide(
        &mut self,
        collections: &SegmentCollections,
        merger: &PartialMerger,
        candidate: &Segment,
    ) -> Result<Option<MergeCommand>> {
        let mut highlights: Vec<_> = merger.working_set().iter().map(|s| (s, SELECTED)).collect();
        highlights.push((candidate, PROPOSED));
        let (plain, highlighted) =
            preview::segment_frames(self.image, &highlights, self.config.surroundings_size);
        self.surface.announce(&format!(
            "   Proposing partial segment [{}/{}]",
            merger.pointer() + 1,
            collections.todo.len()
        ));

        loop {
            let input = self.surface.wait_for(
                [&plain, &highlighted],
                self.config.poll_interval(),
                |k| decode(k, merge_command),
            )?;
            match input {
                Input::Command(command) => return Ok(Some(command)),
                Input::Control(Control::Save) => {
                    let snapshot = Session {
                        config: self.config.clone(),
                        stage: open_set_stage(merger),
                        collections: collections.clone(),
                    };
                    PipelineContext::checkpoint(self.progress, &snapshot)?;
                }
                Input::Control(Control::Quit) => return Ok(None),
            }
        }
    }

    fn closed(&mut self, _set: &[Segment], step: MergeStep) {
        match step {
            MergeStep::Exhausted => self
                .surface
                .announce("   PARTIAL SET COMPLETED (no partial segments left)"),
            MergeStep::Completed | MergeStep::Proposing => {
                self.surface.announce("   PARTIAL SET COMPLETED")
            }
        }
    }
}

/// Operator groups Partial fragments into sets
pub struct PartialMergingStep;

impl PipelineStep for PartialMergingStep {
    fn run(&self, session: &mut Session, context: &mut PipelineContext<'_>) -> Result<StepOutcome> {
        let open = match &mut session.stage {
            Stage::SegmentMerging {
                working_set,
                pointer,
            } => working_set
                .take()
                .map(|set| PartialMerger::resume(set, *pointer, &session.collections.todo)),
            _ => None,
        };

        let mut review = MergeReview {
            surface: Surface::open(&mut *context.presenter, MERGING_SURFACE)?,
            image: context.image,
            config: &session.config,
            progress: context.progress,
        };
        review.surface.announce(&format!(
            "Step 4. Partial segment merging\n================\n{}\n{}\n================",
            MERGING_HELP, SESSION_KEYS
        ));

        let run = merge_partials(&mut session.collections, open, &mut review)?;
        drop(review);

        if let MergeRun::Stopped(merger) = run {
            session.stage = open_set_stage(&merger);
            return Ok(StepOutcome::Interrupted);
        }

        info!(sets = session.collections.partial_sets.len(), "Merging complete");
        session.stage = Stage::SegmentExporting;
        Ok(StepOutcome::Advanced)
    }

    fn name(&self) -> &str {
        "Partial Segment Merging"
    }
}

/// Write crops of every final segment and set
pub struct SegmentExportingStep;

impl PipelineStep for SegmentExportingStep {
    fn run(&self, session: &mut Session, context: &mut PipelineContext<'_>) -> Result<StepOutcome> {
        let config = &session.config;
        context.presenter.announce(&format!(
            "Step 5. Segment exporting\n================\n>> Isolating segments and exporting to {}",
            config.output_dir.display()
        ));

        let exporter = Exporter::new(context.image, &config.output_dir, config.crop_margin);
        let summary = exporter.export(&session.collections)?;
        context.presenter.announce(&format!(
            "   Exported {} correct, {} merged and {} partial set files",
            summary.correct.len(),
            summary.merged.len(),
            summary.partial_sets.len()
        ));
        context.export = Some(summary);

        session.stage = Stage::Complete;
        Ok(StepOutcome::Advanced)
    }

    fn name(&self) -> &str {
        "Segment Exporting"
    }
}
