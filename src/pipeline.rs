use std::path::PathBuf;

use anyhow::Context;
use image::{GrayImage, ImageReader, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SegmenterConfig;
use crate::core::progress::ProgressStore;
use crate::error::Result;
use crate::export::ExportSummary;
use crate::models::{Segment, SegmentCollections};
use crate::steps::{
    PartialMergingStep, SegmentDetectionStep, SegmentExportingStep, SegmentTaggingStep,
    ThresholdingStep,
};
use crate::ui::Presenter;

/// Position of a session in the five-step procedure, with the cursor of the
/// step in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Stage {
    Thresholding,
    SegmentDetection,
    SegmentTagging {
        cursor: usize,
    },
    SegmentMerging {
        /// Set left open when the session stopped
        working_set: Option<Vec<Segment>>,
        pointer: usize,
    },
    SegmentExporting,
    Complete,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Thresholding => "thresholding",
            Stage::SegmentDetection => "segment_detection",
            Stage::SegmentTagging { .. } => "segment_tagging",
            Stage::SegmentMerging { .. } => "segment_merging",
            Stage::SegmentExporting => "segment_exporting",
            Stage::Complete => "complete",
        }
    }
}

/// Everything needed to resume a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub config: SegmenterConfig,
    pub stage: Stage,
    pub collections: SegmentCollections,
}

impl Session {
    pub fn new(config: SegmenterConfig) -> Self {
        Self {
            config,
            stage: Stage::Thresholding,
            collections: SegmentCollections::default(),
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
pub struct PipelineContext<'a> {
    pub image: &'a RgbImage,
    pub presenter: &'a mut dyn Presenter,
    pub progress: Option<&'a ProgressStore>,
    pub debug: Option<&'a DebugConfig>,
    /// Ink mask of the current run; rebuilt from the image when resuming
    pub mask: Option<GrayImage>,
    pub export: Option<ExportSummary>,
}

impl PipelineContext<'_> {
    /// Write a progress snapshot if the session has a progress file.
    pub fn checkpoint(progress: Option<&ProgressStore>, session: &Session) -> Result<()> {
        match progress {
            Some(store) => store.save(session),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step finished and moved the session to the next stage
    Advanced,
    /// The operator asked to stop
    Interrupted,
}

/// One step of the procedure
pub trait PipelineStep {
    /// Process the session and move it to the next stage
    fn run(&self, session: &mut Session, context: &mut PipelineContext<'_>) -> Result<StepOutcome>;

    /// Human-readable name for this step
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(ExportSummary),
    Interrupted { stage: Stage },
}

/// Drives a session from its current stage to the end
pub struct Pipeline {
    session: Session,
    image: RgbImage,
    progress: Option<ProgressStore>,
    debug: Option<DebugConfig>,
}

impl Pipeline {
    /// Start a fresh session on the configured image.
    pub fn open(config: SegmenterConfig) -> anyhow::Result<Self> {
        Self::from_session(Session::new(config))
    }

    /// Continue a saved session. The image is loaded from the path stored in
    /// the session configuration.
    pub fn from_session(session: Session) -> anyhow::Result<Self> {
        let path = &session.config.image_path;
        let image = ImageReader::open(path)
            .with_context(|| format!("Failed to open image {:?}", path))?
            .decode()
            .with_context(|| format!("Failed to decode image {:?}", path))?
            .to_rgb8();
        info!(path = %path.display(), width = image.width(), height = image.height(), "Image loaded");
        Ok(Self::with_image(session, image))
    }

    pub fn with_image(session: Session, image: RgbImage) -> Self {
        Self {
            session,
            image,
            progress: None,
            debug: None,
        }
    }

    /// Save progress to `path` at every stage boundary and on request.
    pub fn with_progress_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.progress = Some(ProgressStore::new(path));
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> anyhow::Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    /// Run every remaining step.
    pub fn run(&mut self, presenter: &mut dyn Presenter) -> Result<RunOutcome> {
        let mut context = PipelineContext {
            image: &self.image,
            presenter,
            progress: self.progress.as_ref(),
            debug: self.debug.as_ref(),
            mask: None,
            export: None,
        };

        loop {
            let step: &dyn PipelineStep = match self.session.stage {
                Stage::Thresholding => &ThresholdingStep,
                Stage::SegmentDetection => &SegmentDetectionStep,
                Stage::SegmentTagging { .. } => &SegmentTaggingStep,
                Stage::SegmentMerging { .. } => &PartialMergingStep,
                Stage::SegmentExporting => &SegmentExportingStep,
                Stage::Complete => {
                    info!("Session complete");
                    return Ok(RunOutcome::Completed(context.export.take().unwrap_or_default()));
                }
            };

            info!(step = step.name(), "Running step");
            let outcome = step.run(&mut self.session, &mut context)?;
            PipelineContext::checkpoint(context.progress, &self.session)?;

            if outcome == StepOutcome::Interrupted {
                info!(stage = self.session.stage.name(), "Session interrupted");
                return Ok(RunOutcome::Interrupted {
                    stage: self.session.stage.clone(),
                });
            }
        }
    }
}
