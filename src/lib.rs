pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod export;
pub mod merging;
pub mod models;
pub mod pipeline;
pub mod steps;
pub mod tagging;
pub mod ui;

pub use config::SegmenterConfig;
pub use detection::SegmentExtractor;
pub use error::{ExportFailure, Result, SegmenterError};
pub use export::{ExportCategory, ExportSummary, Exporter};
pub use merging::{MergeCommand, MergeOperator, MergeRun, MergeStep, PartialMerger, merge_partials};
pub use models::{Point, Rect, Segment, SegmentCollections, Tag};
pub use pipeline::{
    DebugConfig, Pipeline, PipelineContext, PipelineStep, RunOutcome, Session, Stage, StepOutcome,
};
pub use tagging::{SegmentTagger, TagCommand, TagOutcome};
pub use ui::{Presenter, ScriptedPresenter, TerminalPresenter};
