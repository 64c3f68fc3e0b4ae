mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from glyphseg for tests
pub use glyphseg::{
    ExportSummary, Pipeline, RunOutcome, ScriptedPresenter, SegmenterConfig, SegmenterError,
    Stage, Tag,
};
