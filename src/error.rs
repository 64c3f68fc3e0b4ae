use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegmenterError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed progress file: {0}")]
    ProgressFormat(#[from] serde_json::Error),

    #[error("Unsupported progress file version {found} (expected {expected})")]
    UnsupportedProgressVersion { found: u64, expected: u32 },

    #[error("Segment {index} is still untagged after the tagging step")]
    UntaggedSegment { index: usize },

    #[error("{} export(s) failed: {}", .failures.len(), ExportFailures(.failures))]
    Export { failures: Vec<ExportFailure> },

    #[error("Presenter error: {0}")]
    Presenter(String),
}

pub type Result<T> = std::result::Result<T, SegmenterError>;

/// A single file the exporter could not write
#[derive(Debug)]
pub struct ExportFailure {
    pub path: PathBuf,
    pub reason: String,
}

struct ExportFailures<'a>(&'a [ExportFailure]);

impl fmt::Display for ExportFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", failure.path.display(), failure.reason)?;
        }
        Ok(())
    }
}
