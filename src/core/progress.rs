//! Progress files.
//!
//! A progress file is a zstd-compressed JSON document holding the complete
//! session: configuration, the current step with its cursor, and every
//! segment collection. Files are written to a temporary sibling first and
//! then renamed over the target, so an interrupted save leaves the previous
//! snapshot intact.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;
use zstd::stream::{read::Decoder as ZstdDecoder, write::Encoder as ZstdEncoder};

use crate::config::SegmenterConfig;
use crate::error::{Result, SegmenterError};
use crate::models::SegmentCollections;
use crate::pipeline::{Session, Stage};

pub const PROGRESS_VERSION: u32 = 1;
const ZSTD_LEVEL: i32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressFile {
    pub version: u32,
    /// RFC 3339 timestamp of the save
    pub saved_at: String,
    pub config: SegmenterConfig,
    pub stage: Stage,
    pub collections: SegmentCollections,
}

impl ProgressFile {
    pub fn snapshot(session: &Session) -> Self {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self {
            version: PROGRESS_VERSION,
            saved_at: now.format(&Rfc3339).unwrap_or_default(),
            config: session.config.clone(),
            stage: session.stage.clone(),
            collections: session.collections.clone(),
        }
    }

    pub fn into_session(self) -> Session {
        Session {
            config: self.config,
            stage: self.stage,
            collections: self.collections,
        }
    }
}

/// Reads and writes the progress file of one session
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let out = File::create(&tmp)?;
        let mut encoder = ZstdEncoder::new(BufWriter::new(out), ZSTD_LEVEL)?;
        serde_json::to_writer(&mut encoder, &ProgressFile::snapshot(session))?;
        let writer = encoder.finish()?;
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        fs::rename(&tmp, &self.path)?;

        info!(path = %self.path.display(), stage = session.stage.name(), "Saved progress");
        Ok(())
    }

    pub fn load(&self) -> Result<ProgressFile> {
        let file = File::open(&self.path)?;
        let decoder = ZstdDecoder::new(BufReader::new(file))?;
        let document: serde_json::Value = serde_json::from_reader(decoder)?;

        let found = document
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        if found != u64::from(PROGRESS_VERSION) {
            return Err(SegmenterError::UnsupportedProgressVersion {
                found,
                expected: PROGRESS_VERSION,
            });
        }

        let progress: ProgressFile = serde_json::from_value(document)?;
        info!(
            path = %self.path.display(),
            saved_at = %progress.saved_at,
            stage = progress.stage.name(),
            "Loaded progress"
        );
        Ok(progress)
    }
}

/// Load a session from `path`, adding context for the command line.
pub fn load_session(path: &Path) -> anyhow::Result<Session> {
    let progress = ProgressStore::new(path)
        .load()
        .with_context(|| format!("Failed to load progress file {:?}", path))?;
    Ok(progress.into_session())
}
