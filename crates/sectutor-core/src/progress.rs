//! JSON persistence for the study progress record.
//!
//! A missing or unreadable progress file is not an error: the store starts
//! over with an empty record. Saves replace the file atomically by writing a
//! sibling temp file and renaming it into place.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::model::{ProgressRecord, QuizScore};

/// Default location of the progress file, relative to the working directory.
pub const DEFAULT_PROGRESS_FILE: &str = "study_progress.json";

/// Owns the in-memory `ProgressRecord` and the path it is persisted to.
#[derive(Debug)]
pub struct ProgressStore {
    path: PathBuf,
    record: ProgressRecord,
}

impl ProgressStore {
    /// Load the record at `path`, substituting an empty one on any failure.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let record = match read_record(&path) {
            Ok(record) => record,
            Err(e) => {
                if path.exists() {
                    tracing::debug!("starting with empty progress: {e:#}");
                } else {
                    tracing::debug!("no progress file at {}", path.display());
                }
                ProgressRecord::default()
            }
        };
        Self { path, record }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    /// Write the full record to disk.
    pub fn save(&self) -> Result<()> {
        write_record(&self.path, &self.record)
    }

    /// Record an explained topic and persist if it was new.
    pub fn record_topic(&mut self, topic: &str, date: NaiveDateTime) -> Result<bool> {
        let added = self.record.record_topic(topic, date);
        if added {
            self.save()?;
        }
        Ok(added)
    }

    /// Record a finished quiz and persist.
    pub fn record_quiz(&mut self, score: u32, total: u32, date: NaiveDateTime) -> Result<QuizScore> {
        let entry = self.record.record_quiz(score, total, date).clone();
        self.save()?;
        Ok(entry)
    }
}

fn read_record(path: &Path) -> Result<ProgressRecord> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read progress from {}", path.display()))?;
    let record = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse progress JSON in {}", path.display()))?;
    Ok(record)
}

fn write_record(path: &Path, record: &ProgressRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record).context("failed to serialize progress")?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent)?;
            parent
        }
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    tmp.write_all(json.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("failed to write progress to {}", path.display()))?;
    Ok(())
}
