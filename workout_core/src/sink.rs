//! Record input and session persistence.
//!
//! Migrated sessions are appended to a JSONL file under an exclusive lock.
//! Source files are read as either a JSON array or JSON Lines, and can be
//! rewritten atomically when originals are not preserved.

use crate::{Error, Result, UnifiedWorkoutSession};
use fs2::FileExt;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Session sink trait for persisting migrated sessions
pub trait SessionSink {
    fn append(&mut self, session: &UnifiedWorkoutSession) -> Result<()>;
}

/// JSONL-based session sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append many sessions under a single lock
    pub fn append_all<'a, I>(&mut self, sessions: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a UnifiedWorkoutSession>,
    {
        self.ensure_parent_dir()?;
        let file = self.open_locked()?;

        let mut writer = std::io::BufWriter::new(&file);
        let mut written = 0;
        for session in sessions {
            serde_json::to_writer(&mut writer, session)?;
            writer.write_all(b"\n")?;
            written += 1;
        }
        writer.flush()?;
        drop(writer);
        file.sync_all()?;
        file.unlock()?;

        tracing::debug!("Appended {} sessions to {:?}", written, self.path);
        Ok(written)
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn open_locked(&self) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;
        Ok(file)
    }
}

impl SessionSink for JsonlSink {
    fn append(&mut self, session: &UnifiedWorkoutSession) -> Result<()> {
        self.ensure_parent_dir()?;
        let file = self.open_locked()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(session)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);
        file.unlock()?;

        tracing::debug!("Appended session {} to {:?}", session.id, self.path);
        Ok(())
    }
}

/// Read all sessions from a JSONL file, skipping unparseable lines
pub fn read_sessions(path: &Path) -> Result<Vec<UnifiedWorkoutSession>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut sessions = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<UnifiedWorkoutSession>(&line) {
            Ok(session) => sessions.push(session),
            Err(e) => {
                tracing::warn!("Failed to parse session at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} sessions from {:?}", sessions.len(), path);
    Ok(sessions)
}

/// Parse workout records from text.
///
/// A top-level JSON array yields its elements; a single object yields one
/// record; anything else is treated as JSON Lines.
pub fn parse_records(contents: &str) -> Result<Vec<Value>> {
    let trimmed = contents.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<Value>(contents) {
            return Ok(match value {
                Value::Array(items) => items,
                other => vec![other],
            });
        }
    }

    let mut records = Vec::new();
    for (line_num, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|e| {
            Error::Other(format!("Invalid JSON on line {}: {}", line_num + 1, e))
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Read workout records from a JSON array or JSONL file
pub fn read_records(path: &Path) -> Result<Vec<Value>> {
    let contents = std::fs::read_to_string(path)?;
    let records = parse_records(&contents)?;
    tracing::debug!("Read {} records from {:?}", records.len(), path);
    Ok(records)
}

/// Replace `path` with `records` as a pretty JSON array, atomically.
///
/// The new contents are written to a sibling temp file, synced, then
/// renamed over the target so readers never observe a partial file.
pub fn write_records_atomic(path: &Path, records: &[Value]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;
    serde_json::to_writer_pretty(&mut temp, records)?;
    temp.write_all(b"\n")?;
    temp.flush()?;
    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    tracing::debug!("Rewrote {:?} with {} records", path, records.len());
    Ok(())
}
