//! Migration reports: the full batch result as JSON, plus a flat CSV with
//! one row per processed record.

use crate::batch::BatchResult;
use crate::{Error, Result, WorkoutFormat};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A row in the CSV summary
#[derive(Debug, Serialize)]
struct CsvRow {
    index: usize,
    success: bool,
    source_format: WorkoutFormat,
    id: Option<String>,
    error_code: Option<String>,
    errors: String,
    warnings: usize,
    data_loss: bool,
}

fn csv_rows(result: &BatchResult) -> impl Iterator<Item = CsvRow> + '_ {
    result.results.iter().enumerate().map(|(index, r)| CsvRow {
        index,
        success: r.success,
        source_format: r.metadata.source_format,
        id: r.data.as_ref().map(|s| s.id.clone()),
        error_code: r.first_error_code().map(|code| code.as_str().to_string()),
        errors: r
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        warnings: r.warnings.len(),
        data_loss: r.metadata.data_loss,
    })
}

/// Write the whole batch result as pretty JSON
pub fn write_json_report(result: &BatchResult, path: &Path) -> Result<()> {
    write_json(result, path)?;
    tracing::info!("Wrote migration report to {:?}", path);
    Ok(())
}

/// Write any serializable result set as pretty JSON
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut file = File::create(path)?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.write_all(b"\n")?;
    file.sync_all()?;
    Ok(())
}

/// Write one CSV row per processed record, replacing any existing file
pub fn write_csv_summary(result: &BatchResult, path: &Path) -> Result<usize> {
    ensure_parent_dir(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let mut rows = 0;
    for row in csv_rows(result) {
        writer.serialize(row)?;
        rows += 1;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| Error::Other(format!("Failed to finish CSV summary: {}", e)))?;
    file.sync_all()?;

    tracing::info!("Wrote {} rows to {:?}", rows, path);
    Ok(rows)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
