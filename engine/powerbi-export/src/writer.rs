//! CSV writer for exported tables

use crate::error::{ExportError, Result};
use crate::tables::{CalendarRow, FactRow, PlayerRow, StarSchema, Table};
use csv::WriterBuilder;
use std::path::{Path, PathBuf};
use tracing::info;

/// A table file produced by an export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenTable {
    pub name: &'static str,
    pub path: PathBuf,
    pub rows: usize,
}

/// Create the output directory if absent
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::OutputDir { path: dir.to_path_buf(), source })
}

/// Write `rows` to `dir/<NAME>.csv`, replacing any existing file
pub fn write_table<T: Table>(dir: &Path, rows: &[T]) -> Result<WrittenTable> {
    let path = dir.join(format!("{}.csv", T::NAME));
    write_rows(&path, rows)?;

    info!("Wrote {} rows to {:?}", rows.len(), path);
    Ok(WrittenTable { name: T::NAME, path, rows: rows.len() })
}

/// Write a header row followed by `rows` to `path`
///
/// The header is written explicitly so an empty table still gets one.
pub fn write_rows<T: Table>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer =
        WriterBuilder::new().has_headers(false).from_path(path).map_err(|e| ExportError::write(path, e))?;

    writer.write_record(T::HEADER).map_err(|e| ExportError::write(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| ExportError::write(path, e))?;
    }
    writer.flush().map_err(|e| ExportError::write(path, e))?;

    Ok(())
}

/// Write all three star schema tables into `dir`
pub fn write_schema(dir: &Path, schema: &StarSchema) -> Result<Vec<WrittenTable>> {
    ensure_dir(dir)?;

    Ok(vec![
        write_table::<CalendarRow>(dir, &schema.calendar)?,
        write_table::<PlayerRow>(dir, &schema.players)?,
        write_table::<FactRow>(dir, &schema.facts)?,
    ])
}
