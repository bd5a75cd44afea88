// File: src/store.rs
use crate::core::types::{LogRecord, RecordDraft};
use crate::error::LogError;
use crate::persistence::{load_records, probe_writable, save_records, RecordTable};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// Append-only log of committed records. Ordinals come from the number of
/// rows already stored, so they stay gapless across restarts.
pub struct RecordStore {
    table: RecordTable,
    path: Option<PathBuf>,
}

impl RecordStore {
    pub fn in_memory() -> Self {
        Self { table: RecordTable::new(), path: None }
    }

    /// Opens the log at `path`, creating it with just the header row if it
    /// does not exist yet. An existing header is kept as it is.
    pub fn open(path: &Path) -> Result<Self, LogError> {
        let unavailable =
            |source: std::io::Error| LogError::StoreUnavailable { path: path.to_path_buf(), source };
        let table = match load_records(path) {
            Ok(table) => table,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let table = RecordTable::new();
                save_records(&table, path).map_err(unavailable)?;
                info!(path = %path.display(), "created record store");
                table
            }
            Err(e) => return Err(unavailable(e)),
        };
        Ok(Self { table, path: Some(path.to_path_buf()) })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn header(&self) -> &[String] {
        &self.table.header
    }

    pub fn len(&self) -> usize {
        self.table.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.rows.is_empty()
    }

    /// Ordinal the next appended record will get.
    pub fn next_ordinal(&self) -> u64 {
        self.table.rows.len() as u64 + 1
    }

    /// All records in commit order, header excluded.
    pub fn read_all(&self) -> &[LogRecord] {
        &self.table.rows
    }

    /// The last `n` records, oldest first.
    pub fn recent(&self, n: usize) -> &[LogRecord] {
        let rows = &self.table.rows;
        &rows[rows.len().saturating_sub(n)..]
    }

    /// Fails with `StoreUnavailable` if the backing file could not be written right now.
    pub fn check_available(&self) -> Result<(), LogError> {
        match &self.path {
            Some(path) => probe_writable(path)
                .map_err(|source| LogError::StoreUnavailable { path: path.clone(), source }),
            None => Ok(()),
        }
    }

    /// Stamps `draft` with the next ordinal and `time`, then persists the
    /// whole table and returns the stored record. Nothing is appended if the
    /// write fails.
    pub fn append(&mut self, draft: RecordDraft, time: String) -> Result<LogRecord, LogError> {
        let record = LogRecord::from_draft(draft, self.next_ordinal(), time);
        self.table.rows.push(record.clone());
        if let Some(path) = &self.path {
            if let Err(source) = save_records(&self.table, path) {
                self.table.rows.pop();
                return Err(LogError::StoreUnavailable { path: path.clone(), source });
            }
        }
        Ok(record)
    }

    /// Header followed by every record, as text cells.
    pub fn rows_with_header(&self) -> Vec<Vec<String>> {
        std::iter::once(self.table.header.clone())
            .chain(self.table.rows.iter().map(|r| r.cells().to_vec()))
            .collect()
    }
}
