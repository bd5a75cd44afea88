// File: src/export.rs
use crate::persistence::write_atomically;
use std::io::{Error, Write};
use std::path::{Path, PathBuf};

/// Plain-text copy of the record store, rewritten in full after every append.
pub struct CsvMirror {
    path: PathBuf,
}

impl CsvMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `rows` (header first) as comma-separated lines.
    pub fn write(&self, rows: &[Vec<String>]) -> Result<(), Error> {
        write_atomically(&self.path, |writer| {
            for row in rows {
                let line: Vec<String> = row.iter().map(|cell| escape(cell)).collect();
                writer.write_all(line.join(",").as_bytes())?;
                writer.write_all(b"\r\n")?;
            }
            Ok(())
        })
    }
}

/// Quotes a cell when it holds a delimiter, quote or line break.
fn escape(cell: &str) -> String {
    if cell.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
