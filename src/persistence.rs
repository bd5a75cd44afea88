// File: src/persistence.rs
use crate::core::types::{LogRecord, RECORD_HEADER};
use crate::learning::Vocabulary;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Error, ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// On-disk shape of the record store: the header row followed by every record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecordTable {
    pub header: Vec<String>,
    pub rows: Vec<LogRecord>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self {
            header: RECORD_HEADER.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

impl Default for RecordTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes `path` through a temp file in the same directory, so readers see
/// either the old or the new contents and never a torn file.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<(), Error>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Error>,
{
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        write(&mut writer)?;
        writer.flush()?;
    }
    temp_file.as_file().sync_all()?;
    temp_file.persist(path)?;
    Ok(())
}

pub fn save_vocabulary(vocabulary: &Vocabulary, path: &Path) -> Result<(), Error> {
    write_atomically(path, |writer| {
        serde_json::to_writer_pretty(&mut *writer, vocabulary)?;
        writer.write_all(b"\n")
    })
}

/// Reads the vocabulary file. A missing file surfaces as `ErrorKind::NotFound`,
/// malformed JSON as `ErrorKind::InvalidData`.
pub fn load_vocabulary(path: &Path) -> Result<Vocabulary, Error> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let vocabulary = serde_json::from_reader(reader)?;
    Ok(vocabulary)
}

pub fn save_records(table: &RecordTable, path: &Path) -> Result<(), Error> {
    write_atomically(path, |writer| {
        bincode::serialize_into(writer, table).map_err(|e| Error::new(ErrorKind::Other, e))
    })
}

pub fn load_records(path: &Path) -> Result<RecordTable, Error> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    bincode::deserialize_from(reader).map_err(|e| Error::new(ErrorKind::InvalidData, e))
}

/// Confirms `path` can be opened for writing without touching its contents.
pub fn probe_writable(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::OpenOptions::new().write(true).open(path)?;
        return Ok(());
    }
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;
    NamedTempFile::new_in(parent_dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_record(ordinal: u64) -> LogRecord {
        LogRecord {
            ordinal,
            time: "20:15".into(),
            callsign: "BG7ABC".into(),
            qth: "广州".into(),
            rst: "59".into(),
            rig: "UV-K5".into(),
            power: "5W".into(),
            antenna: "原装天线".into(),
            message: "73".into(),
        }
    }

    #[test]
    fn record_table_survives_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("log.bin");
        let mut table = RecordTable::new();
        table.rows.push(sample_record(1));
        table.rows.push(sample_record(2));

        save_records(&table, &path).unwrap();
        assert_eq!(load_records(&path).unwrap(), table);
    }

    #[test]
    fn vocabulary_file_is_readable_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log_config.json");
        save_vocabulary(&Vocabulary::builtin(), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"QTH\""));
        assert!(text.contains("广州"), "non-ASCII must be written verbatim");
        assert_eq!(load_vocabulary(&path).unwrap(), Vocabulary::builtin());
    }

    #[test]
    fn malformed_vocabulary_is_invalid_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log_config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_vocabulary(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn probe_fails_when_parent_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        assert!(probe_writable(&blocker.join("log.bin")).is_err());
        assert!(probe_writable(&dir.path().join("fresh.bin")).is_ok());
    }
}
