// File: src/learning.rs
use crate::core::types::Field;
use crate::error::LogError;
use crate::persistence::{load_vocabulary, save_vocabulary};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Previously accepted values per field, first-seen first. Displayed index
/// numbers come from this order, so entries are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(rename = "QTH", default)]
    qth: Vec<String>,
    #[serde(rename = "Rig", default)]
    rig: Vec<String>,
    #[serde(rename = "Power", default)]
    power: Vec<String>,
    #[serde(rename = "Antenna", default)]
    antenna: Vec<String>,
}

impl Vocabulary {
    pub fn empty() -> Self {
        Self { qth: Vec::new(), rig: Vec::new(), power: Vec::new(), antenna: Vec::new() }
    }

    /// Suggestions shipped with the logger, used when no vocabulary file exists yet.
    pub fn builtin() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }
        Self {
            qth: owned(&["广州", "深圳", "龙岗", "南山", "福田", "宝安"]),
            rig: owned(&["UV-K5", "UV-K6", "森海克斯8800", "八重洲FT-65R"]),
            power: owned(&["5W", "10W", "25W", "50W", "100W"]),
            antenna: owned(&["原装天线", "老鹰775拉杆天线", "IOO天线"]),
        }
    }

    pub fn get(&self, field: Field) -> &[String] {
        match field {
            Field::Qth => &self.qth,
            Field::Rig => &self.rig,
            Field::Power => &self.power,
            Field::Antenna => &self.antenna,
        }
    }

    fn list_mut(&mut self, field: Field) -> &mut Vec<String> {
        match field {
            Field::Qth => &mut self.qth,
            Field::Rig => &mut self.rig,
            Field::Power => &mut self.power,
            Field::Antenna => &mut self.antenna,
        }
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, field: Field, value: &str) -> bool {
        self.get(field).iter().any(|v| v == value)
    }

    /// Appends `value` unless it is empty or already known. Returns whether it was added.
    pub fn insert(&mut self, field: Field, value: &str) -> bool {
        if value.is_empty() || self.contains(field, value) {
            return false;
        }
        self.list_mut(field).push(value.to_string());
        true
    }

    /// Removes `value` from `field`. Returns whether it was present.
    pub fn remove(&mut self, field: Field, value: &str) -> bool {
        let list = self.list_mut(field);
        let before = list.len();
        list.retain(|v| v != value);
        list.len() != before
    }

    /// Drops blank entries and repeats, keeping each value's first position.
    /// Returns how many entries were dropped.
    fn dedup(&mut self) -> usize {
        let mut dropped = 0;
        for field in [Field::Qth, Field::Rig, Field::Power, Field::Antenna] {
            let list = self.list_mut(field);
            let before = list.len();
            let mut seen = HashSet::new();
            list.retain(|v| !v.is_empty() && seen.insert(v.clone()));
            dropped += before - list.len();
        }
        dropped
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

/// The vocabulary plus where it lives on disk. Every mutation is flushed
/// before it returns; a store without a path stays in memory.
pub struct VocabularyStore {
    vocabulary: Vocabulary,
    path: Option<PathBuf>,
}

impl VocabularyStore {
    pub fn in_memory(vocabulary: Vocabulary) -> Self {
        Self { vocabulary, path: None }
    }

    /// Loads the vocabulary file, creating it with the built-in suggestions
    /// when absent. A file that cannot be parsed is left alone and the
    /// built-in suggestions are used for this run.
    pub fn open(path: &Path) -> Result<Self, LogError> {
        let vocabulary = match load_vocabulary(path) {
            Ok(mut vocabulary) => {
                let dropped = vocabulary.dedup();
                if dropped > 0 {
                    warn!(path = %path.display(), dropped, "ignored repeated vocabulary entries");
                }
                vocabulary
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let vocabulary = Vocabulary::builtin();
                save_vocabulary(&vocabulary, path).map_err(|source| LogError::Vocabulary {
                    path: path.to_path_buf(),
                    source,
                })?;
                info!(path = %path.display(), "created vocabulary with built-in suggestions");
                vocabulary
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable vocabulary, using built-in suggestions");
                Vocabulary::builtin()
            }
        };
        Ok(Self { vocabulary, path: Some(path.to_path_buf()) })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Adds `value` to `field` and saves. Learning a known value is a no-op.
    /// If the save fails the in-memory vocabulary is left as it was.
    pub fn learn(&mut self, field: Field, value: &str) -> Result<bool, LogError> {
        if !self.vocabulary.insert(field, value) {
            return Ok(false);
        }
        if let Err(e) = self.save() {
            self.vocabulary.remove(field, value);
            return Err(e);
        }
        info!(field = %field, value, "learned new vocabulary entry");
        Ok(true)
    }

    /// Reverses an earlier [`learn`](Self::learn). If the save fails the
    /// word is put back where it was, so memory keeps matching the file.
    pub fn forget(&mut self, field: Field, value: &str) -> Result<bool, LogError> {
        let list = self.vocabulary.list_mut(field);
        let Some(position) = list.iter().position(|v| v == value) else {
            return Ok(false);
        };
        list.remove(position);
        if let Err(e) = self.save() {
            self.vocabulary.list_mut(field).insert(position, value.to_string());
            return Err(e);
        }
        Ok(true)
    }

    pub fn save(&self) -> Result<(), LogError> {
        match &self.path {
            Some(path) => save_vocabulary(&self.vocabulary, path).map_err(|source| {
                LogError::Vocabulary { path: path.clone(), source }
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn learning_twice_keeps_one_entry() {
        let mut store = VocabularyStore::in_memory(Vocabulary::builtin());
        assert!(store.learn(Field::Qth, "zh").unwrap());
        let after_first = store.vocabulary().get(Field::Qth).to_vec();
        assert!(!store.learn(Field::Qth, "zh").unwrap());
        assert_eq!(store.vocabulary().get(Field::Qth), after_first.as_slice());
        assert_eq!(after_first.last().map(String::as_str), Some("zh"));
    }

    #[test]
    fn membership_is_case_sensitive() {
        let mut vocabulary = Vocabulary::empty();
        assert!(vocabulary.insert(Field::Rig, "uv-k5"));
        assert!(vocabulary.insert(Field::Rig, "UV-K5"));
        assert!(!vocabulary.insert(Field::Rig, ""));
        assert_eq!(vocabulary.get(Field::Rig), ["uv-k5", "UV-K5"]);
    }

    #[test]
    fn open_creates_missing_file_with_builtins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log_config.json");
        let store = VocabularyStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.vocabulary(), &Vocabulary::builtin());
    }

    #[test]
    fn learned_words_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log_config.json");
        let mut store = VocabularyStore::open(&path).unwrap();
        store.learn(Field::Antenna, "GP天线").unwrap();
        drop(store);

        let reopened = VocabularyStore::open(&path).unwrap();
        assert_eq!(reopened.vocabulary().get(Field::Antenna).last().unwrap(), "GP天线");
    }

    #[test]
    fn corrupt_file_falls_back_without_overwriting() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log_config.json");
        fs::write(&path, "[1, 2").unwrap();
        let store = VocabularyStore::open(&path).unwrap();
        assert_eq!(store.vocabulary(), &Vocabulary::builtin());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[1, 2");
    }

    #[test]
    fn missing_keys_load_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log_config.json");
        fs::write(&path, r#"{"QTH": ["广州"]}"#).unwrap();
        let store = VocabularyStore::open(&path).unwrap();
        assert_eq!(store.vocabulary().get(Field::Qth), ["广州"]);
        assert!(store.vocabulary().get(Field::Rig).is_empty());
    }

    #[test]
    fn repeated_entries_are_dropped_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log_config.json");
        fs::write(&path, r#"{"QTH": ["广州", "深圳", "广州", ""], "Rig": ["UV-K5", "UV-K5"]}"#)
            .unwrap();
        let store = VocabularyStore::open(&path).unwrap();
        assert_eq!(store.vocabulary().get(Field::Qth), ["广州", "深圳"]);
        assert_eq!(store.vocabulary().get(Field::Rig), ["UV-K5"]);
    }

    #[test]
    fn failed_forget_keeps_memory_in_step_with_file() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("data");
        let mut store = VocabularyStore::open(&data.join("log_config.json")).unwrap();
        store.learn(Field::Qth, "zh").unwrap();
        fs::remove_dir_all(&data).unwrap();
        fs::write(&data, "").unwrap();

        assert!(store.forget(Field::Qth, "zh").is_err());
        assert_eq!(store.vocabulary().get(Field::Qth).last().map(String::as_str), Some("zh"));
        assert!(!store.forget(Field::Qth, "never learned").unwrap());
    }

    #[test]
    fn failed_save_does_not_keep_the_word() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("log_config.json");
        let mut store = VocabularyStore::open(&path).unwrap();
        fs::remove_dir_all(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("data"), "").unwrap();

        assert!(store.learn(Field::Rig, "IC-705").is_err());
        assert!(!store.vocabulary().contains(Field::Rig, "IC-705"));
    }
}
