use crate::config::LoggerConfig;
use crate::core::phonetic::{PhoneticKeys, PinyinInitials};
use crate::core::session::{Completed, EntrySession, Progress, Prompt};
use crate::core::types::{Field, LogRecord};
use crate::error::LogError;
use crate::export::CsvMirror;
use crate::learning::{Vocabulary, VocabularyStore};
use crate::store::RecordStore;
use tracing::{error, info, warn};

/// Wall-clock `HH:MM`.
pub fn current_time() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

/// Result of feeding one line of input through [`LoggerEngine::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue(Progress),
    Committed(LogRecord),
}

// The logger owns both stores; sessions borrow the vocabulary through it.
pub struct LoggerEngine {
    vocabulary: VocabularyStore,
    records: RecordStore,
    keys: Box<dyn PhoneticKeys>,
    mirror: Option<CsvMirror>,
    clock: fn() -> String,
}

impl LoggerEngine {
    pub fn new(
        vocabulary: VocabularyStore,
        records: RecordStore,
        keys: impl PhoneticKeys + 'static,
    ) -> Self {
        Self {
            vocabulary,
            records,
            keys: Box::new(keys),
            mirror: None,
            clock: current_time,
        }
    }

    /// Opens (or creates) the files named by `config`, with pinyin initials
    /// as the location shortcut.
    pub fn open(config: &LoggerConfig) -> Result<Self, LogError> {
        let records = RecordStore::open(&config.record_path)?;
        let vocabulary = VocabularyStore::open(&config.vocabulary_path)?;
        let mut engine = Self::new(vocabulary, records, PinyinInitials::new());
        engine.mirror = config.csv_path.clone().map(CsvMirror::new);
        Ok(engine)
    }

    pub fn with_mirror(mut self, mirror: CsvMirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn with_clock(mut self, clock: fn() -> String) -> Self {
        self.clock = clock;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        self.vocabulary.vocabulary()
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// Current `HH:MM` as the engine's clock sees it.
    pub fn now(&self) -> String {
        (self.clock)()
    }

    pub fn keys(&self) -> &dyn PhoneticKeys {
        self.keys.as_ref()
    }

    pub fn prompt(&self, session: &EntrySession) -> Option<Prompt> {
        session.prompt(self.vocabulary.vocabulary(), self.keys.as_ref())
    }

    /// Advances `session` by one line of input and commits the record when the
    /// last field is in. A failed commit aborts the session.
    pub fn step(&mut self, session: &mut EntrySession, input: &str) -> Result<Step, LogError> {
        let progress = session.step(input, self.vocabulary.vocabulary(), self.keys.as_ref())?;
        match progress {
            Progress::Finished(completed) => match self.commit(completed) {
                Ok(record) => Ok(Step::Committed(record)),
                Err(e) => {
                    session.abort();
                    Err(e)
                }
            },
            other => Ok(Step::Continue(other)),
        }
    }

    /// Learns the session's new words and appends its record. Either both
    /// happen or neither does.
    pub fn commit(&mut self, completed: Completed) -> Result<LogRecord, LogError> {
        self.records.check_available()?;

        let mut learned: Vec<(Field, String)> = Vec::new();
        for (field, value) in &completed.literals {
            match self.vocabulary.learn(*field, value) {
                Ok(true) => learned.push((*field, value.clone())),
                Ok(false) => {}
                Err(e) => return Err(self.roll_back(&learned, e)),
            }
        }

        let time = self.now();
        let record = match self.records.append(completed.draft, time) {
            Ok(record) => record,
            Err(e) => return Err(self.roll_back(&learned, e)),
        };
        info!(ordinal = record.ordinal, callsign = %record.callsign, "record committed");

        if let Some(mirror) = &self.mirror {
            if let Err(e) = mirror.write(&self.records.rows_with_header()) {
                warn!(path = %mirror.path().display(), error = %e, "CSV export failed");
            }
        }
        Ok(record)
    }

    /// Forgets the words a failed commit learned. Returns `cause` when all
    /// of them are gone again, or `RollbackFailed` naming those still on disk.
    fn roll_back(&mut self, learned: &[(Field, String)], cause: LogError) -> LogError {
        let mut stranded = Vec::new();
        let mut first_error = None;
        for (field, value) in learned.iter().rev() {
            if let Err(e) = self.vocabulary.forget(*field, value) {
                stranded.push(value.clone());
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            None => cause,
            Some(rollback) => {
                error!(error = %rollback, ?stranded, "could not roll back learned words");
                LogError::RollbackFailed {
                    cause: Box::new(cause),
                    rollback: Box::new(rollback),
                    stranded,
                }
            }
        }
    }
}
