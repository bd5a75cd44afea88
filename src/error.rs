// src/error.rs
use crate::core::types::Field;
use std::path::PathBuf;
use thiserror::Error;

/// Recoverable input problems. The session stays in the state that raised them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// A required field was left blank.
    #[error("{field} cannot be empty")]
    Validation { field: &'static str },

    /// An index typed during disambiguation is outside the offered list.
    #[error("no option {input}; choose 1-{available} or type new text")]
    AmbiguousSelection { input: String, available: usize },

    #[error("no entry session is active")]
    Inactive,
}

#[derive(Debug, Error)]
pub enum LogError {
    /// The record store could not be opened or written. Fatal for the session.
    #[error("log file {} is unavailable (is it open in another program?): {source}", .path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not save vocabulary to {}: {source}", .path.display())]
    Vocabulary {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A commit failed after learning new words, and removing them again
    /// failed too. `stranded` stays in the vocabulary file.
    #[error("{cause}; learned words {stranded:?} could not be removed again: {rollback}")]
    RollbackFailed {
        #[source]
        cause: Box<LogError>,
        rollback: Box<LogError>,
        stranded: Vec<String>,
    },

    #[error(transparent)]
    Entry(#[from] EntryError),
}

impl LogError {
    /// Whether the operator can simply retry the current prompt.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LogError::Entry(_))
    }
}

impl EntryError {
    pub fn required(field: Field) -> Self {
        EntryError::Validation { field: field.key() }
    }
}
