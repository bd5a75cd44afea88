// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column titles of the record table, in storage order.
pub const RECORD_HEADER: [&str; 9] = [
    "No.", "Time", "Callsign", "QTH", "RST", "Rig", "Power", "Antenna", "Message",
];

pub const DEFAULT_RST: &str = "59";
pub const DEFAULT_POWER: &str = "5W";
pub const DEFAULT_MESSAGE: &str = "73";

/// A vocabulary-tracked field. Callsign, RST and Message are free text and
/// have no vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "QTH")]
    Qth,
    Rig,
    Power,
    Antenna,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Qth, Field::Rig, Field::Power, Field::Antenna];

    /// Key used in the vocabulary file.
    pub fn key(self) -> &'static str {
        match self {
            Field::Qth => "QTH",
            Field::Rig => "Rig",
            Field::Power => "Power",
            Field::Antenna => "Antenna",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Qth => "QTH (location)",
            Field::Rig => "Rig (device)",
            Field::Power => "Power",
            Field::Antenna => "Antenna",
        }
    }

    /// Only locations are matched by their phonetic key.
    pub fn is_phonetic(self) -> bool {
        matches!(self, Field::Qth)
    }

    /// Value taken when the operator leaves the field blank.
    pub fn default_value(self) -> Option<&'static str> {
        match self {
            Field::Power => Some(DEFAULT_POWER),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Result of matching raw input against a field's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Selected(String),
    /// At least two candidates, in vocabulary order.
    Ambiguous(Vec<String>),
    Literal(String),
}

/// Which rule produced a [`MatchOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchVia {
    Default,
    Index,
    /// Phonetic key or substring match.
    Text,
    Verbatim,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: MatchOutcome,
    pub via: MatchVia,
}

impl Resolution {
    /// A unique textual match is only a suggestion until the operator confirms it.
    pub fn needs_confirmation(&self) -> bool {
        self.via == MatchVia::Text && matches!(self.outcome, MatchOutcome::Selected(_))
    }
}

/// Field values gathered by an entry session, before ordinal and time are stamped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    pub callsign: String,
    pub qth: String,
    pub rst: String,
    pub rig: String,
    pub power: String,
    pub antenna: String,
    pub message: String,
}

impl RecordDraft {
    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Qth => self.qth = value,
            Field::Rig => self.rig = value,
            Field::Power => self.power = value,
            Field::Antenna => self.antenna = value,
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Qth => &self.qth,
            Field::Rig => &self.rig,
            Field::Power => &self.power,
            Field::Antenna => &self.antenna,
        }
    }
}

/// One committed row of the log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub ordinal: u64,
    /// Wall-clock `HH:MM` at commit.
    pub time: String,
    pub callsign: String,
    pub qth: String,
    pub rst: String,
    pub rig: String,
    pub power: String,
    pub antenna: String,
    pub message: String,
}

impl LogRecord {
    pub fn from_draft(draft: RecordDraft, ordinal: u64, time: String) -> Self {
        Self {
            ordinal,
            time,
            callsign: draft.callsign,
            qth: draft.qth,
            rst: draft.rst,
            rig: draft.rig,
            power: draft.power,
            antenna: draft.antenna,
            message: draft.message,
        }
    }

    /// Cells in [`RECORD_HEADER`] order.
    pub fn cells(&self) -> [String; 9] {
        [
            self.ordinal.to_string(),
            self.time.clone(),
            self.callsign.clone(),
            self.qth.clone(),
            self.rst.clone(),
            self.rig.clone(),
            self.power.clone(),
            self.antenna.clone(),
            self.message.clone(),
        ]
    }
}
