// src/core/session.rs
use crate::core::phonetic::PhoneticKeys;
use crate::core::resolver::{index_digits, resolve, select_index};
use crate::core::types::{
    Field, MatchOutcome, RecordDraft, DEFAULT_MESSAGE, DEFAULT_RST,
};
use crate::error::EntryError;
use crate::learning::Vocabulary;
use tracing::debug;

/// The fields of a record, in the order they are asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Callsign,
    Qth,
    Rst,
    Rig,
    Power,
    Antenna,
    Message,
}

impl Stage {
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Callsign => Some(Stage::Qth),
            Stage::Qth => Some(Stage::Rst),
            Stage::Rst => Some(Stage::Rig),
            Stage::Rig => Some(Stage::Power),
            Stage::Power => Some(Stage::Antenna),
            Stage::Antenna => Some(Stage::Message),
            Stage::Message => None,
        }
    }

    /// The vocabulary behind this stage, if it has one.
    pub fn field(self) -> Option<Field> {
        match self {
            Stage::Qth => Some(Field::Qth),
            Stage::Rig => Some(Field::Rig),
            Stage::Power => Some(Field::Power),
            Stage::Antenna => Some(Field::Antenna),
            Stage::Callsign | Stage::Rst | Stage::Message => None,
        }
    }

    fn of(field: Field) -> Stage {
        match field {
            Field::Qth => Stage::Qth,
            Field::Rig => Stage::Rig,
            Field::Power => Stage::Power,
            Field::Antenna => Stage::Antenna,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Callsign => "Callsign",
            Stage::Rst => "RST",
            Stage::Message => "Topic / message",
            other => other.field().map(Field::label).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Enter(Stage),
    /// A unique textual match waits for the operator to accept or override it.
    Confirm { field: Field, suggestion: String },
    Disambiguate { field: Field, candidates: Vec<String> },
    /// Finished or aborted; further input is rejected.
    Closed,
}

/// A fully entered record and the words it introduced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    pub draft: RecordDraft,
    pub literals: Vec<(Field, String)>,
}

/// What one step of input did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Accepted { stage: Stage, value: String },
    Suggested { field: Field, suggestion: String },
    Ambiguous { field: Field, candidates: Vec<String> },
    Finished(Completed),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOption {
    pub index: usize,
    pub value: String,
    /// Phonetic key shown beside locations.
    pub key: Option<String>,
}

/// Everything a front-end needs to ask for the next input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub options: Vec<PromptOption>,
    pub hint: String,
}

/// One record's worth of field-by-field entry.
///
/// The whole state is held in this value, so a blocking loop and an event
/// handler can drive it the same way: call [`step`](Self::step) with each
/// line of input until it reports [`Progress::Finished`].
#[derive(Debug, Clone)]
pub struct EntrySession {
    state: SessionState,
    draft: RecordDraft,
    literals: Vec<(Field, String)>,
}

impl EntrySession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Enter(Stage::Callsign),
            draft: RecordDraft::default(),
            literals: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn draft(&self) -> &RecordDraft {
        &self.draft
    }

    pub fn is_open(&self) -> bool {
        self.state != SessionState::Closed
    }

    /// Discards everything entered so far. Nothing from an aborted session is
    /// ever committed or learned.
    pub fn abort(&mut self) {
        self.draft = RecordDraft::default();
        self.literals.clear();
        self.state = SessionState::Closed;
    }

    /// Feeds one line of operator input. Errors leave the state untouched so
    /// the same prompt can be asked again.
    pub fn step(
        &mut self,
        input: &str,
        vocabulary: &Vocabulary,
        keys: &dyn PhoneticKeys,
    ) -> Result<Progress, EntryError> {
        let input = input.trim();
        match self.state.clone() {
            SessionState::Enter(stage) => match stage.field() {
                Some(field) => self.enter_field(field, input, vocabulary, keys),
                None => self.enter_text(stage, input),
            },
            SessionState::Confirm { field, suggestion } => {
                if input.is_empty() {
                    return Ok(self.finalize(field, suggestion, vocabulary));
                }
                // One retry: an index into the full list, otherwise the text as typed.
                let value = select_index(input, vocabulary.get(field))
                    .map(str::to_string)
                    .unwrap_or_else(|| input.to_string());
                Ok(self.finalize(field, value, vocabulary))
            }
            SessionState::Disambiguate { field, candidates } => {
                self.choose(field, &candidates, input, vocabulary)
            }
            SessionState::Closed => Err(EntryError::Inactive),
        }
    }

    /// Callsign, RST and message are taken as typed, with no matching.
    fn enter_text(&mut self, stage: Stage, input: &str) -> Result<Progress, EntryError> {
        let value = match stage {
            Stage::Callsign if input.is_empty() => {
                return Err(EntryError::Validation { field: stage.label() });
            }
            Stage::Callsign => input.to_uppercase(),
            Stage::Rst => or_default(input, DEFAULT_RST),
            _ => or_default(input, DEFAULT_MESSAGE),
        };
        match stage {
            Stage::Callsign => self.draft.callsign = value.clone(),
            Stage::Rst => self.draft.rst = value.clone(),
            _ => self.draft.message = value.clone(),
        }
        Ok(self.advance(stage, value))
    }

    fn enter_field(
        &mut self,
        field: Field,
        input: &str,
        vocabulary: &Vocabulary,
        keys: &dyn PhoneticKeys,
    ) -> Result<Progress, EntryError> {
        if input.is_empty() && field.default_value().is_none() {
            return Err(EntryError::required(field));
        }
        let resolution = resolve(
            input,
            vocabulary.get(field),
            field.is_phonetic(),
            field.default_value(),
            keys,
        );
        debug!(field = %field, ?resolution, "resolved input");
        let needs_confirmation = resolution.needs_confirmation();
        match resolution.outcome {
            MatchOutcome::Selected(suggestion) if needs_confirmation => {
                self.state = SessionState::Confirm { field, suggestion: suggestion.clone() };
                Ok(Progress::Suggested { field, suggestion })
            }
            MatchOutcome::Selected(value) | MatchOutcome::Literal(value) => {
                Ok(self.finalize(field, value, vocabulary))
            }
            MatchOutcome::Ambiguous(candidates) => {
                self.state = SessionState::Disambiguate { field, candidates: candidates.clone() };
                Ok(Progress::Ambiguous { field, candidates })
            }
        }
    }

    fn choose(
        &mut self,
        field: Field,
        candidates: &[String],
        input: &str,
        vocabulary: &Vocabulary,
    ) -> Result<Progress, EntryError> {
        if input.is_empty() {
            return match field.default_value() {
                Some(default) => Ok(self.finalize(field, default.to_string(), vocabulary)),
                None => Err(EntryError::required(field)),
            };
        }
        // Any all-digit input is an index here, however large.
        if let Some(digits) = index_digits(input) {
            return match select_index(&digits, candidates) {
                Some(chosen) => Ok(self.finalize(field, chosen.to_string(), vocabulary)),
                None => Err(EntryError::AmbiguousSelection {
                    input: input.to_string(),
                    available: candidates.len(),
                }),
            };
        }
        Ok(self.finalize(field, input.to_string(), vocabulary))
    }

    /// Fixes the field's value, remembers it for learning if it is new, and
    /// moves to the next stage.
    fn finalize(&mut self, field: Field, value: String, vocabulary: &Vocabulary) -> Progress {
        if !vocabulary.contains(field, &value)
            && !self.literals.iter().any(|(f, v)| *f == field && *v == value)
        {
            self.literals.push((field, value.clone()));
        }
        self.draft.set(field, value.clone());
        self.advance(Stage::of(field), value)
    }

    fn advance(&mut self, stage: Stage, value: String) -> Progress {
        match stage.next() {
            Some(next) => {
                self.state = SessionState::Enter(next);
                Progress::Accepted { stage, value }
            }
            None => {
                self.state = SessionState::Closed;
                Progress::Finished(Completed {
                    draft: std::mem::take(&mut self.draft),
                    literals: std::mem::take(&mut self.literals),
                })
            }
        }
    }

    /// Describes the next input to ask for, or `None` once the session is closed.
    pub fn prompt(&self, vocabulary: &Vocabulary, keys: &dyn PhoneticKeys) -> Option<Prompt> {
        let prompt = match &self.state {
            SessionState::Enter(stage) => match stage.field() {
                Some(field) => Prompt {
                    title: format!("Choose or enter {}", field.label()),
                    options: numbered(vocabulary.get(field), field.is_phonetic(), keys),
                    hint: field_hint(field),
                },
                None => Prompt {
                    title: format!("Enter {}", stage.label()),
                    options: Vec::new(),
                    hint: match stage {
                        Stage::Rst => format!("default {DEFAULT_RST}"),
                        Stage::Message => format!("default {DEFAULT_MESSAGE}"),
                        _ => "required".to_string(),
                    },
                },
            },
            SessionState::Confirm { field, suggestion } => Prompt {
                title: format!("{} matched 【{}】", field.label(), suggestion),
                options: Vec::new(),
                hint: "Enter to accept, or type a replacement".to_string(),
            },
            SessionState::Disambiguate { field, candidates } => Prompt {
                title: format!("Several {} entries match", field.label()),
                options: numbered(candidates, false, keys),
                hint: "index to choose, or type new text".to_string(),
            },
            SessionState::Closed => return None,
        };
        Some(prompt)
    }
}

impl Default for EntrySession {
    fn default() -> Self {
        Self::new()
    }
}

fn or_default(input: &str, default: &str) -> String {
    if input.is_empty() {
        default.to_string()
    } else {
        input.to_string()
    }
}

fn numbered(values: &[String], phonetic: bool, keys: &dyn PhoneticKeys) -> Vec<PromptOption> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| PromptOption {
            index: i + 1,
            value: value.clone(),
            key: phonetic.then(|| keys.abbreviate(value)),
        })
        .collect()
}

fn field_hint(field: Field) -> String {
    let kinds = if field.is_phonetic() {
        "index / initials / keyword / new text"
    } else {
        "index / keyword / new text"
    };
    match field.default_value() {
        Some(default) => format!("{kinds} (default {default})"),
        None => kinds.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn keys() -> impl Fn(&str) -> String {
        let table: HashMap<&str, &str> = HashMap::from([("广州", "gz"), ("深圳", "sz")]);
        move |text: &str| table.get(text).copied().unwrap_or_default().to_string()
    }

    fn vocabulary() -> Vocabulary {
        let mut v = Vocabulary::empty();
        for qth in ["广州", "深圳"] {
            v.insert(Field::Qth, qth);
        }
        for rig in ["UV-K5", "UV-K6"] {
            v.insert(Field::Rig, rig);
        }
        for power in ["5W", "10W"] {
            v.insert(Field::Power, power);
        }
        v.insert(Field::Antenna, "原装天线");
        v
    }

    fn run(session: &mut EntrySession, inputs: &[&str]) -> Progress {
        let vocab = vocabulary();
        let keys = keys();
        let mut last = None;
        for input in inputs {
            last = Some(session.step(input, &vocab, &keys).unwrap());
        }
        last.unwrap()
    }

    #[test]
    fn blank_callsign_is_rejected_without_advancing() {
        let mut session = EntrySession::new();
        let err = session.step("   ", &vocabulary(), &keys()).unwrap_err();
        assert_eq!(err, EntryError::Validation { field: "Callsign" });
        assert_eq!(session.state(), &SessionState::Enter(Stage::Callsign));

        run(&mut session, &["bg1xyz"]);
        assert_eq!(session.draft().callsign, "BG1XYZ");
        assert_eq!(session.state(), &SessionState::Enter(Stage::Qth));
    }

    #[test]
    fn full_pass_with_defaults() {
        let mut session = EntrySession::new();
        let progress = run(&mut session, &["bg1xyz", "1", "", "2", "", "1", ""]);
        let Progress::Finished(done) = progress else { panic!("expected finish") };
        assert_eq!(done.draft.qth, "广州");
        assert_eq!(done.draft.rst, "59");
        assert_eq!(done.draft.rig, "UV-K6");
        assert_eq!(done.draft.power, "5W");
        assert_eq!(done.draft.message, "73");
        assert!(done.literals.is_empty());
        assert!(!session.is_open());
    }

    #[test]
    fn phonetic_match_waits_for_confirmation() {
        let mut session = EntrySession::new();
        let progress = run(&mut session, &["bg1xyz", "gz"]);
        assert_eq!(progress, Progress::Suggested { field: Field::Qth, suggestion: "广州".into() });

        let progress = run(&mut session, &[""]);
        assert_eq!(progress, Progress::Accepted { stage: Stage::Qth, value: "广州".into() });
    }

    #[test]
    fn override_gets_one_index_retry_then_literal() {
        let mut session = EntrySession::new();
        run(&mut session, &["bg1xyz", "gz", "2"]);
        assert_eq!(session.draft().qth, "深圳");

        let mut session = EntrySession::new();
        // "sz" would match 深圳 phonetically, but overrides are not matched again.
        run(&mut session, &["bg1xyz", "gz", "sz"]);
        assert_eq!(session.draft().qth, "sz");
    }

    #[test]
    fn unmatched_location_becomes_a_literal() {
        let mut session = EntrySession::new();
        let progress = run(&mut session, &["bg1xyz", "zh", "", "1", "", "1", "hi"]);
        let Progress::Finished(done) = progress else { panic!("expected finish") };
        assert_eq!(done.draft.qth, "zh");
        assert_eq!(done.literals, vec![(Field::Qth, "zh".to_string())]);
    }

    #[test]
    fn ambiguous_rig_then_index() {
        let mut session = EntrySession::new();
        let progress = run(&mut session, &["bg1xyz", "1", "", "uv"]);
        assert_eq!(
            progress,
            Progress::Ambiguous { field: Field::Rig, candidates: vec!["UV-K5".into(), "UV-K6".into()] }
        );
        run(&mut session, &["2"]);
        assert_eq!(session.draft().rig, "UV-K6");
        assert_eq!(session.state(), &SessionState::Enter(Stage::Power));
    }

    #[test]
    fn out_of_range_choice_reprompts() {
        let mut session = EntrySession::new();
        run(&mut session, &["bg1xyz", "1", "", "uv"]);
        let before = session.state().clone();
        let err = session.step("3", &vocabulary(), &keys()).unwrap_err();
        assert_eq!(err, EntryError::AmbiguousSelection { input: "3".into(), available: 2 });
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn oversized_index_is_not_taken_as_text() {
        let mut session = EntrySession::new();
        run(&mut session, &["bg1xyz", "1", "", "uv"]);
        let before = session.state().clone();
        let huge = "99999999999999999999999";
        let err = session.step(huge, &vocabulary(), &keys()).unwrap_err();
        assert_eq!(err, EntryError::AmbiguousSelection { input: huge.into(), available: 2 });
        assert_eq!(session.state(), &before);
        assert_eq!(session.draft().rig, "");
    }

    #[test]
    fn fullwidth_index_chooses_candidate() {
        let mut session = EntrySession::new();
        run(&mut session, &["bg1xyz", "1", "", "uv", "２"]);
        assert_eq!(session.draft().rig, "UV-K6");
        assert_eq!(session.state(), &SessionState::Enter(Stage::Power));

        let mut session = EntrySession::new();
        run(&mut session, &["bg1xyz", "1", "", "uv"]);
        let err = session.step("３", &vocabulary(), &keys()).unwrap_err();
        assert!(matches!(err, EntryError::AmbiguousSelection { available: 2, .. }));
    }

    #[test]
    fn blank_power_choice_takes_default() {
        let mut session = EntrySession::new();
        run(&mut session, &["bg1xyz", "1", "", "1", "w"]);
        assert!(matches!(session.state(), SessionState::Disambiguate { field: Field::Power, .. }));
        run(&mut session, &[""]);
        assert_eq!(session.draft().power, "5W");
    }

    #[test]
    fn text_during_disambiguation_is_literal() {
        let mut session = EntrySession::new();
        let progress = run(&mut session, &["bg1xyz", "1", "", "uv", "UV-5R", "", "1", ""]);
        let Progress::Finished(done) = progress else { panic!("expected finish") };
        assert_eq!(done.draft.rig, "UV-5R");
        assert_eq!(done.literals, vec![(Field::Rig, "UV-5R".to_string())]);
    }

    #[test]
    fn required_fields_reject_blank() {
        let mut session = EntrySession::new();
        run(&mut session, &["bg1xyz"]);
        let err = session.step("", &vocabulary(), &keys()).unwrap_err();
        assert_eq!(err, EntryError::required(Field::Qth));
        assert_eq!(session.state(), &SessionState::Enter(Stage::Qth));
    }

    #[test]
    fn abort_discards_everything() {
        let mut session = EntrySession::new();
        run(&mut session, &["bg1xyz", "zh"]);
        session.abort();
        assert!(!session.is_open());
        assert_eq!(session.draft(), &RecordDraft::default());
        assert_eq!(session.step("x", &vocabulary(), &keys()), Err(EntryError::Inactive));
    }

    #[test]
    fn location_prompt_lists_phonetic_keys() {
        let mut session = EntrySession::new();
        run(&mut session, &["bg1xyz"]);
        let prompt = session.prompt(&vocabulary(), &keys()).unwrap();
        assert_eq!(prompt.options.len(), 2);
        assert_eq!(prompt.options[0].index, 1);
        assert_eq!(prompt.options[0].key.as_deref(), Some("gz"));
        assert!(prompt.hint.contains("initials"));
    }
}
