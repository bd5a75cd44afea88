// src/render.rs
//! Plain-text rendering shared by the console and the terminal front-ends.
use crate::core::session::{Progress, Prompt};
use crate::core::types::LogRecord;
use crate::error::LogError;

pub const RULE: &str = "==================================================";

/// `【No.12 | 20:41】`
pub fn record_banner(ordinal: u64, time: &str) -> String {
    format!("【No.{ordinal} | {time}】")
}

pub fn prompt_lines(prompt: &Prompt) -> Vec<String> {
    let mut lines = Vec::with_capacity(prompt.options.len() + 2);
    if prompt.options.is_empty() {
        lines.push(format!("{} [{}]:", prompt.title, prompt.hint));
        return lines;
    }
    lines.push(format!(">>> {}", prompt.title));
    for option in &prompt.options {
        match &option.key {
            Some(key) => lines.push(format!("  {}. {} [{}]", option.index, option.value, key)),
            None => lines.push(format!("  {}. {}", option.index, option.value)),
        }
    }
    lines.push(format!("Enter {}:", prompt.hint));
    lines
}

/// Feedback after a step, if the step is worth echoing.
pub fn progress_line(progress: &Progress) -> Option<String> {
    match progress {
        Progress::Accepted { stage, value } if stage.field().is_some() => {
            Some(format!("   ∟ {} 【{}】", stage.label(), value))
        }
        Progress::Accepted { .. } => None,
        Progress::Suggested { .. } => None,
        Progress::Ambiguous { candidates, .. } => {
            Some(format!("   ⚠ {} options match", candidates.len()))
        }
        Progress::Finished(_) => None,
    }
}

/// One-line summary printed after a record is saved.
pub fn record_summary(record: &LogRecord) -> String {
    format!(
        "{} | {} | {} | {} | {} | {} | {}",
        record.callsign,
        record.qth,
        record.rig,
        record.power,
        record.antenna,
        record.rst,
        record.message
    )
}

/// Compact row for `list`.
pub fn record_row(record: &LogRecord) -> String {
    format!(
        "{:>2} | {} | {:<8} | {:<6} | {:<2} | {}",
        record.ordinal, record.time, record.callsign, record.qth, record.rst, record.rig
    )
}

pub fn error_line(error: &LogError) -> String {
    if error.is_recoverable() {
        format!("{error}, please try again")
    } else {
        format!("❌ {error}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::{PromptOption, Stage};
    use crate::error::EntryError;

    fn record() -> LogRecord {
        LogRecord {
            ordinal: 3,
            time: "20:41".into(),
            callsign: "BG7XYZ".into(),
            qth: "南山".into(),
            rst: "59".into(),
            rig: "UV-K5".into(),
            power: "5W".into(),
            antenna: "原装天线".into(),
            message: "73".into(),
        }
    }

    #[test]
    fn options_are_numbered_with_keys() {
        let prompt = Prompt {
            title: "Choose or enter QTH (location)".into(),
            options: vec![
                PromptOption { index: 1, value: "广州".into(), key: Some("gz".into()) },
                PromptOption { index: 2, value: "深圳".into(), key: Some("sz".into()) },
            ],
            hint: "index / initials / keyword / new text".into(),
        };
        let lines = prompt_lines(&prompt);
        assert_eq!(lines[1], "  1. 广州 [gz]");
        assert_eq!(lines[2], "  2. 深圳 [sz]");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn free_text_prompt_is_one_line() {
        let prompt = Prompt { title: "Enter RST".into(), options: vec![], hint: "default 59".into() };
        assert_eq!(prompt_lines(&prompt), ["Enter RST [default 59]:"]);
    }

    #[test]
    fn summary_and_row_layout() {
        assert_eq!(record_summary(&record()), "BG7XYZ | 南山 | UV-K5 | 5W | 原装天线 | 59 | 73");
        assert!(record_row(&record()).starts_with(" 3 | 20:41 | BG7XYZ"));
        assert_eq!(record_banner(3, "20:41"), "【No.3 | 20:41】");
    }

    #[test]
    fn only_vocabulary_fields_are_echoed() {
        let rst = Progress::Accepted { stage: Stage::Rst, value: "59".into() };
        let rig = Progress::Accepted { stage: Stage::Rig, value: "UV-K5".into() };
        assert_eq!(progress_line(&rst), None);
        assert_eq!(progress_line(&rig).unwrap(), "   ∟ Rig (device) 【UV-K5】");
    }

    #[test]
    fn recoverable_errors_ask_again() {
        let err = LogError::from(EntryError::Validation { field: "Callsign" });
        assert_eq!(error_line(&err), "Callsign cannot be empty, please try again");
    }
}
