// src/terminal.rs
//! Command terminal driven one input line at a time. Between lines the
//! entry session is simply parked in `self.session`.
use crate::core::engine::{LoggerEngine, Step};
use crate::core::session::EntrySession;
use crate::render::{
    error_line, progress_line, prompt_lines, record_banner, record_row, record_summary, RULE,
};
use tracing::debug;

const DEFAULT_LIST_LEN: usize = 5;

/// What the front-end should do after handling one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub lines: Vec<String>,
    pub clear: bool,
    pub quit: bool,
}

impl Output {
    fn from_lines(lines: Vec<String>) -> Self {
        Self { lines, ..Self::default() }
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }
}

pub struct Terminal {
    engine: LoggerEngine,
    session: Option<EntrySession>,
}

impl Terminal {
    pub fn new(engine: LoggerEngine) -> Self {
        Self { engine, session: None }
    }

    pub fn engine(&self) -> &LoggerEngine {
        &self.engine
    }

    pub fn in_entry_mode(&self) -> bool {
        self.session.is_some()
    }

    pub fn greeting() -> Vec<String> {
        vec![
            "Net logger terminal".to_string(),
            "Type 'help' for commands, Ctrl+C leaves entry mode".to_string(),
            RULE.to_string(),
        ]
    }

    /// Handles one submitted line.
    pub fn handle_line(&mut self, line: &str) -> Output {
        let line = line.trim();
        if self.session.is_some() {
            return self.entry_input(line);
        }
        if line.is_empty() {
            return Output::default();
        }
        debug!(command = line, "terminal command");
        let lower = line.to_lowercase();
        let mut words = lower.split_whitespace();
        match words.next().unwrap_or_default() {
            "help" => Output::from_lines(help()),
            "status" => {
                let records = self.engine.records();
                Output::from_lines(vec![
                    format!("Next No.: {}", records.next_ordinal()),
                    format!("Time: {}", self.engine.now()),
                    format!("Records so far: {}", records.len()),
                ])
            }
            "count" => {
                let total = self.engine.records().len();
                Output::from_lines(vec![format!("Total records: {total}")])
            }
            "list" => {
                let n = words
                    .next()
                    .and_then(|w| w.parse().ok())
                    .unwrap_or(DEFAULT_LIST_LEN);
                Output::from_lines(self.list(n))
            }
            "clear" => Output {
                lines: vec!["Terminal cleared".to_string()],
                clear: true,
                quit: false,
            },
            "log" => self.start_entry(),
            "quit" => Output { quit: true, ..Output::default() },
            _ => Output::from_lines(vec![
                format!("Unknown command: {line}"),
                "Type 'help' for commands".to_string(),
            ]),
        }
    }

    /// The abort signal: leaves entry mode, discarding the record in progress.
    pub fn interrupt(&mut self) -> Output {
        let mut out = Output::from_lines(vec!["^C".to_string()]);
        if let Some(mut session) = self.session.take() {
            session.abort();
            out.push("Left entry mode");
            out.push(RULE);
        }
        out
    }

    /// The last `n` records; `list 0` shows them all.
    fn list(&self, n: usize) -> Vec<String> {
        let records = self.engine.records();
        let recent = if n == 0 { records.read_all() } else { records.recent(n) };
        if recent.is_empty() {
            return vec!["No records yet".to_string()];
        }
        let mut lines = vec![format!("Last {} records:", recent.len()), "-".repeat(60)];
        lines.extend(recent.iter().map(record_row));
        lines
    }

    fn start_entry(&mut self) -> Output {
        let session = EntrySession::new();
        let mut out = Output::from_lines(vec![
            RULE.to_string(),
            "Entry mode: answer each field, 'exit' leaves entry mode".to_string(),
            RULE.to_string(),
            record_banner(self.engine.records().next_ordinal(), &self.engine.now()),
        ]);
        if let Some(prompt) = self.engine.prompt(&session) {
            out.lines.extend(prompt_lines(&prompt));
        }
        self.session = Some(session);
        out
    }

    fn entry_input(&mut self, line: &str) -> Output {
        if line.eq_ignore_ascii_case("exit") {
            self.session = None;
            return Output::from_lines(vec!["Left entry mode".to_string()]);
        }
        let Some(session) = self.session.as_mut() else {
            return Output::default();
        };

        let mut out = Output::default();
        match self.engine.step(session, line) {
            Ok(Step::Continue(progress)) => {
                out.lines.extend(progress_line(&progress));
                if let Some(prompt) = self.engine.prompt(session) {
                    out.lines.extend(prompt_lines(&prompt));
                }
            }
            Ok(Step::Committed(record)) => {
                self.session = None;
                out.push("-".repeat(35));
                out.push(format!("✅ Saved: {}", record_summary(&record)));
                out.push("-".repeat(35));
                out.push("Entry done. Type 'log' for the next record");
            }
            Err(e) if e.is_recoverable() => {
                out.push(error_line(&e));
                if let Some(prompt) = self.engine.prompt(session) {
                    out.lines.extend(prompt_lines(&prompt));
                }
            }
            Err(e) => {
                self.session = None;
                out.push(error_line(&e));
                out.push("Left entry mode");
            }
        }
        out
    }
}

fn help() -> Vec<String> {
    [
        "Commands:",
        "  help        show this help",
        "  status      next number, time and record count",
        "  count       number of records",
        "  list [n]    last n records (default 5, 0 for all)",
        "  clear       clear the screen",
        "  log         enter a record field by field",
        "  quit        leave the terminal",
        "",
        "Keys:",
        "  Ctrl+C      leave entry mode or clear the input",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
