use clap::Parser;
use crossterm::style::{style, Stylize};
use logger_core::config::{init_tracing, Cli, LoggerConfig};
use logger_core::core::engine::Step;
use logger_core::core::session::EntrySession;
use logger_core::core::types::LogRecord;
use logger_core::render::{
    error_line, progress_line, prompt_lines, record_banner, record_summary, RULE,
};
use logger_core::{LogError, LoggerEngine};
use std::io::{self, stdin, stdout, Write};

enum Outcome {
    Saved(LogRecord),
    Discarded,
    Failed(LogError),
    EndOfInput,
}

fn main() -> io::Result<()> {
    init_tracing();
    let config = LoggerConfig::from(Cli::parse());
    let mut engine = match LoggerEngine::open(&config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{}", style(error_line(&e)).red());
            std::process::exit(1);
        }
    };

    println!("{RULE}");
    println!("      Net check-in logger (smart suggestions)");
    println!("  New entries are learned; next time just type their number");
    println!("  Type 'exit' at any prompt to drop the current record");
    println!("{RULE}");

    loop {
        match run_session(&mut engine)? {
            Outcome::Saved(record) => {
                println!("\n{}", style(format!("✅ Saved: {}", record_summary(&record))).green());
            }
            Outcome::Discarded => println!("{}", style("Record discarded").yellow()),
            Outcome::Failed(e) => eprintln!("\n{}", style(error_line(&e)).red()),
            Outcome::EndOfInput => break,
        }

        match read_line("\n[Enter] next, [n] quit: ")? {
            Some(answer) if answer.trim().eq_ignore_ascii_case("n") => break,
            Some(_) => {}
            None => break,
        }
    }
    Ok(())
}

/// Drives one entry session to completion with blocking reads.
fn run_session(engine: &mut LoggerEngine) -> io::Result<Outcome> {
    let mut session = EntrySession::new();
    let banner = record_banner(engine.records().next_ordinal(), &engine.now());
    println!("\n{}", style(banner).bold());

    while let Some(prompt) = engine.prompt(&session) {
        let mut lines = prompt_lines(&prompt);
        let ask = lines.pop().unwrap_or_default();
        for line in lines {
            println!("{line}");
        }

        let input = match read_line(&format!("{ask} "))? {
            Some(input) => input,
            None => {
                session.abort();
                return Ok(Outcome::EndOfInput);
            }
        };
        if input.trim().eq_ignore_ascii_case("exit") {
            session.abort();
            return Ok(Outcome::Discarded);
        }

        match engine.step(&mut session, &input) {
            Ok(Step::Continue(progress)) => {
                if let Some(line) = progress_line(&progress) {
                    println!("{}", style(line).cyan());
                }
            }
            Ok(Step::Committed(record)) => return Ok(Outcome::Saved(record)),
            Err(e) if e.is_recoverable() => println!("{}", style(error_line(&e)).yellow()),
            Err(e) => return Ok(Outcome::Failed(e)),
        }
    }
    Ok(Outcome::Discarded)
}

/// Prints `prompt` and reads one line. `None` at end of input.
fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    stdout().flush()?;
    let mut input = String::new();
    if stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(&['\r', '\n'][..]).to_string()))
}
