// Event-driven front-end: every key press is an event, every submitted line
// is handed to the terminal state machine.
use clap::Parser;
use crossterm::cursor::MoveTo;
use crossterm::event::{read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{style, Stylize};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};
use crossterm::{execute, queue};
use logger_core::config::{init_tracing, Cli, LoggerConfig};
use logger_core::render::error_line;
use logger_core::terminal::{Output, Terminal};
use logger_core::LoggerEngine;
use std::io::{self, stdout, Stdout, Write};

fn main() -> io::Result<()> {
    init_tracing();
    let config = LoggerConfig::from(Cli::parse());
    let engine = match LoggerEngine::open(&config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{}", style(error_line(&e)).red());
            std::process::exit(1);
        }
    };
    let mut terminal = Terminal::new(engine);

    let mut out = stdout();
    enable_raw_mode()?;
    let result = event_loop(&mut terminal, &mut out);
    disable_raw_mode()?;
    writeln!(out)?;
    result
}

fn event_loop(terminal: &mut Terminal, out: &mut Stdout) -> io::Result<()> {
    write_lines(out, &Terminal::greeting())?;
    let mut buffer = String::new();
    show_input(out, &buffer)?;

    loop {
        let Event::Key(KeyEvent { code, modifiers, kind, .. }) = read()? else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }
        let output = match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                buffer.clear();
                terminal.interrupt()
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                show_input(out, &buffer)?;
                continue;
            }
            KeyCode::Backspace => {
                buffer.pop();
                show_input(out, &buffer)?;
                continue;
            }
            KeyCode::Enter => {
                let line = std::mem::take(&mut buffer);
                write!(out, "\r\n")?;
                terminal.handle_line(&line)
            }
            KeyCode::Esc => Output { quit: true, ..Output::default() },
            _ => continue,
        };

        if output.clear {
            execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        write_lines(out, &output.lines)?;
        if output.quit {
            return Ok(());
        }
        show_input(out, &buffer)?;
    }
}

fn write_lines(out: &mut Stdout, lines: &[String]) -> io::Result<()> {
    queue!(out, Clear(ClearType::CurrentLine))?;
    write!(out, "\r")?;
    for line in lines {
        write!(out, "{line}\r\n")?;
    }
    out.flush()
}

fn show_input(out: &mut Stdout, buffer: &str) -> io::Result<()> {
    queue!(out, Clear(ClearType::CurrentLine))?;
    write!(out, "\r{} {buffer}", style(">").green().bold())?;
    out.flush()
}
