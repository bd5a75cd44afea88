// src/config.rs
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub const VOCABULARY_FILE: &str = "log_config.json";
pub const RECORD_FILE: &str = "ham_radio_log.bin";
pub const CSV_FILE: &str = "ham_radio_log.csv";

/// Command-line options shared by both front-ends.
#[derive(Debug, Clone, Parser)]
#[command(version, about = "Net check-in logger with self-learning shortcuts")]
pub struct Cli {
    /// Directory holding the vocabulary, the log and its CSV copy.
    #[arg(long, env = "VIBE_LOGGER_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Vocabulary file (defaults to <data-dir>/log_config.json).
    #[arg(long, env = "VIBE_LOGGER_VOCAB")]
    pub vocab: Option<PathBuf>,

    /// Record store (defaults to <data-dir>/ham_radio_log.bin).
    #[arg(long, env = "VIBE_LOGGER_RECORDS")]
    pub records: Option<PathBuf>,

    /// CSV mirror (defaults to <data-dir>/ham_radio_log.csv).
    #[arg(long, env = "VIBE_LOGGER_CSV")]
    pub csv: Option<PathBuf>,

    /// Do not keep a CSV copy of the log.
    #[arg(long)]
    pub no_csv: bool,
}

/// Where the logger keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub vocabulary_path: PathBuf,
    pub record_path: PathBuf,
    pub csv_path: Option<PathBuf>,
}

impl LoggerConfig {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            vocabulary_path: dir.join(VOCABULARY_FILE),
            record_path: dir.join(RECORD_FILE),
            csv_path: Some(dir.join(CSV_FILE)),
        }
    }
}

impl From<Cli> for LoggerConfig {
    fn from(cli: Cli) -> Self {
        let defaults = LoggerConfig::in_dir(&cli.data_dir);
        Self {
            vocabulary_path: cli.vocab.unwrap_or(defaults.vocabulary_path),
            record_path: cli.records.unwrap_or(defaults.record_path),
            csv_path: if cli.no_csv { None } else { cli.csv.or(defaults.csv_path) },
        }
    }
}

/// Sends `tracing` output to stderr, filtered by `RUST_LOG` (default `warn`),
/// so it never interleaves with prompts on stdout.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
