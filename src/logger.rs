//! In-app logger
//!
//! Keeps a bounded buffer of recent records for the logs dialog and appends
//! warn+ lines to `~/.pokedex-tui/pokedex.log`. Nothing is written to
//! stdout/stderr, since the terminal belongs to the TUI.

use crate::config::Config;
use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::sync::{LazyLock, Mutex};

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: Level,
    pub target: String,
    pub msg: String,
}

impl LogEntry {
    pub fn format_line(&self) -> String {
        format!("{} [{:>5}] {}: {}", self.timestamp, self.level, self.target, self.msg)
    }
}

const MAX_LOG_LINES: usize = 1000;

static LOGS: LazyLock<Mutex<VecDeque<LogEntry>>> = LazyLock::new(|| Mutex::new(VecDeque::new()));

static LOG_FILE: LazyLock<Mutex<Option<File>>> = LazyLock::new(|| Mutex::new(None));

struct AppLogger;

impl Log for AppLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
            level: record.level(),
            target: record.target().to_string(),
            msg: record.args().to_string(),
        };

        if record.level() <= Level::Warn {
            write_file_line(&entry.format_line());
        }

        push_entry(entry);
    }

    fn flush(&self) {
        if let Ok(mut file) = LOG_FILE.lock() {
            if let Some(f) = file.as_mut() {
                let _ = f.flush();
            }
        }
    }
}

fn push_entry(entry: LogEntry) {
    if let Ok(mut buf) = LOGS.lock() {
        buf.push_back(entry);
        if buf.len() > MAX_LOG_LINES {
            buf.pop_front();
        }
    }
}

fn write_file_line(line: &str) {
    if let Ok(mut file) = LOG_FILE.lock() {
        if let Some(f) = file.as_mut() {
            let _ = writeln!(f, "{}", line);
        }
    }
}

/// Register the logger with the `log` facade; false if one is already set
fn install(level: LevelFilter) -> bool {
    if log::set_boxed_logger(Box::new(AppLogger)).is_err() {
        return false;
    }
    log::set_max_level(level);
    true
}

/// Install the logger at `level` and open the log file
pub fn init(level: LevelFilter) {
    if !install(level) {
        return;
    }

    if let Some(dir) = Config::config_dir() {
        let _ = fs::create_dir_all(&dir);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("pokedex.log"))
            .ok();
        if let Ok(mut lf) = LOG_FILE.lock() {
            *lf = file;
        }
    }

    log::info!("logger initialized at level {}", level);
}

/// The most recent `limit` entries, oldest first
pub fn recent(limit: usize) -> Vec<LogEntry> {
    match LOGS.lock() {
        Ok(buf) => {
            let skip = buf.len().saturating_sub(limit);
            buf.iter().skip(skip).cloned().collect()
        }
        Err(_) => Vec::new(),
    }
}

pub fn len() -> usize {
    LOGS.lock().map(|buf| buf.len()).unwrap_or(0)
}
