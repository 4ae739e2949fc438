//! Rolling Logger
//!
//! `log` backend that keeps the most recent formatted lines in a circular
//! buffer (shown by the admin bar's "Recent log") and forwards every record to
//! the browser console, or stderr off-wasm.

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Lines kept when no capacity is given
pub const DEFAULT_CAPACITY: usize = 500;

static LOGGER: OnceLock<RollingLogger> = OnceLock::new();

pub struct RollingLogger {
    app_name: String,
    level: LevelFilter,
    capacity: usize,
    lines: Mutex<VecDeque<String>>,
}

impl RollingLogger {
    pub fn new(app_name: &str, level: LevelFilter, capacity: usize) -> Self {
        Self {
            app_name: app_name.to_string(),
            level,
            capacity: capacity.max(1),
            lines: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }

    /// Oldest first
    pub fn recent(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn format(&self, record: &Record) -> String {
        format!(
            "[{}] {} {} [{}] {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            self.app_name,
            record.level(),
            record.target(),
            record.args()
        )
    }

    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            if lines.len() == self.capacity {
                lines.pop_front();
            }
            lines.push_back(line);
        }
    }
}

impl Log for RollingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format(record);
        emit(record.level(), &line);
        self.push(line);
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        Level::Info => web_sys::console::info_1(&value),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{}", line);
}

/// Install the global logger. Safe to call once; later calls return an error.
pub fn init_logger(app_name: &str, level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| RollingLogger::new(app_name, level, DEFAULT_CAPACITY));
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Buffered lines of the global logger
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(RollingLogger::recent).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(logger: &RollingLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .args(format_args!("{}", message))
                .level(level)
                .target("test")
                .build(),
        );
    }

    #[test]
    fn test_buffer_drops_oldest() {
        let logger = RollingLogger::new("Shop", LevelFilter::Trace, 3);
        for i in 0..5 {
            record_at(&logger, Level::Info, &format!("line {}", i));
        }
        let lines = logger.recent();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("line 2"));
        assert!(lines[2].ends_with("line 4"));
        assert!(lines[2].contains("Shop INFO [test]"));
    }

    #[test]
    fn test_level_filter() {
        let logger = RollingLogger::new("Shop", LevelFilter::Warn, 10);
        record_at(&logger, Level::Debug, "noise");
        record_at(&logger, Level::Error, "boom");
        let lines = logger.recent();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("ERROR"));
    }

    #[test]
    fn test_recent_lines_reads_installed_logger() {
        init_logger("Shop", LevelFilter::Info).unwrap();
        log::warn!("payment gateway slow");
        log::debug!("hidden");
        let lines = recent_lines();
        assert!(lines.iter().any(|l| l.ends_with("payment gateway slow")));
        assert!(!lines.iter().any(|l| l.contains("hidden")));
        assert!(init_logger("Shop", LevelFilter::Info).is_err());
    }
}
