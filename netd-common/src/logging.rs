//! The concrete form of spec.md §6's "log sink": one append-only text file
//! per service, each line `"YYYY-MM-DD HH:MM:SS: <message>"` in local time.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

struct FileLogger {
    file: Mutex<std::fs::File>,
    level: Level,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "{}: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.args()
        );
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Opens `path` for append and installs it as the process-global logger.
/// Call once, at startup, before any `log::info!`/`warn!`/`error!` call.
pub fn init(path: impl AsRef<Path>, level: Level) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let logger = FileLogger {
        file: Mutex::new(file),
        level,
    };
    log::set_max_level(LevelFilter::from(level));
    log::set_boxed_logger(Box::new(logger))
        .map_err(|error: SetLoggerError| std::io::Error::new(std::io::ErrorKind::Other, error))
}
