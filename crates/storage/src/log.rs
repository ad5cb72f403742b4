use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};

/// Number of entries kept by a log repository.
pub const MAX_ENTRIES: usize = 100;

static LOG: Mutex<Option<Arc<dyn Repository>>> = Mutex::new(None);

#[allow(clippy::missing_errors_doc)]
pub trait Repository: Send + Sync + 'static {
    /// Stored entries, newest first.
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn write_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub time: String,
    #[serde(with = "LevelDef")]
    pub level: Level,
    pub message: String,
}

impl Entry {
    #[must_use]
    pub fn now(level: Level, message: String) -> Self {
        Self {
            time: Local::now().format("%b %d %H:%M:%S").to_string(),
            level,
            message,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Level")]
enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Add `entry` as newest entry and drop the oldest entries exceeding [`MAX_ENTRIES`].
pub fn push_entry(entries: &mut VecDeque<Entry>, entry: Entry) {
    entries.push_front(entry);
    entries.truncate(MAX_ENTRIES);
}

static LOGGER: Logger = Logger;

/// Install a logger that writes to the browser console and persists entries in `repository`.
///
/// # Errors
///
/// Returns an error if a logger has already been installed.
pub fn init(repository: Arc<dyn Repository>, level: LevelFilter) -> Result<(), SetLoggerError> {
    if let Ok(mut log) = LOG.lock() {
        *log = Some(repository);
    }
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Ok(log) = LOG.lock() else {
            return;
        };
        if let Some(repository) = log.as_ref() {
            let message = format!("[{}] {}", record.target(), record.args());
            match record.level() {
                Level::Error => gloo_console::error!(&message),
                Level::Warn => gloo_console::warn!(&message),
                Level::Info => gloo_console::info!(&message),
                Level::Debug | Level::Trace => gloo_console::debug!(&message),
            }
            let _ = repository.write_entry(Entry::now(record.level(), message));
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn entry(message: &str) -> Entry {
        Entry {
            time: "Jan 05 07:30:00".to_string(),
            level: Level::Warn,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_entry_serde() {
        let value = json!(entry("skipping workout 2 in workouts: record has no date"));

        assert_eq!(
            value,
            json!({
                "time": "Jan 05 07:30:00",
                "level": "Warn",
                "message": "skipping workout 2 in workouts: record has no date"
            })
        );
        assert_eq!(
            serde_json::from_value::<Entry>(value).unwrap(),
            entry("skipping workout 2 in workouts: record has no date")
        );
    }

    #[test]
    fn test_push_entry() {
        let mut entries = VecDeque::new();

        for i in 0..=MAX_ENTRIES {
            push_entry(&mut entries, entry(&i.to_string()));
        }

        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(entries.front(), Some(&entry(&MAX_ENTRIES.to_string())));
        assert_eq!(entries.back(), Some(&entry("1")));
    }
}
