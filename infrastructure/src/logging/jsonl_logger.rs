//! JSONL file writer for run events.
//!
//! Each [`ConversationEvent`] becomes one JSON line carrying `type`,
//! `timestamp` and a per-file `line` counter, merged with the payload.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use taskforce_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use tracing::warn;

struct Sink {
    writer: BufWriter<File>,
    lines: u64,
}

/// Conversation logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex`. Flushes after every line and on `Drop`.
pub struct JsonlConversationLogger {
    sink: Mutex<Sink>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Create (truncate) the log at `path`, creating parent directories.
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Self::open(path.as_ref(), false)
    }

    /// Append to the log at `path`, so several runs share one file.
    pub fn append(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Self::open(path.as_ref(), true)
    }

    fn open(path: &Path, append: bool) -> std::io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)?;

        Ok(Self {
            sink: Mutex::new(Sink {
                writer: BufWriter::new(file),
                lines: 0,
            }),
            path: path.to_path_buf(),
        })
    }

    /// Like [`Self::create`], but logs a warning and returns `None` on failure.
    pub fn try_create(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        match Self::create(path) {
            Ok(logger) => Some(logger),
            Err(e) => {
                warn!("Could not create conversation log {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: ConversationEvent, line: u64) -> Value {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut map = match event.payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        map.insert("type".to_string(), Value::String(event.event_type.to_string()));
        map.insert("timestamp".to_string(), Value::String(timestamp));
        map.insert("line".to_string(), Value::from(line));
        Value::Object(map)
    }
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };
        sink.lines += 1;
        let record = Self::record(event, sink.lines);
        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };
        let _ = writeln!(sink.writer, "{}", line);
        let _ = sink.writer.flush();
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        if let Ok(mut sink) = self.sink.lock() {
            let _ = sink.writer.flush();
        }
    }
}
