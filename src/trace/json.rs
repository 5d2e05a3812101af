//! JSON document sink
//!
//! Keeps every message written so far in memory and rewrites the whole
//! document (`{ "traceLog": [ ... ] }`) on each write, so the backing file
//! holds at most one valid JSON document at any time. Append cost is
//! O(total accumulated size) per write; trace volume is low and the
//! always-one-valid-document property is the point, so this stays as is.

use crate::trace::event::{Severity, TraceEvent};
use crate::trace::sinks::TraceSink;
use std::io;
use std::path::{Path, PathBuf};

const DOCUMENT_HEADER: &str = "{\n\"traceLog\":\n[\n";

/// Sink that maintains a single JSON document on disk
///
/// The document is an object with every recorded message under the
/// `"traceLog"` array key.
pub struct JsonFileSink {
    path: PathBuf,
    buf: String,
}

impl JsonFileSink {
    /// Create a JSON document sink backed by the given file
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            buf: DOCUMENT_HEADER.to_string(),
        })
    }

    /// Append a partial entry and rewrite the backing file
    ///
    /// The on-disk document is not well-formed until the paired
    /// [`write_line`](Self::write_line) lands; callers must terminate every
    /// partial entry within the same logical record.
    pub fn write(&mut self, message: &str) -> io::Result<()> {
        self.buf.push_str(&encode(message)?);
        self.buf.push(':');
        std::fs::write(&self.path, &self.buf)
    }

    /// Append a terminated entry and rewrite the backing file as a
    /// well-formed document
    pub fn write_line(&mut self, message: &str) -> io::Result<()> {
        self.buf.push_str(&encode(message)?);
        self.buf.push_str(",\n");
        // Drop the trailing ",\n" so the array closes cleanly.
        let document = format!("{}\n]\n}}", &self.buf[..self.buf.len() - 2]);
        std::fs::write(&self.path, document)
    }
}

fn encode(message: &str) -> io::Result<String> {
    serde_json::to_string(message).map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

impl TraceSink for JsonFileSink {
    fn floor(&self) -> Severity {
        Severity::Verbose
    }

    fn record(&mut self, event: &TraceEvent) -> io::Result<()> {
        // One terminated entry per event keeps the persisted document valid
        // after every record.
        self.write_line(&event.to_human_readable())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Every write already rewrites the file wholesale.
        Ok(())
    }
}
