//! Trace sink trait and the standard sink set
//!
//! A sink is a destination that durably records trace output, with its own
//! format and severity floor. Sinks are synchronous: trace volume is low and
//! every sink sits behind the hub's lock, so buffered `std::fs` writes are
//! the right tool here.

use crate::trace::event::{Severity, TraceEvent};
use crate::trace::json::JsonFileSink;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Capability interface every trace destination implements
///
/// The hub drives the lifecycle: sinks are opened before the server starts,
/// written many times, and closed when the hub closes.
pub trait TraceSink: Send {
    /// Minimum severity this sink persists
    fn floor(&self) -> Severity;

    /// Whether this sink accepts the event
    fn accepts(&self, event: &TraceEvent) -> bool {
        event.severity <= self.floor()
    }

    /// Persist the event
    fn record(&mut self, event: &TraceEvent) -> io::Result<()>;

    /// Flush buffered output to the backing store
    fn flush(&mut self) -> io::Result<()>;

    /// Flush and release the sink; further records are undefined
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// Sink that writes human-readable lines to stdout
pub struct ConsoleSink {
    floor: Severity,
}

impl ConsoleSink {
    /// Create a console sink with the given severity floor
    pub fn new(floor: Severity) -> Self {
        Self { floor }
    }
}

impl TraceSink for ConsoleSink {
    fn floor(&self) -> Severity {
        self.floor
    }

    fn record(&mut self, event: &TraceEvent) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", event.to_human_readable())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}

/// Append-only plain-text log sink
pub struct TextFileSink {
    floor: Severity,
    writer: BufWriter<File>,
}

impl TextFileSink {
    /// Open (or create) the log file in append mode
    pub fn create<P: AsRef<Path>>(path: P, floor: Severity) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            floor,
            writer: BufWriter::new(file),
        })
    }
}

impl TraceSink for TextFileSink {
    fn floor(&self) -> Severity {
        self.floor
    }

    fn record(&mut self, event: &TraceEvent) -> io::Result<()> {
        writeln!(self.writer, "{}", event.to_human_readable())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Append-only XML-fragment log sink
///
/// Writes one `<event>` element per record. The file is a fragment stream,
/// not a single rooted document.
pub struct XmlFileSink {
    floor: Severity,
    writer: BufWriter<File>,
}

impl XmlFileSink {
    /// Open (or create) the log file in append mode
    pub fn create<P: AsRef<Path>>(path: P, floor: Severity) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            floor,
            writer: BufWriter::new(file),
        })
    }
}

impl TraceSink for XmlFileSink {
    fn floor(&self) -> Severity {
        self.floor
    }

    fn record(&mut self, event: &TraceEvent) -> io::Result<()> {
        writeln!(
            self.writer,
            r#"<event timestamp="{}" severity="{}" code="{}">{}</event>"#,
            event.timestamp.to_rfc3339(),
            event.severity,
            event.code,
            escape_xml(&event.message)
        )
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Sink that forwards events to the operator's event channel via the
/// [`log`] facade
///
/// Whatever logger the host process installed (journald, syslog, a plain
/// env logger) receives the event; the sink itself holds no state.
pub struct EventLogSink {
    floor: Severity,
}

impl EventLogSink {
    /// Create an event-log sink that forwards everything
    pub fn new() -> Self {
        Self {
            floor: Severity::Verbose,
        }
    }
}

impl Default for EventLogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceSink for EventLogSink {
    fn floor(&self) -> Severity {
        self.floor
    }

    fn record(&mut self, event: &TraceEvent) -> io::Result<()> {
        match event.severity {
            Severity::Error => log::error!("[{}] {}", event.code, event.message),
            Severity::Warning => log::warn!("[{}] {}", event.code, event.message),
            Severity::Info => log::info!("[{}] {}", event.code, event.message),
            Severity::Verbose => log::debug!("[{}] {}", event.code, event.message),
            Severity::Off => {}
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        log::logger().flush();
        Ok(())
    }
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Build the standard sink set in the working directory
///
/// Console and event-log sinks are ungated; the text and XML logs persist
/// Warning and above; the JSON document log is ungated. File names are fixed:
/// `TraceTCPServer.txt`, `TraceTCPServer.xml`, `TraceTCPServer.json`.
pub fn default_sinks() -> io::Result<Vec<Box<dyn TraceSink>>> {
    Ok(vec![
        Box::new(ConsoleSink::new(Severity::Verbose)),
        Box::new(TextFileSink::create("TraceTCPServer.txt", Severity::Warning)?),
        Box::new(XmlFileSink::create("TraceTCPServer.xml", Severity::Warning)?),
        Box::new(EventLogSink::new()),
        Box::new(JsonFileSink::create("TraceTCPServer.json")?),
    ])
}
