//! Multi-sink trace pipeline
//!
//! A [`TraceHub`] fans each [`TraceEvent`] out to every registered
//! [`TraceSink`](sinks::TraceSink) whose severity floor admits it. Sinks are
//! injected by the caller, so tests can wire an in-memory sink instead of
//! the standard file set.

pub mod event;
pub mod json;
pub mod sinks;

pub use event::{Severity, TraceEvent};
pub use json::JsonFileSink;
pub use sinks::{ConsoleSink, EventLogSink, TextFileSink, TraceSink, XmlFileSink};

use parking_lot::Mutex;

struct HubInner {
    sinks: Vec<Box<dyn TraceSink>>,
    closed: bool,
}

/// Fans trace events out to a set of sinks and owns their lifecycle
///
/// The hub applies a source-level severity switch before any per-sink floor.
/// Sink write failures are isolated: a failing sink never prevents delivery
/// to the sinks after it, and the failure itself is reported as an Error
/// event to the sinks that stayed healthy (or silently dropped if none did).
pub struct TraceHub {
    switch: Severity,
    inner: Mutex<HubInner>,
}

impl TraceHub {
    /// Create a hub with a source-level switch and an ordered sink list
    pub fn new(switch: Severity, sinks: Vec<Box<dyn TraceSink>>) -> Self {
        Self {
            switch,
            inner: Mutex::new(HubInner {
                sinks,
                closed: false,
            }),
        }
    }

    /// Deliver an event to every accepting sink, in registration order
    ///
    /// Each delivery is followed by a flush so sinks stay durable between
    /// events. Failures never propagate to the caller.
    pub fn record(&self, event: &TraceEvent) {
        if event.severity > self.switch {
            return;
        }

        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }

        let mut failures: Vec<(usize, std::io::Error)> = Vec::new();
        for (index, sink) in inner.sinks.iter_mut().enumerate() {
            if !sink.accepts(event) {
                continue;
            }
            if let Err(e) = sink.record(event).and_then(|_| sink.flush()) {
                failures.push((index, e));
            }
        }

        // Report each failure to the sinks that did not fail. One pass, no
        // recursion; if the report itself fails it is dropped.
        for (failed_index, error) in failures {
            let report = TraceEvent::new(
                Severity::Error,
                512,
                format!("Trace sink {} write failed: {}", failed_index, error),
            );
            for (index, sink) in inner.sinks.iter_mut().enumerate() {
                if index == failed_index || !sink.accepts(&report) {
                    continue;
                }
                let _ = sink.record(&report).and_then(|_| sink.flush());
            }
        }
    }

    /// Record an Info event
    pub fn info(&self, code: u32, message: impl Into<String>) {
        self.record(&TraceEvent::new(Severity::Info, code, message));
    }

    /// Record a Warning event
    pub fn warning(&self, code: u32, message: impl Into<String>) {
        self.record(&TraceEvent::new(Severity::Warning, code, message));
    }

    /// Record an Error event
    pub fn error(&self, code: u32, message: impl Into<String>) {
        self.record(&TraceEvent::new(Severity::Error, code, message));
    }

    /// Flush and close every sink; idempotent
    ///
    /// Events recorded after close are dropped.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }
        for sink in inner.sinks.iter_mut() {
            let _ = sink.close();
        }
        inner.closed = true;
    }

    /// Whether the hub has been closed
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}
