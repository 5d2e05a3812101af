//! Trace event types and severity levels

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trace severity levels, ordered most severe first
///
/// A sink with a severity floor persists an event iff
/// `event.severity <= floor`; an `Off` floor admits nothing. Events
/// themselves are never created at `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Floor value that admits no events
    Off = 0,
    /// Error: a component failed
    Error = 1,
    /// Warning: notable condition, server keeps running
    Warning = 2,
    /// Info: lifecycle messages
    Info = 3,
    /// Verbose: everything, including debug detail
    Verbose = 4,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Off => write!(f, "OFF"),
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Info => write!(f, "INFO"),
            Severity::Verbose => write!(f, "VERBOSE"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Severity::Off),
            "error" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            "verbose" | "debug" => Ok(Severity::Verbose),
            other => Err(format!("Unknown severity: {}", other)),
        }
    }
}

/// A single trace event
///
/// Created on any notable occurrence and never mutated afterwards; every
/// registered sink sees the same event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Severity of the event
    pub severity: Severity,

    /// Numeric event code
    pub code: u32,

    /// Event message
    pub message: String,

    /// Timestamp when the event was created
    pub timestamp: DateTime<Utc>,
}

impl TraceEvent {
    /// Create a new trace event stamped with the current time
    pub fn new(severity: Severity, code: u32, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Format as human-readable string
    pub fn to_human_readable(&self) -> String {
        let timestamp = self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        format!(
            "{} {} [{}] {}",
            timestamp, self.severity, self.code, self.message
        )
    }
}
