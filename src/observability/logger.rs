//! Structured JSON logger.
//!
//! - One log line = one event
//! - Synchronous, no buffering
//! - Deterministic key ordering (fields sorted alphabetically)
//! - Explicit severity levels

use std::fmt;
use std::io::{self, Write};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Normal operations
    Info = 0,
    /// Recoverable issues
    Warn = 1,
    /// Per-request failures
    Error = 2,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured logger that writes one JSON object per line.
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields to stdout
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let _ = Self::log_to_writer(severity, event, fields, &mut io::stdout());
    }

    /// Log an error-severity event to stderr
    pub fn error(event: &str, fields: &[(&str, &str)]) {
        let _ = Self::log_to_writer(Severity::Error, event, fields, &mut io::stderr());
    }

    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        out: &mut W,
    ) -> io::Result<()> {
        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(key, _)| *key);

        let mut line = String::new();
        line.push_str("{\"severity\":");
        line.push_str(&escape(severity.as_str()));
        line.push_str(",\"event\":");
        line.push_str(&escape(event));
        for (key, value) in sorted {
            line.push(',');
            line.push_str(&escape(key));
            line.push(':');
            line.push_str(&escape(value));
        }
        line.push('}');

        writeln!(out, "{}", line)
    }
}

fn escape(s: &str) -> String {
    serde_json::to_string(s).expect("JSON string escaping cannot fail")
}
