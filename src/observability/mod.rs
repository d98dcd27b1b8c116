//! Structured logging for the dispatch layer.

pub mod logger;

pub use logger::{Logger, Severity};
