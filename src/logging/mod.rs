//! Structured logging (`tracing`) and JSON-lines record output.

mod format;

pub use format::{ScoreFailure, ScoreRecord, StructuredLogger};
