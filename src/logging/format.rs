//! Log setup and JSON-lines output: one JSON object per line.

use crate::detector::Verdict;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// A verdict as written by the batch scorer.
#[derive(Serialize)]
pub struct ScoreRecord<'a> {
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub verdict: &'a Verdict,
}

/// A URL that could not be scored.
#[derive(Serialize)]
pub struct ScoreFailure<'a> {
    pub ts: DateTime<Utc>,
    pub url: &'a str,
    pub kind: &'a str,
    pub error: String,
}

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber, writing to stderr so stdout stays free
    /// for records. RUST_LOG overrides `default_level`. A second call is a no-op.
    pub fn init(json: bool, default_level: &str) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        let result = if json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(fmt).try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
        };
        if let Err(e) = result {
            tracing::debug!(error = %e, "global subscriber already installed");
        }
    }

    /// Write `event` as a single JSON line, bypassing tracing.
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(w, "{}", line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::Label;

    #[test]
    fn score_record_is_one_flat_line() {
        let v = Verdict::new("http://bit.ly/x", Label::Safe, [0.25, 0.75]);
        let rec = ScoreRecord {
            ts: Utc::now(),
            verdict: &v,
        };
        let mut out = Vec::new();
        StructuredLogger::emit_json(&rec, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["prediction"], "safe");
        assert_eq!(value["url"], "http://bit.ly/x");
        assert!(value["ts"].is_string());
    }

    #[test]
    fn init_twice_does_not_panic() {
        StructuredLogger::init(false, "warn");
        StructuredLogger::init(true, "info");
    }
}
