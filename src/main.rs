//! PhishGuard batch scorer: loads the model bundle once, scores URLs given as
//! arguments (or one per line on stdin) and prints one JSON verdict per line.

use chrono::Utc;
use phishguard::{
    config::DetectorConfig,
    logging::{ScoreFailure, ScoreRecord, StructuredLogger},
    Detector,
};
use std::io::{BufRead, Write};
use tracing::{info, warn};

fn score_one(
    detector: &Detector,
    url: &str,
    out: &mut impl Write,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    match detector.predict(url) {
        Ok(verdict) => {
            StructuredLogger::emit_json(
                &ScoreRecord {
                    ts: Utc::now(),
                    verdict: &verdict,
                },
                out,
            )?;
            Ok(true)
        }
        Err(e) => {
            warn!(url, error = %e, "scoring failed");
            let kind = format!("{:?}", e.kind()).to_lowercase();
            StructuredLogger::emit_json(
                &ScoreFailure {
                    ts: Utc::now(),
                    url,
                    kind: &kind,
                    error: e.to_string(),
                },
                out,
            )?;
            Ok(false)
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("PHISHGUARD_CONFIG_PATH")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("phishguard.json"));
    let config = DetectorConfig::load(&config_path);

    StructuredLogger::init(config.log.json, &config.log.level);

    info!(
        model_path = %config.model_path.display(),
        lexicon_version = %config.lexicon.version,
        "PhishGuard starting"
    );

    let detector = Detector::from_config(&config)?;
    detector.load_models(&config.model_path)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let (mut scored, mut failed) = (0u64, 0u64);
    let mut tally = |ok: bool| if ok { scored += 1 } else { failed += 1 };

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        for line in std::io::stdin().lock().lines() {
            let line = line?;
            let url = line.trim();
            if url.is_empty() {
                continue;
            }
            tally(score_one(&detector, url, &mut out)?);
        }
    } else {
        for url in &args {
            tally(score_one(&detector, url, &mut out)?);
        }
    }
    out.flush()?;

    info!(scored, failed, "PhishGuard done");
    Ok(())
}
