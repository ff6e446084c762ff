//! Detector configuration. Lists that feed the model live in `lexicon`.

use crate::features::Lexicon;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Model bundle artifact
    pub model_path: PathBuf,
    /// Feature assembly parameters
    pub features: FeaturesConfig,
    /// Keyword / TLD / shortener lists and misspelling rules
    pub lexicon: Lexicon,
    /// Lexicon JSON file; replaces `lexicon` when set
    pub lexicon_path: Option<PathBuf>,
    /// Public Suffix List file; the bundled ICANN snapshot is used when unset
    pub suffix_list_path: Option<PathBuf>,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Width of the domain embedding the bundle must provide
    pub vector_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("phishing_detector.bundle"),
            features: FeaturesConfig::default(),
            lexicon: Lexicon::default(),
            lexicon_path: None,
            suffix_list_path: None,
            log: LogConfig::default(),
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self { vector_size: 100 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl DetectorConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str::<DetectorConfig>(&data) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "invalid config; using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable config; using defaults");
                Self::default()
            }
        }
    }
}
