use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed class-index → label map: 0 is phishing, 1 is safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Phishing,
    Safe,
}

impl Label {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Label::Phishing),
            1 => Some(Label::Safe),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Label::Phishing => 0,
            Label::Safe => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Phishing => "phishing",
            Label::Safe => "safe",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub url: String,
    #[serde(rename = "prediction")]
    pub label: Label,
    pub is_phishing: bool,
    /// Probability of the winning class.
    pub confidence: f64,
    pub probability_phishing: f64,
    pub probability_safe: f64,
}

impl Verdict {
    pub fn new(url: &str, label: Label, proba: [f64; 2]) -> Self {
        Self {
            url: url.to_string(),
            label,
            is_phishing: label == Label::Phishing,
            confidence: proba[0].max(proba[1]),
            probability_phishing: proba[0],
            probability_safe: proba[1],
        }
    }
}
