//! Versioned word lists and pattern rules consumed by the extractor.
//!
//! Changing any list changes the model input, so a lexicon edit must ship
//! together with a retrained bundle. The `version` string exists to make
//! that pairing visible in logs.

use crate::error::{DetectorError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One typosquat/homograph heuristic applied to the netloc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MisspellingRule {
    Regex(String),
    /// A run of at least this many identical characters.
    RepeatedChar(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub version: String,
    pub suspicious_keywords: Vec<String>,
    pub suspicious_tlds: Vec<String>,
    pub shortener_domains: Vec<String>,
    /// Every occurrence of each of these characters is counted.
    pub special_chars: String,
    /// Paths strictly longer than this set `long_path`.
    pub long_path_threshold: usize,
    pub misspelling_rules: Vec<MisspellingRule>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        let rx = |p: &str| MisspellingRule::Regex(p.to_string());
        Self {
            version: "2024.1".to_string(),
            suspicious_keywords: strings(&[
                "login", "verify", "update", "account", "secure", "banking", "signin", "confirm",
                "password", "credential", "security",
            ]),
            suspicious_tlds: strings(&[".tk", ".ml", ".ga", ".cf", ".gq", ".xyz"]),
            shortener_domains: strings(&[
                "bit.ly", "tinyurl.com", "goo.gl", "t.co", "ow.ly", "is.gd", "buff.ly", "adf.ly",
            ]),
            special_chars: "@#$%^&*()+=[]{}|;:,.<>?".to_string(),
            long_path_threshold: 50,
            misspelling_rules: vec![
                rx("0{1,}o"),
                rx("1{1,}l"),
                rx("3{1,}e"),
                rx("1{1,}i"),
                MisspellingRule::RepeatedChar(3),
                rx("faecbook"),
                rx("gogle"),
                rx("(o{2,}|g{2,}|e{2,})"),
                rx("ht{1,}://"),
                rx("g{2,}le"),
                rx("fa{2,}cebook"),
                rx("0o{1,}gle"),
                rx("t{1,}witter"),
            ],
        }
    }
}

impl Lexicon {
    /// Unset fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bad = |e: &dyn std::fmt::Display| {
            DetectorError::Configuration(format!("lexicon {}: {e}", path.display()))
        };
        let data = std::fs::read_to_string(path).map_err(|e| bad(&e))?;
        serde_json::from_str(&data).map_err(|e| bad(&e))
    }

    pub fn compile(&self) -> Result<CompiledLexicon> {
        let rules = self
            .misspelling_rules
            .iter()
            .map(|rule| match rule {
                MisspellingRule::Regex(pattern) => Regex::new(pattern)
                    .map(Matcher::Regex)
                    .map_err(|e| DetectorError::Configuration(format!("bad misspelling pattern {pattern:?}: {e}"))),
                MisspellingRule::RepeatedChar(n) if *n >= 2 => Ok(Matcher::RepeatedChar(*n)),
                MisspellingRule::RepeatedChar(n) => Err(DetectorError::Configuration(format!(
                    "repeated_char rule needs a run length of at least 2, got {n}"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CompiledLexicon {
            lexicon: self.clone(),
            rules,
        })
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),
    RepeatedChar(usize),
}

impl Matcher {
    fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Regex(re) => re.is_match(text),
            Matcher::RepeatedChar(n) => has_run(text, *n),
        }
    }
}

/// True when `text` contains `n` consecutive identical characters
/// (newlines never start or extend a run).
fn has_run(text: &str, n: usize) -> bool {
    let mut prev = None;
    let mut run = 0;
    for c in text.chars() {
        if c == '\n' {
            prev = None;
            run = 0;
            continue;
        }
        if Some(c) == prev {
            run += 1;
        } else {
            prev = Some(c);
            run = 1;
        }
        if run >= n {
            return true;
        }
    }
    false
}

/// A [`Lexicon`] with its patterns compiled, ready for the extractor.
#[derive(Debug, Clone)]
pub struct CompiledLexicon {
    lexicon: Lexicon,
    rules: Vec<Matcher>,
}

impl CompiledLexicon {
    pub fn source(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn count_special_chars(&self, text: &str) -> usize {
        text.chars().filter(|c| self.lexicon.special_chars.contains(*c)).count()
    }

    pub fn count_keywords(&self, text: &str) -> usize {
        self.lexicon
            .suspicious_keywords
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .count()
    }

    pub fn has_suspicious_tld(&self, netloc: &str) -> bool {
        self.lexicon.suspicious_tlds.iter().any(|t| netloc.ends_with(t.as_str()))
    }

    pub fn is_shortener(&self, netloc: &str) -> bool {
        self.lexicon.shortener_domains.iter().any(|d| d == netloc)
    }

    pub fn is_misspelled(&self, netloc: &str) -> bool {
        self.rules.iter().any(|r| r.is_match(netloc))
    }

    pub fn is_long_path(&self, path_len: usize) -> bool {
        path_len > self.lexicon.long_path_threshold
    }
}
