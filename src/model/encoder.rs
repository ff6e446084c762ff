//! Vocabulary encoders: sorted-unique classes, index = position.

use super::CategoricalEncoder;
use crate::error::{DetectorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Index returned for a value absent from the fitted vocabulary.
pub const UNSEEN: i64 = -1;

fn sorted_unique<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| v.as_ref().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn check_sorted_unique(classes: &[String]) -> std::result::Result<(), String> {
    match classes.windows(2).find(|w| w[0] >= w[1]) {
        Some(w) => Err(format!("classes not strictly sorted at {:?} / {:?}", w[0], w[1])),
        None => Ok(()),
    }
}

/// Public suffix → integer index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TldEncoder {
    classes: Vec<String>,
}

impl TryFrom<Vec<String>> for TldEncoder {
    type Error = String;

    fn try_from(classes: Vec<String>) -> std::result::Result<Self, Self::Error> {
        check_sorted_unique(&classes)?;
        Ok(Self { classes })
    }
}

impl From<TldEncoder> for Vec<String> {
    fn from(e: TldEncoder) -> Self {
        e.classes
    }
}

impl TldEncoder {
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            classes: sorted_unique(values),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl CategoricalEncoder for TldEncoder {
    fn encode(&self, value: &str) -> i64 {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .map(|i| i as i64)
            .unwrap_or(UNSEEN)
    }
}

/// Training label ↔ class index. A usable bundle has exactly two classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl TryFrom<Vec<String>> for LabelEncoder {
    type Error = String;

    fn try_from(classes: Vec<String>) -> std::result::Result<Self, Self::Error> {
        check_sorted_unique(&classes)?;
        Ok(Self { classes })
    }
}

impl From<LabelEncoder> for Vec<String> {
    fn from(e: LabelEncoder) -> Self {
        e.classes
    }
}

impl LabelEncoder {
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            classes: sorted_unique(labels),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, label: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| DetectorError::Processing(format!("label {label:?} not in {:?}", self.classes)))
    }

    pub fn inverse(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }
}
