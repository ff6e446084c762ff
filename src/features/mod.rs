//! Lexical URL feature extraction: URL string → [`FeatureBag`] → model columns.

mod extractor;
mod lexicon;
mod suffix;
mod urlparse;

pub use extractor::UrlFeatureExtractor;
pub use lexicon::{CompiledLexicon, Lexicon, MisspellingRule};
pub use suffix::{DomainParts, SuffixList};
pub use urlparse::{parse_query, split_url, UrlParts};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Numeric columns in the order the classifier was trained on. The TLD
/// index and the embedding components follow them.
pub const FEATURE_COLUMNS: [&str; 21] = [
    "url_length",
    "domain_length",
    "path_length",
    "is_https",
    "special_char_count",
    "is_ip_address",
    "suspicious_keyword_count",
    "has_suspicious_tld",
    "directory_depth",
    "query_param_count",
    "fragment_length",
    "has_subdomain",
    "domain_has_numbers",
    "query_param_length",
    "subdomain_count",
    "uses_ip_in_url",
    "long_path",
    "has_hyphens_in_domain",
    "has_at_symbol",
    "has_misspelled_domain",
    "is_shortened_url",
];

pub const TLD_COLUMN: &str = "tld_encoded";

/// Columns ahead of the embedding: the numeric features plus the TLD index.
pub const ENCODED_PREFIX_WIDTH: usize = FEATURE_COLUMNS.len() + 1;

/// Full column list for a given embedding width.
pub fn feature_names(vector_size: usize) -> Vec<String> {
    FEATURE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(std::iter::once(TLD_COLUMN.to_string()))
        .chain((0..vector_size).map(|i| format!("embedding_{i}")))
        .collect()
}

/// Lexical and structural features of one URL. Flags are 0/1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureBag {
    pub url_length: usize,
    pub domain_length: usize,
    pub path_length: usize,
    pub fragment_length: usize,

    pub is_https: u8,
    pub is_ip_address: u8,
    pub has_suspicious_tld: u8,
    pub has_subdomain: u8,
    pub domain_has_numbers: u8,
    pub uses_ip_in_url: u8,
    pub long_path: u8,
    pub has_hyphens_in_domain: u8,
    pub has_at_symbol: u8,
    pub has_misspelled_domain: u8,
    pub is_shortened_url: u8,

    pub special_char_count: usize,
    pub suspicious_keyword_count: usize,
    pub directory_depth: usize,
    pub query_param_count: usize,
    pub query_param_length: usize,
    /// Dots in the netloc minus one; -1 for a dotless host.
    pub subdomain_count: i64,

    pub domain_name: String,
    pub tld: String,
}

/// A single feature value, as exposed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Text(String),
}

impl FeatureValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FeatureValue::Int(v) => Some(*v),
            FeatureValue::Text(_) => None,
        }
    }
}

impl FeatureBag {
    /// The 21 numeric columns, in [`FEATURE_COLUMNS`] order.
    pub fn numeric_columns(&self) -> [i64; 21] {
        [
            self.url_length as i64,
            self.domain_length as i64,
            self.path_length as i64,
            self.is_https as i64,
            self.special_char_count as i64,
            self.is_ip_address as i64,
            self.suspicious_keyword_count as i64,
            self.has_suspicious_tld as i64,
            self.directory_depth as i64,
            self.query_param_count as i64,
            self.fragment_length as i64,
            self.has_subdomain as i64,
            self.domain_has_numbers as i64,
            self.query_param_length as i64,
            self.subdomain_count,
            self.uses_ip_in_url as i64,
            self.long_path as i64,
            self.has_hyphens_in_domain as i64,
            self.has_at_symbol as i64,
            self.has_misspelled_domain as i64,
            self.is_shortened_url as i64,
        ]
    }

    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        match name {
            "domain_name" => Some(FeatureValue::Text(self.domain_name.clone())),
            "tld" => Some(FeatureValue::Text(self.tld.clone())),
            _ => FEATURE_COLUMNS
                .iter()
                .position(|c| *c == name)
                .map(|i| FeatureValue::Int(self.numeric_columns()[i])),
        }
    }

    /// Name → value view of every feature.
    pub fn to_map(&self) -> BTreeMap<&'static str, FeatureValue> {
        let mut map: BTreeMap<&'static str, FeatureValue> = FEATURE_COLUMNS
            .iter()
            .zip(self.numeric_columns())
            .map(|(name, v)| (*name, FeatureValue::Int(v)))
            .collect();
        map.insert("domain_name", FeatureValue::Text(self.domain_name.clone()));
        map.insert("tld", FeatureValue::Text(self.tld.clone()));
        map
    }
}

/// Fixed-order model input: numeric columns, TLD index, embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedFeatureVector {
    pub values: Vec<f32>,
}

impl EncodedFeatureVector {
    pub fn width(&self) -> usize {
        self.values.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn tld_index(&self) -> Option<f32> {
        self.values.get(FEATURE_COLUMNS.len()).copied()
    }

    pub fn embedding(&self) -> &[f32] {
        self.values.get(ENCODED_PREFIX_WIDTH..).unwrap_or(&[])
    }
}
