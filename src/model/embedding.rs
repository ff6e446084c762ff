//! Character-level domain embedding: mean of the vectors of known characters.

use super::Embedder;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-character vector table. Rows of `vectors` align with `tokens`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CharEmbeddingRecord", into = "CharEmbeddingRecord")]
pub struct CharEmbedding {
    tokens: Vec<char>,
    vectors: Array2<f32>,
    index: HashMap<char, usize>,
}

#[derive(Clone, Serialize, Deserialize)]
struct CharEmbeddingRecord {
    tokens: Vec<char>,
    vectors: Array2<f32>,
}

impl TryFrom<CharEmbeddingRecord> for CharEmbedding {
    type Error = String;

    fn try_from(r: CharEmbeddingRecord) -> Result<Self, Self::Error> {
        CharEmbedding::new(r.tokens, r.vectors)
    }
}

impl From<CharEmbedding> for CharEmbeddingRecord {
    fn from(e: CharEmbedding) -> Self {
        Self {
            tokens: e.tokens,
            vectors: e.vectors,
        }
    }
}

impl CharEmbedding {
    /// One row per token; tokens must be distinct.
    pub fn new(tokens: Vec<char>, vectors: Array2<f32>) -> Result<Self, String> {
        if tokens.len() != vectors.nrows() {
            return Err(format!(
                "embedding has {} tokens but {} vectors",
                tokens.len(),
                vectors.nrows()
            ));
        }
        if vectors.ncols() == 0 {
            return Err("embedding vectors have zero width".to_string());
        }
        let mut index = HashMap::with_capacity(tokens.len());
        for (i, t) in tokens.iter().enumerate() {
            if index.insert(*t, i).is_some() {
                return Err(format!("duplicate embedding token {t:?}"));
            }
        }
        Ok(Self {
            tokens,
            vectors,
            index,
        })
    }

    /// Build from `(token, vector)` pairs; every vector must have `vector_size` entries.
    pub fn from_pairs(vector_size: usize, pairs: Vec<(char, Vec<f32>)>) -> Result<Self, String> {
        let mut tokens = Vec::with_capacity(pairs.len());
        let mut flat = Vec::with_capacity(pairs.len() * vector_size);
        for (token, v) in pairs {
            if v.len() != vector_size {
                return Err(format!(
                    "vector for {token:?} has {} entries, expected {vector_size}",
                    v.len()
                ));
            }
            tokens.push(token);
            flat.extend(v);
        }
        let vectors = Array2::from_shape_vec((tokens.len(), vector_size), flat)
            .map_err(|e| e.to_string())?;
        Self::new(tokens, vectors)
    }

    pub fn vocabulary(&self) -> &[char] {
        &self.tokens
    }

    pub fn contains(&self, token: char) -> bool {
        self.index.contains_key(&token)
    }
}

impl Embedder for CharEmbedding {
    fn vector_size(&self) -> usize {
        self.vectors.ncols()
    }

    /// Mean of the vectors of every character of `text` found in the table,
    /// repeats included. Zero vector when nothing is known.
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut acc = Array1::<f32>::zeros(self.vector_size());
        let mut known = 0usize;
        for row in text.chars().filter_map(|c| self.index.get(&c)) {
            acc += &self.vectors.row(*row);
            known += 1;
        }
        if known > 0 {
            acc /= known as f32;
        }
        acc.to_vec()
    }
}
