//! The matched set of trained sub-models and its single-file persistence.

use super::{CharEmbedding, Classifier, Embedder, EnsembleModel, LabelEncoder, TldEncoder};
use crate::error::{DetectorError, Result};
use crate::features::feature_names;
use crate::storage::{read_artifact, write_artifact};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
    pub bundle_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub vector_size: usize,
    /// Column names the classifier was trained on, in order.
    pub feature_names: Vec<String>,
}

/// Embedder, TLD encoder, label encoder and classifier, always used together.
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    manifest: BundleManifest,
    embedding: CharEmbedding,
    tld_encoder: TldEncoder,
    label_encoder: LabelEncoder,
    classifier: EnsembleModel,
}

/// On-disk shape. Slots are optional so a missing one is reported by name.
#[derive(Serialize, Deserialize)]
struct BundleRecord {
    manifest: Option<BundleManifest>,
    word2vec: Option<CharEmbedding>,
    classifier: Option<EnsembleModel>,
    label_encoder: Option<LabelEncoder>,
    tld_encoder: Option<TldEncoder>,
}

fn require<T>(slot: Option<T>, name: &str, path: &Path) -> Result<T> {
    slot.ok_or_else(|| DetectorError::persistence(path, format!("bundle is missing sub-model '{name}'")))
}

impl ModelBundle {
    pub fn new(
        embedding: CharEmbedding,
        tld_encoder: TldEncoder,
        label_encoder: LabelEncoder,
        classifier: EnsembleModel,
    ) -> Result<Self> {
        let vector_size = embedding.vector_size();
        let manifest = BundleManifest {
            bundle_id: Uuid::new_v4(),
            created_at: Utc::now(),
            vector_size,
            feature_names: feature_names(vector_size),
        };
        Self::from_parts(manifest, embedding, tld_encoder, label_encoder, classifier)
    }

    fn from_parts(
        manifest: BundleManifest,
        embedding: CharEmbedding,
        tld_encoder: TldEncoder,
        label_encoder: LabelEncoder,
        classifier: EnsembleModel,
    ) -> Result<Self> {
        if label_encoder.classes().len() != 2 {
            return Err(DetectorError::Configuration(format!(
                "label encoder must have 2 classes, has {:?}",
                label_encoder.classes()
            )));
        }
        classifier
            .validate()
            .map_err(|e| DetectorError::Configuration(format!("invalid classifier: {e}")))?;
        if manifest.vector_size != embedding.vector_size() {
            return Err(DetectorError::Configuration(format!(
                "manifest vector size {} does not match embedding width {}",
                manifest.vector_size,
                embedding.vector_size()
            )));
        }
        let expected = feature_names(manifest.vector_size);
        if manifest.feature_names != expected {
            let at = manifest
                .feature_names
                .iter()
                .zip(&expected)
                .position(|(a, b)| a != b)
                .unwrap_or_else(|| manifest.feature_names.len().min(expected.len()));
            return Err(DetectorError::Configuration(format!(
                "manifest declares {} columns, expected {}; first difference at column {at}",
                manifest.feature_names.len(),
                expected.len()
            )));
        }
        Ok(Self {
            manifest,
            embedding,
            tld_encoder,
            label_encoder,
            classifier,
        })
    }

    pub fn manifest(&self) -> &BundleManifest {
        &self.manifest
    }

    pub fn embedding(&self) -> &CharEmbedding {
        &self.embedding
    }

    pub fn tld_encoder(&self) -> &TldEncoder {
        &self.tld_encoder
    }

    pub fn label_encoder(&self) -> &LabelEncoder {
        &self.label_encoder
    }

    pub fn classifier(&self) -> &EnsembleModel {
        &self.classifier
    }

    /// Width of the encoded feature vector this bundle's embedding produces.
    pub fn expected_width(&self) -> usize {
        self.manifest.feature_names.len()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let record = BundleRecord {
            manifest: Some(self.manifest.clone()),
            word2vec: Some(self.embedding.clone()),
            classifier: Some(self.classifier.clone()),
            label_encoder: Some(self.label_encoder.clone()),
            tld_encoder: Some(self.tld_encoder.clone()),
        };
        write_artifact(path, &record)?;
        tracing::info!(
            path = %path.display(),
            bundle_id = %self.manifest.bundle_id,
            "model bundle saved"
        );
        Ok(())
    }

    /// Load a complete bundle. Any missing or invalid sub-model fails the whole load.
    pub fn load(path: &Path) -> Result<Self> {
        let record: BundleRecord = read_artifact(path)?;
        let manifest = require(record.manifest, "manifest", path)?;
        let embedding = require(record.word2vec, "word2vec", path)?;
        let classifier = require(record.classifier, "classifier", path)?;
        let label_encoder = require(record.label_encoder, "label_encoder", path)?;
        let tld_encoder = require(record.tld_encoder, "tld_encoder", path)?;

        let bundle = Self::from_parts(manifest, embedding, tld_encoder, label_encoder, classifier)
            .map_err(|e| DetectorError::persistence(path, e.to_string()))?;
        tracing::info!(
            path = %path.display(),
            bundle_id = %bundle.manifest.bundle_id,
            created_at = %bundle.manifest.created_at,
            vector_size = bundle.manifest.vector_size,
            classifier_features = bundle.classifier.n_features(),
            "model bundle loaded"
        );
        Ok(bundle)
    }
}
