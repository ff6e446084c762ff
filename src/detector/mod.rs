//! Detection pipeline: URL → features → encoded row → classifier → [`Verdict`].
//!
//! A [`Detector`] is constructed explicitly and starts either empty (not
//! ready) or with a bundle. Installing a bundle swaps an `Arc`, so in-flight
//! predictions keep the bundle they started with.

mod assembly;
mod verdict;

pub use assembly::assemble;
pub use verdict::{Label, Verdict};

use crate::config::DetectorConfig;
use crate::error::{DetectorError, Result};
use crate::features::{EncodedFeatureVector, FeatureBag, UrlFeatureExtractor};
use crate::model::{argmax, Classifier, Embedder, ModelBundle};
use ndarray::Array2;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectorStatus {
    pub ready: bool,
    pub bundle_id: Option<Uuid>,
    pub vector_size: Option<usize>,
    pub feature_width: Option<usize>,
}

pub struct Detector {
    extractor: UrlFeatureExtractor,
    /// Embedding width a bundle must have to be installed; unchecked when `None`.
    expected_vector_size: Option<usize>,
    bundle: RwLock<Option<Arc<ModelBundle>>>,
}

impl Detector {
    pub fn new(extractor: UrlFeatureExtractor) -> Self {
        Self {
            extractor,
            expected_vector_size: None,
            bundle: RwLock::new(None),
        }
    }

    pub fn with_bundle(extractor: UrlFeatureExtractor, bundle: ModelBundle) -> Self {
        Self {
            extractor,
            expected_vector_size: None,
            bundle: RwLock::new(Some(Arc::new(bundle))),
        }
    }

    /// Extractor built from the config's lexicon and suffix list; no bundle yet.
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        let mut detector = Self::new(UrlFeatureExtractor::from_config(config)?);
        detector.expected_vector_size = Some(config.features.vector_size);
        Ok(detector)
    }

    pub fn extractor(&self) -> &UrlFeatureExtractor {
        &self.extractor
    }

    fn current(&self) -> Option<Arc<ModelBundle>> {
        self.bundle.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn ready_bundle(&self) -> Result<Arc<ModelBundle>> {
        self.current().ok_or_else(|| {
            DetectorError::Configuration("models not loaded; load a bundle first".to_string())
        })
    }

    pub fn is_ready(&self) -> bool {
        self.current().is_some()
    }

    pub fn status(&self) -> DetectorStatus {
        let bundle = self.current();
        DetectorStatus {
            ready: bundle.is_some(),
            bundle_id: bundle.as_ref().map(|b| b.manifest().bundle_id),
            vector_size: bundle.as_ref().map(|b| b.manifest().vector_size),
            feature_width: bundle.as_ref().map(|b| b.expected_width()),
        }
    }

    /// Replace the active bundle.
    pub fn install(&self, bundle: ModelBundle) -> Result<()> {
        if let Some(expected) = self.expected_vector_size {
            let actual = bundle.embedding().vector_size();
            if actual != expected {
                return Err(DetectorError::Configuration(format!(
                    "bundle embedding width {actual} does not match configured vector_size {expected}"
                )));
            }
        }
        if bundle.classifier().n_features() != bundle.expected_width() {
            warn!(
                classifier_features = bundle.classifier().n_features(),
                feature_width = bundle.expected_width(),
                "classifier width differs from assembled feature width; predictions will fail"
            );
        }
        let id = bundle.manifest().bundle_id;
        *self.bundle.write().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(bundle));
        info!(bundle_id = %id, "detector ready");
        Ok(())
    }

    pub fn load_models(&self, path: &Path) -> Result<()> {
        self.install(ModelBundle::load(path)?)
    }

    pub fn save_models(&self, path: &Path) -> Result<()> {
        let bundle = self
            .current()
            .ok_or_else(|| DetectorError::Configuration("models not trained; nothing to save".to_string()))?;
        bundle.save(path)
    }

    /// Same extractor the model sees; safe to show to users as evidence.
    pub fn extract_features(&self, url: &str) -> Result<FeatureBag> {
        self.extractor.extract_features(url)
    }

    fn encode_with(&self, bundle: &ModelBundle, url: &str) -> Result<EncodedFeatureVector> {
        let bag = self.extractor.extract_features(url)?;
        Ok(assemble(&bag, bundle.embedding(), bundle.tld_encoder()))
    }

    /// The classifier input row for `url`.
    pub fn encode(&self, url: &str) -> Result<EncodedFeatureVector> {
        let bundle = self.ready_bundle()?;
        self.encode_with(&bundle, url)
    }

    pub fn predict(&self, url: &str) -> Result<Verdict> {
        let bundle = self.ready_bundle()?;
        let row = self.encode_with(&bundle, url)?;
        let classifier = bundle.classifier();
        if row.width() != classifier.n_features() {
            return Err(DetectorError::Processing(format!(
                "assembled {} features but classifier expects {}",
                row.width(),
                classifier.n_features()
            )));
        }

        let proba = classifier.predict_proba(row.as_slice())?;
        let class = argmax(&proba);
        let label = Label::from_index(class)
            .ok_or_else(|| DetectorError::Processing(format!("class index {class} has no label")))?;
        let verdict = Verdict::new(url, label, proba);
        debug!(
            url = %verdict.url,
            label = %verdict.label,
            confidence = verdict.confidence,
            "verdict"
        );
        Ok(verdict)
    }

    /// Encoded rows for many URLs, one row per URL that extracts cleanly.
    pub fn prepare_features<S: AsRef<str>>(&self, urls: &[S]) -> Result<Array2<f32>> {
        let bundle = self.ready_bundle()?;
        let width = bundle.expected_width();
        let mut flat = Vec::with_capacity(urls.len() * width);
        let mut rows = 0usize;
        for url in urls {
            match self.encode_with(&bundle, url.as_ref()) {
                Ok(row) => {
                    flat.extend_from_slice(row.as_slice());
                    rows += 1;
                }
                Err(e) => warn!(url = url.as_ref(), error = %e, "skipping URL"),
            }
        }
        if rows == 0 {
            return Err(DetectorError::Processing(
                "no valid features could be extracted from the URLs".to_string(),
            ));
        }
        Array2::from_shape_vec((rows, width), flat).map_err(|e| DetectorError::Processing(e.to_string()))
    }
}
