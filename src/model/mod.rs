//! Trained sub-models: domain embedder, categorical encoders, ensemble classifier, bundle.

mod bundle;
mod embedding;
mod encoder;
mod ensemble;

pub use bundle::{BundleManifest, ModelBundle};
pub use embedding::CharEmbedding;
pub use encoder::{LabelEncoder, TldEncoder, UNSEEN};
pub use ensemble::{
    BaseEstimator, DecisionTree, EnsembleModel, GradientBoosting, LogisticRegression, RandomForest,
    StackingClassifier, TreeNode,
};

use crate::error::Result;

/// Text → fixed-width vector. Never fails: unknown input embeds to zeros.
pub trait Embedder: Send + Sync {
    fn vector_size(&self) -> usize;
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Category → vocabulary index, [`UNSEEN`] for values not seen in training.
pub trait CategoricalEncoder: Send + Sync {
    fn encode(&self, value: &str) -> i64;
}

/// Two-class probabilistic classifier over a fixed-width row.
pub trait Classifier: Send + Sync {
    fn n_features(&self) -> usize;

    /// `[p(class 0), p(class 1)]`. Errors when `x` has the wrong width.
    fn predict_proba(&self, x: &[f32]) -> Result<[f64; 2]>;

    fn predict(&self, x: &[f32]) -> Result<usize> {
        Ok(argmax(&self.predict_proba(x)?))
    }
}

/// Index of the larger probability; ties go to class 0.
pub fn argmax(p: &[f64; 2]) -> usize {
    if p[1] > p[0] {
        1
    } else {
        0
    }
}
