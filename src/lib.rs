//! PhishGuard: lexical phishing URL classifier.
//!
//! Modular structure:
//! - [`features`]: URL decomposition, public-suffix split, lexical feature extraction
//! - [`model`]: Character embedding, TLD/label encoders, ensemble classifier, model bundle
//! - [`storage`]: Single-file bundle artifact with checksum and atomic write
//! - [`detector`]: Detection pipeline producing a [`Verdict`] per URL
//! - [`logging`]: Structured logging and JSON-lines output

pub mod config;
pub mod detector;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod storage;

pub use config::DetectorConfig;
pub use detector::{Detector, DetectorStatus, Label, Verdict};
pub use error::{DetectorError, ErrorKind, Result};
pub use features::{EncodedFeatureVector, FeatureBag, UrlFeatureExtractor};
pub use logging::StructuredLogger;
pub use model::{Classifier, ModelBundle};
