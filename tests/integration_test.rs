//! Integration test: extraction examples, predict invariants, bundle persistence, readiness.

use phishguard::{
    config::DetectorConfig,
    features::{feature_names, UrlFeatureExtractor, ENCODED_PREFIX_WIDTH},
    model::{
        BaseEstimator, CharEmbedding, DecisionTree, EnsembleModel, GradientBoosting, LabelEncoder,
        LogisticRegression, ModelBundle, RandomForest, StackingClassifier, TldEncoder, TreeNode,
    },
    Detector, ErrorKind, Label,
};
use std::path::Path;
use std::sync::Arc;

const VECTOR_SIZE: usize = 100;
const WIDTH: usize = ENCODED_PREFIX_WIDTH + VECTOR_SIZE;
const KEYWORDS: usize = 6;
const SUSPICIOUS_TLD: usize = 7;

fn stump(feature: usize, threshold: f64, left: Vec<f64>, right: Vec<f64>) -> DecisionTree {
    DecisionTree::new(vec![
        TreeNode::Split {
            feature,
            threshold,
            left: 1,
            right: 2,
        },
        TreeNode::Leaf { value: left },
        TreeNode::Leaf { value: right },
    ])
}

fn embedding() -> CharEmbedding {
    let pairs = ('a'..='z')
        .chain('0'..='9')
        .chain(['-'])
        .map(|c| {
            let v: Vec<f32> = (0..VECTOR_SIZE)
                .map(|i| ((c as usize * (i + 1)) % 7) as f32 / 7.0)
                .collect();
            (c, v)
        })
        .collect();
    CharEmbedding::from_pairs(VECTOR_SIZE, pairs).unwrap()
}

fn classifier(n_features: usize) -> EnsembleModel {
    EnsembleModel::Stacking(StackingClassifier {
        estimators: vec![
            BaseEstimator::RandomForest(RandomForest {
                n_features,
                trees: vec![
                    stump(KEYWORDS, 0.5, vec![1.0, 9.0], vec![8.0, 2.0]),
                    DecisionTree::constant(vec![5.0, 5.0]),
                ],
            }),
            BaseEstimator::GradientBoosting(GradientBoosting {
                n_features,
                learning_rate: 1.0,
                init_score: 0.0,
                trees: vec![stump(SUSPICIOUS_TLD, 0.5, vec![2.0], vec![-2.0])],
            }),
        ],
        final_estimator: LogisticRegression {
            coef: vec![3.0, 3.0],
            intercept: -3.0,
        },
    })
}

fn bundle_with_width(n_features: usize) -> ModelBundle {
    ModelBundle::new(
        embedding(),
        TldEncoder::fit(["com", "org", "ly", "co.uk", "tk"]),
        LabelEncoder::fit(["phishing", "safe"]),
        classifier(n_features),
    )
    .unwrap()
}

fn ready_detector() -> Detector {
    Detector::with_bundle(UrlFeatureExtractor::with_defaults().unwrap(), bundle_with_width(WIDTH))
}

#[test]
fn config_load_default() {
    let c = DetectorConfig::load(Path::new("nonexistent.json"));
    assert_eq!(c.features.vector_size, 100);
    assert_eq!(c.lexicon.long_path_threshold, 50);
    assert!(c.suffix_list_path.is_none());
}

#[test]
fn shortener_example() {
    let d = ready_detector();
    let f = d.extract_features("http://bit.ly/abc123").unwrap();
    assert_eq!(f.is_shortened_url, 1);
    assert_eq!(f.is_https, 0);
    assert_eq!(f.domain_name, "bit");
    assert_eq!(f.tld, "ly");
}

#[test]
fn keyword_and_hyphen_example() {
    let d = ready_detector();
    let f = d.extract_features("https://secure-login.paypa1.com/verify").unwrap();
    assert!(f.suspicious_keyword_count >= 2);
    assert_eq!(f.has_hyphens_in_domain, 1);
    assert_eq!(f.is_https, 1);
}

#[test]
fn ip_host_example() {
    let d = ready_detector();
    let f = d.extract_features("http://192.168.0.1/login").unwrap();
    assert_eq!(f.is_ip_address, 1);
    assert_eq!(f.uses_ip_in_url, 1);
}

#[test]
fn suspicious_tld_example() {
    let d = ready_detector();
    assert_eq!(d.extract_features("http://example.xyz").unwrap().has_suspicious_tld, 1);
}

#[test]
fn bare_word_still_extracts() {
    let d = ready_detector();
    let f = d.extract_features("notaurl").unwrap();
    assert_eq!(f.domain_length, 0);
    assert_eq!(f.is_https, 0);
    assert_eq!(f.query_param_count, 0);
    assert_eq!(f.fragment_length, 0);
    assert_eq!(f.tld, "");
}

#[test]
fn dotless_host_has_negative_subdomain_count() {
    let d = ready_detector();
    let f = d.extract_features("http://localhost/admin").unwrap();
    assert_eq!(f.subdomain_count, -1);
    let row = d.encode("http://localhost/admin").unwrap();
    assert_eq!(row.as_slice()[14], -1.0);
}

#[test]
fn predict_labels_and_invariants() {
    let d = ready_detector();
    let phish = d.predict("http://secure-login.example.tk/verify").unwrap();
    assert_eq!(phish.label, Label::Phishing);
    assert!(phish.is_phishing);

    let safe = d.predict("https://www.example.com/").unwrap();
    assert_eq!(safe.label, Label::Safe);
    assert!(!safe.is_phishing);

    for v in [&phish, &safe] {
        assert!((v.probability_phishing + v.probability_safe - 1.0).abs() < 1e-9);
        assert_eq!(v.confidence, v.probability_phishing.max(v.probability_safe));
    }
}

#[test]
fn predict_is_deterministic() {
    let d = ready_detector();
    let url = "https://accounts.g00gle-verify.xyz/signin?next=%2Fhome#x";
    let a = d.predict(url).unwrap();
    let b = d.predict(url).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.probability_safe.to_bits(), b.probability_safe.to_bits());
}

#[test]
fn column_layout_is_fixed() {
    let d = ready_detector();
    assert_eq!(feature_names(VECTOR_SIZE).len(), WIDTH);
    for url in ["http://bit.ly/abc123", "notaurl", "", "https://a.b.c.co.uk/x/y?z=1"] {
        let row = d.encode(url).unwrap();
        assert_eq!(row.width(), WIDTH, "{url}");
        assert_eq!(row.embedding().len(), VECTOR_SIZE);
    }
}

#[test]
fn out_of_vocabulary_inputs_fall_back() {
    let d = ready_detector();
    let row = d.encode("http://example.zz/").unwrap();
    assert_eq!(row.tld_index(), Some(-1.0));

    let row = d.encode("http://ααα.com/").unwrap();
    assert!(row.embedding().iter().all(|v| *v == 0.0));
    assert_eq!(row.tld_index(), Some(1.0));
    assert!(d.predict("http://ααα.zz/").is_ok());
}

#[test]
fn concurrent_predictions_agree() {
    let d = Arc::new(ready_detector());
    let url = "http://paypa1-login.tk/account";
    let expected = d.predict(url).unwrap();
    std::thread::scope(|s| {
        for _ in 0..4 {
            let d = Arc::clone(&d);
            let expected = expected.clone();
            s.spawn(move || {
                for _ in 0..25 {
                    assert_eq!(d.predict(url).unwrap(), expected);
                }
            });
        }
    });
}

#[test]
fn bundle_round_trip_through_detector() {
    let dir = tempfile::tempdir().unwrap();
    let url = "http://secure-login.example.tk/verify";
    let d = ready_detector();
    let before = d.predict(url).unwrap();

    for name in ["model.bundle", "model.json"] {
        let path = dir.path().join(name);
        d.save_models(&path).unwrap();

        let fresh = Detector::from_config(&DetectorConfig::default()).unwrap();
        assert!(!fresh.is_ready());
        fresh.load_models(&path).unwrap();
        assert!(fresh.is_ready());
        assert_eq!(fresh.status().bundle_id, d.status().bundle_id);
        assert_eq!(fresh.status().feature_width, Some(WIDTH));
        assert_eq!(fresh.predict(url).unwrap(), before);
    }
}

#[test]
fn incomplete_bundle_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    ready_detector().save_models(&path).unwrap();

    let mut doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    doc.as_object_mut().unwrap().remove("classifier");
    std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

    let d = Detector::new(UrlFeatureExtractor::with_defaults().unwrap());
    let err = d.load_models(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert!(err.to_string().contains("classifier"));
    assert!(!d.is_ready());
}

#[test]
fn bundle_with_foreign_column_order_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    ready_detector().save_models(&path).unwrap();

    let mut doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    doc["manifest"]["feature_names"]
        .as_array_mut()
        .unwrap()
        .reverse();
    std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

    let d = Detector::new(UrlFeatureExtractor::with_defaults().unwrap());
    let err = d.load_models(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert!(!d.is_ready());
}

#[test]
fn zero_weight_leaf_cannot_form_a_bundle() {
    let err = ModelBundle::new(
        embedding(),
        TldEncoder::fit(["com"]),
        LabelEncoder::fit(["phishing", "safe"]),
        EnsembleModel::RandomForest(RandomForest {
            n_features: WIDTH,
            trees: vec![stump(KEYWORDS, 0.5, vec![0.0, 0.0], vec![1.0, 1.0])],
        }),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn missing_artifact_is_persistence_error() {
    let d = Detector::new(UrlFeatureExtractor::with_defaults().unwrap());
    let err = d.load_models(Path::new("does-not-exist.bundle")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
}

#[test]
fn not_ready_predict_is_configuration_error() {
    let d = Detector::new(UrlFeatureExtractor::with_defaults().unwrap());
    let err = d.predict("http://bit.ly/abc123").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn width_mismatch_is_processing_error() {
    let d = Detector::with_bundle(UrlFeatureExtractor::with_defaults().unwrap(), bundle_with_width(50));
    let err = d.predict("http://bit.ly/abc123").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Processing);
}

#[test]
fn configured_vector_size_must_match_bundle() {
    let mut config = DetectorConfig::default();
    config.features.vector_size = 64;
    let d = Detector::from_config(&config).unwrap();
    let err = d.install(bundle_with_width(WIDTH)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(!d.is_ready());
}

#[test]
fn prepare_features_skips_bad_urls() {
    let d = ready_detector();
    let m = d
        .prepare_features(&["http://bit.ly/abc123", "http://[fe80::1/login", "https://example.org"])
        .unwrap();
    assert_eq!(m.dim(), (2, WIDTH));

    let err = d.prepare_features(&["http://[oops"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Processing);
}

#[test]
fn lexicon_file_swaps_lists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lexicon.json");
    std::fs::write(&path, r#"{"version":"custom","shortener_domains":["sho.rt"]}"#).unwrap();

    let config = DetectorConfig {
        lexicon_path: Some(path),
        ..DetectorConfig::default()
    };
    let d = Detector::from_config(&config).unwrap();
    assert_eq!(d.extractor().lexicon().version, "custom");
    assert_eq!(d.extract_features("http://sho.rt/x").unwrap().is_shortened_url, 1);
    assert_eq!(d.extract_features("http://bit.ly/x").unwrap().is_shortened_url, 0);
}
