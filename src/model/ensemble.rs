//! Two-class tree-ensemble inference over a fixed-width `f32` feature row.
//!
//! Layout follows the usual tree-ensemble export: a flat pre-order node list
//! per tree, `x[feature] <= threshold` descends left, and feature values are
//! widened to `f64` before the comparison.

use super::Classifier;
use crate::error::{DetectorError, Result};
use serde::{Deserialize, Serialize};

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn check_width(x: &[f32], n_features: usize) -> Result<()> {
    if x.len() != n_features {
        return Err(DetectorError::Processing(format!(
            "classifier expects {n_features} features, got {}",
            x.len()
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class weights for classification trees, a single value for regression trees.
    Leaf { value: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    /// A single-leaf tree.
    pub fn constant(value: Vec<f64>) -> Self {
        Self::new(vec![TreeNode::Leaf { value }])
    }

    fn validate(&self, n_features: usize, leaf_width: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {i} splits on feature {feature} of {n_features}"));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {i} has a NaN threshold"));
                    }
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(format!("node {i} has invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } if value.len() != leaf_width => {
                    return Err(format!(
                        "leaf {i} has {} values, expected {leaf_width}",
                        value.len()
                    ));
                }
                TreeNode::Leaf { value } if value.iter().any(|v| !v.is_finite()) => {
                    return Err(format!("leaf {i} has a non-finite value"));
                }
                // Class weights must be usable as a distribution.
                TreeNode::Leaf { value } if leaf_width > 1 => {
                    if value.iter().any(|v| *v < 0.0) {
                        return Err(format!("leaf {i} has a negative class weight"));
                    }
                    if value.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("leaf {i} has no class weight"));
                    }
                }
                TreeNode::Leaf { .. } => {}
            }
        }
        Ok(())
    }

    /// Walk to the leaf for `x`. Children always point forward, so the walk ends.
    pub fn leaf(&self, x: &[f32]) -> Result<&[f64]> {
        let mut i = 0;
        loop {
            match self.nodes.get(i) {
                Some(TreeNode::Leaf { value }) => return Ok(value.as_slice()),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let v = x.get(*feature).copied().ok_or_else(|| {
                        DetectorError::Processing(format!("tree reads missing feature {feature}"))
                    })?;
                    let next = if f64::from(v) <= *threshold { *left } else { *right };
                    if next <= i {
                        return Err(DetectorError::Processing(format!("tree node {i} loops back")));
                    }
                    i = next;
                }
                None => return Err(DetectorError::Processing(format!("tree node {i} missing"))),
            }
        }
    }

    /// Class probabilities of the reached leaf (weights normalised to sum 1).
    fn class_proba(&self, x: &[f32]) -> Result<[f64; 2]> {
        let leaf = self.leaf(x)?;
        let (a, b) = match leaf {
            [a, b] => (*a, *b),
            _ => return Err(DetectorError::Processing("classification leaf is not 2-wide".to_string())),
        };
        let total = a + b;
        if total.is_nan() || total <= 0.0 {
            return Err(DetectorError::Processing("classification leaf has no class weight".to_string()));
        }
        Ok([a / total, b / total])
    }

    fn regression_value(&self, x: &[f32]) -> Result<f64> {
        match self.leaf(x)? {
            [v] => Ok(*v),
            _ => Err(DetectorError::Processing("regression leaf is not scalar".to_string())),
        }
    }
}

/// Bagged classification trees; probability is the mean over trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.trees.is_empty() {
            return Err("random forest has no trees".to_string());
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(i, t)| t.validate(self.n_features, 2).map_err(|e| format!("tree {i}: {e}")))
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, x: &[f32]) -> Result<[f64; 2]> {
        check_width(x, self.n_features)?;
        let mut sum = [0.0; 2];
        for tree in &self.trees {
            let p = tree.class_proba(x)?;
            sum[0] += p[0];
            sum[1] += p[1];
        }
        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}

/// Binary log-loss boosting: `init + learning_rate * Σ tree(x)` through a sigmoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoosting {
    pub n_features: usize,
    pub learning_rate: f64,
    /// Raw score before any stage (log-odds of the positive class prior).
    pub init_score: f64,
    pub trees: Vec<DecisionTree>,
}

impl GradientBoosting {
    fn validate(&self) -> std::result::Result<(), String> {
        if !self.learning_rate.is_finite() || !self.init_score.is_finite() {
            return Err("gradient boosting parameters must be finite".to_string());
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(i, t)| t.validate(self.n_features, 1).map_err(|e| format!("stage {i}: {e}")))
    }

    pub fn decision_function(&self, x: &[f32]) -> Result<f64> {
        check_width(x, self.n_features)?;
        let mut raw = self.init_score;
        for tree in &self.trees {
            raw += self.learning_rate * tree.regression_value(x)?;
        }
        Ok(raw)
    }
}

impl Classifier for GradientBoosting {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, x: &[f32]) -> Result<[f64; 2]> {
        let p = sigmoid(self.decision_function(x)?);
        Ok([1.0 - p, p])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.coef.is_empty() {
            return Err("logistic regression has no coefficients".to_string());
        }
        if self.coef.iter().chain([&self.intercept]).any(|c| !c.is_finite()) {
            return Err("logistic regression coefficients must be finite".to_string());
        }
        Ok(())
    }

    fn decision(&self, z: impl Iterator<Item = f64>) -> f64 {
        self.coef.iter().zip(z).map(|(c, v)| c * v).sum::<f64>() + self.intercept
    }

    fn proba_from(&self, z: &[f64]) -> [f64; 2] {
        let p = sigmoid(self.decision(z.iter().copied()));
        [1.0 - p, p]
    }
}

impl Classifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coef.len()
    }

    fn predict_proba(&self, x: &[f32]) -> Result<[f64; 2]> {
        check_width(x, self.coef.len())?;
        let p = sigmoid(self.decision(x.iter().map(|v| f64::from(*v))));
        Ok([1.0 - p, p])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseEstimator {
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
    LogisticRegression(LogisticRegression),
}

impl BaseEstimator {
    fn as_classifier(&self) -> &dyn Classifier {
        match self {
            BaseEstimator::RandomForest(m) => m,
            BaseEstimator::GradientBoosting(m) => m,
            BaseEstimator::LogisticRegression(m) => m,
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            BaseEstimator::RandomForest(m) => m.validate(),
            BaseEstimator::GradientBoosting(m) => m.validate(),
            BaseEstimator::LogisticRegression(m) => m.validate(),
        }
    }
}

/// Base estimators' positive-class probabilities, in order, feed a
/// logistic-regression final estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackingClassifier {
    pub estimators: Vec<BaseEstimator>,
    pub final_estimator: LogisticRegression,
}

impl StackingClassifier {
    fn validate(&self) -> std::result::Result<(), String> {
        let first = self
            .estimators
            .first()
            .ok_or_else(|| "stacking classifier has no base estimators".to_string())?;
        let width = first.as_classifier().n_features();
        for (i, est) in self.estimators.iter().enumerate() {
            est.validate().map_err(|e| format!("estimator {i}: {e}"))?;
            if est.as_classifier().n_features() != width {
                return Err(format!(
                    "estimator {i} takes {} features, estimator 0 takes {width}",
                    est.as_classifier().n_features()
                ));
            }
        }
        self.final_estimator.validate()?;
        if self.final_estimator.coef.len() != self.estimators.len() {
            return Err(format!(
                "final estimator has {} coefficients for {} base estimators",
                self.final_estimator.coef.len(),
                self.estimators.len()
            ));
        }
        Ok(())
    }
}

impl Classifier for StackingClassifier {
    fn n_features(&self) -> usize {
        self.estimators.first().map_or(0, |e| e.as_classifier().n_features())
    }

    fn predict_proba(&self, x: &[f32]) -> Result<[f64; 2]> {
        let meta = self
            .estimators
            .iter()
            .map(|e| e.as_classifier().predict_proba(x).map(|p| p[1]))
            .collect::<Result<Vec<f64>>>()?;
        Ok(self.final_estimator.proba_from(&meta))
    }
}

/// The classifier slot of a model bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsembleModel {
    Stacking(StackingClassifier),
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
    LogisticRegression(LogisticRegression),
}

impl EnsembleModel {
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            EnsembleModel::Stacking(m) => m.validate(),
            EnsembleModel::RandomForest(m) => m.validate(),
            EnsembleModel::GradientBoosting(m) => m.validate(),
            EnsembleModel::LogisticRegression(m) => m.validate(),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            EnsembleModel::Stacking(m) => m,
            EnsembleModel::RandomForest(m) => m,
            EnsembleModel::GradientBoosting(m) => m,
            EnsembleModel::LogisticRegression(m) => m,
        }
    }
}

impl Classifier for EnsembleModel {
    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn predict_proba(&self, x: &[f32]) -> Result<[f64; 2]> {
        self.inner().predict_proba(x)
    }
}
