//! Pre-trained model artifacts and their inference routines
//!
//! - [`Classifier`]: fertilizer-type model (tree forest or multinomial logistic)
//! - [`Regressor`]: fertilizer-quantity model (tree forest or linear)
//! - [`Tree`]: flat-array decision tree shared by both forests
//!
//! Inference is a pure function of `&self` and one feature row, so a model
//! can be shared across request handlers without locking.

use crate::error::{ArtifactError, InferenceError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw classifier output
///
/// Class lists exported from label-encoded targets hold integer codes;
/// otherwise they hold the label strings directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    /// Integer class code
    Code(i64),
    /// Class name
    Name(String),
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// A node of a decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Internal split: go left when `x[feature] <= threshold`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Leaf with per-class weights (classifier) or a single value (regressor)
    Leaf { value: Vec<f64> },
}

/// Decision tree stored as a flat node array; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Nodes in export order
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    /// Walk the tree for one feature row and return the reached leaf value
    ///
    /// # Errors
    /// Returns [`InferenceError::MalformedTree`] on dangling indices or cycles
    pub fn evaluate(&self, tree: usize, features: &[f64]) -> Result<&[f64], InferenceError> {
        let malformed = |message: String| InferenceError::MalformedTree { tree, message };

        let mut idx = 0;
        // A well-formed path visits each node at most once.
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => return Ok(value.as_slice()),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = features
                        .get(*feature)
                        .ok_or_else(|| malformed(format!("feature index {feature} out of range")))?;
                    idx = if *x <= *threshold { *left } else { *right };
                }
                None => return Err(malformed(format!("node index {idx} out of range"))),
            }
        }
        Err(malformed("cycle detected".to_string()))
    }

    fn check(&self, n_features: usize, leaf_width: Option<usize>) -> Result<(), String> {
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
                    if !threshold.is_finite() {
                        return Err(format!("node {i} has a non-finite threshold"));
                    }
                    if *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(format!("node {i} has a child out of range"));
                    }
                }
                TreeNode::Leaf { value } => {
                    if let Some(width) = leaf_width {
                        if value.len() != width {
                            return Err(format!(
                                "leaf {i} has {} values, expected {width}",
                                value.len()
                            ));
                        }
                    } else if value.is_empty() {
                        return Err(format!("leaf {i} is empty"));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Fertilizer-type classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    /// Forest voting by averaged leaf class distributions
    Forest {
        n_features: usize,
        classes: Vec<ClassLabel>,
        trees: Vec<Tree>,
    },

    /// Linear scores per class, highest wins
    ///
    /// A binary model may carry one coefficient row; a positive score then
    /// selects the second class.
    Logistic {
        n_features: usize,
        classes: Vec<ClassLabel>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
}

impl Classifier {
    /// Number of input features
    #[inline]
    #[must_use]
    pub fn n_features(&self) -> usize {
        match self {
            Self::Forest { n_features, .. } | Self::Logistic { n_features, .. } => *n_features,
        }
    }

    /// Class labels in output order
    #[inline]
    #[must_use]
    pub fn classes(&self) -> &[ClassLabel] {
        match self {
            Self::Forest { classes, .. } | Self::Logistic { classes, .. } => classes,
        }
    }

    /// Predict the class of one feature row
    ///
    /// # Errors
    /// Returns error on width mismatch, malformed trees or non-finite scores
    pub fn predict(&self, features: &[f64]) -> Result<ClassLabel, InferenceError> {
        check_width(self.n_features(), features)?;
        let classes = self.classes();
        if classes.is_empty() {
            return Err(InferenceError::EmptyModel("classes"));
        }

        let scores = match self {
            Self::Forest { trees, .. } => forest_votes(trees, classes.len(), features)?,
            Self::Logistic {
                coefficients,
                intercepts,
                ..
            } => {
                let scores: Vec<f64> = coefficients
                    .iter()
                    .zip(intercepts)
                    .map(|(row, b)| dot(row, features) + b)
                    .collect();
                if scores.len() == 1 && classes.len() == 2 {
                    vec![0.0, scores[0]]
                } else {
                    scores
                }
            }
        };

        let best = argmax(&scores)?;
        classes
            .get(best)
            .cloned()
            .ok_or(InferenceError::EmptyModel("class for the winning score"))
    }

    /// Check structural consistency against the expected feature width
    ///
    /// # Errors
    /// Returns [`ArtifactError::Invalid`] describing the first defect
    pub fn validate(&self, expected_features: usize) -> Result<(), ArtifactError> {
        let invalid = |message: String| ArtifactError::invalid("classifier", message);

        if self.n_features() != expected_features {
            return Err(invalid(format!(
                "trained on {} features, feature list has {expected_features}",
                self.n_features()
            )));
        }
        if self.classes().is_empty() {
            return Err(invalid("no classes".to_string()));
        }

        match self {
            Self::Forest {
                n_features,
                classes,
                trees,
            } => {
                if trees.is_empty() {
                    return Err(invalid("forest has no trees".to_string()));
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.check(*n_features, Some(classes.len()))
                        .map_err(|e| invalid(format!("tree {i}: {e}")))?;
                }
            }
            Self::Logistic {
                n_features,
                classes,
                coefficients,
                intercepts,
            } => {
                let binary = coefficients.len() == 1 && classes.len() == 2;
                if !binary && coefficients.len() != classes.len() {
                    return Err(invalid(format!(
                        "{} coefficient rows for {} classes",
                        coefficients.len(),
                        classes.len()
                    )));
                }
                if intercepts.len() != coefficients.len() {
                    return Err(invalid("intercept count differs from coefficient rows".to_string()));
                }
                if coefficients.iter().any(|row| row.len() != *n_features) {
                    return Err(invalid("coefficient row width differs from n_features".to_string()));
                }
            }
        }
        Ok(())
    }
}

/// Fertilizer-quantity regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    /// Mean of leaf values across trees
    Forest { n_features: usize, trees: Vec<Tree> },

    /// `coefficients · x + intercept`
    Linear { coefficients: Vec<f64>, intercept: f64 },
}

impl Regressor {
    /// Number of input features
    #[inline]
    #[must_use]
    pub fn n_features(&self) -> usize {
        match self {
            Self::Forest { n_features, .. } => *n_features,
            Self::Linear { coefficients, .. } => coefficients.len(),
        }
    }

    /// Predict the raw (possibly scaled) quantity for one feature row
    ///
    /// # Errors
    /// Returns error on width mismatch, malformed trees or a non-finite result
    pub fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_width(self.n_features(), features)?;

        let out = match self {
            Self::Forest { trees, .. } => {
                if trees.is_empty() {
                    return Err(InferenceError::EmptyModel("trees"));
                }
                let mut sum = 0.0;
                for (i, tree) in trees.iter().enumerate() {
                    let leaf = tree.evaluate(i, features)?;
                    sum += leaf.first().copied().ok_or(InferenceError::MalformedTree {
                        tree: i,
                        message: "empty leaf".to_string(),
                    })?;
                }
                sum / trees.len() as f64
            }
            Self::Linear {
                coefficients,
                intercept,
            } => dot(coefficients, features) + intercept,
        };

        if out.is_finite() {
            Ok(out)
        } else {
            Err(InferenceError::NonFinite)
        }
    }

    /// Check structural consistency against the expected feature width
    ///
    /// # Errors
    /// Returns [`ArtifactError::Invalid`] describing the first defect
    pub fn validate(&self, expected_features: usize) -> Result<(), ArtifactError> {
        let invalid = |message: String| ArtifactError::invalid("regressor", message);

        if self.n_features() != expected_features {
            return Err(invalid(format!(
                "trained on {} features, feature list has {expected_features}",
                self.n_features()
            )));
        }
        if let Self::Forest { n_features, trees } = self {
            if trees.is_empty() {
                return Err(invalid("forest has no trees".to_string()));
            }
            for (i, tree) in trees.iter().enumerate() {
                tree.check(*n_features, Some(1))
                    .map_err(|e| invalid(format!("tree {i}: {e}")))?;
            }
        }
        Ok(())
    }
}

fn check_width(expected: usize, features: &[f64]) -> Result<(), InferenceError> {
    if features.len() == expected {
        Ok(())
    } else {
        Err(InferenceError::FeatureCountMismatch {
            expected,
            actual: features.len(),
        })
    }
}

fn dot(weights: &[f64], features: &[f64]) -> f64 {
    weights.iter().zip(features).map(|(w, x)| w * x).sum()
}

fn forest_votes(trees: &[Tree], n_classes: usize, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
    if trees.is_empty() {
        return Err(InferenceError::EmptyModel("trees"));
    }
    let mut votes = vec![0.0; n_classes];
    for (i, tree) in trees.iter().enumerate() {
        let leaf = tree.evaluate(i, features)?;
        if leaf.len() != n_classes {
            return Err(InferenceError::MalformedTree {
                tree: i,
                message: format!("leaf has {} weights for {n_classes} classes", leaf.len()),
            });
        }
        let total: f64 = leaf.iter().sum();
        let norm = if total > 0.0 { total } else { 1.0 };
        for (v, w) in votes.iter_mut().zip(leaf) {
            *v += w / norm;
        }
    }
    Ok(votes)
}

// First maximum wins ties, matching numpy's argmax.
fn argmax(scores: &[f64]) -> Result<usize, InferenceError> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &s) in scores.iter().enumerate() {
        if !s.is_finite() {
            return Err(InferenceError::NonFinite);
        }
        if best.map_or(true, |(_, b)| s > b) {
            best = Some((i, s));
        }
    }
    best.map(|(i, _)| i).ok_or(InferenceError::EmptyModel("scores"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stump(feature: usize, threshold: f64, left: Vec<f64>, right: Vec<f64>) -> Tree {
        Tree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: left },
                TreeNode::Leaf { value: right },
            ],
        }
    }

    #[test]
    fn tree_goes_left_on_equal() {
        let tree = stump(0, 0.5, vec![1.0], vec![2.0]);
        assert_eq!(tree.evaluate(0, &[0.5]).unwrap(), &[1.0]);
        assert_eq!(tree.evaluate(0, &[0.6]).unwrap(), &[2.0]);
    }

    #[test]
    fn tree_cycle_detected() {
        let tree = Tree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: 0,
                right: 0,
            }],
        };
        assert!(matches!(
            tree.evaluate(3, &[1.0]),
            Err(InferenceError::MalformedTree { tree: 3, .. })
        ));
    }

    #[test]
    fn forest_classifier_majority() {
        let clf = Classifier::Forest {
            n_features: 2,
            classes: vec![ClassLabel::Name("DAP".into()), ClassLabel::Name("Urea".into())],
            trees: vec![
                stump(0, 0.0, vec![10.0, 0.0], vec![0.0, 10.0]),
                stump(1, 0.0, vec![3.0, 1.0], vec![1.0, 3.0]),
            ],
        };
        assert_eq!(clf.predict(&[1.0, -1.0]).unwrap(), ClassLabel::Name("Urea".into()));
        assert_eq!(clf.predict(&[-1.0, -1.0]).unwrap(), ClassLabel::Name("DAP".into()));
    }

    #[test]
    fn logistic_binary_single_row() {
        let clf = Classifier::Logistic {
            n_features: 1,
            classes: vec![ClassLabel::Code(0), ClassLabel::Code(1)],
            coefficients: vec![vec![2.0]],
            intercepts: vec![-1.0],
        };
        assert!(clf.validate(1).is_ok());
        assert_eq!(clf.predict(&[1.0]).unwrap(), ClassLabel::Code(1));
        assert_eq!(clf.predict(&[0.0]).unwrap(), ClassLabel::Code(0));
    }

    #[test]
    fn classifier_width_mismatch() {
        let clf = Classifier::Logistic {
            n_features: 3,
            classes: vec![ClassLabel::Code(0)],
            coefficients: vec![vec![0.0; 3]],
            intercepts: vec![0.0],
        };
        assert_eq!(
            clf.predict(&[1.0]),
            Err(InferenceError::FeatureCountMismatch {
                expected: 3,
                actual: 1
            })
        );
    }

    #[test]
    fn forest_regressor_mean() {
        let reg = Regressor::Forest {
            n_features: 1,
            trees: vec![stump(0, 0.0, vec![10.0], vec![20.0]), stump(0, 5.0, vec![40.0], vec![60.0])],
        };
        assert_eq!(reg.predict(&[1.0]).unwrap(), 30.0);
    }

    #[test]
    fn linear_regressor_non_finite() {
        let reg = Regressor::Linear {
            coefficients: vec![f64::INFINITY],
            intercept: 0.0,
        };
        assert_eq!(reg.predict(&[1.0]), Err(InferenceError::NonFinite));
    }

    #[test]
    fn validate_rejects_dangling_child() {
        let reg = Regressor::Forest {
            n_features: 1,
            trees: vec![Tree {
                nodes: vec![TreeNode::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 1,
                    right: 7,
                }],
            }],
        };
        let err = reg.validate(1).unwrap_err();
        assert!(err.to_string().contains("child out of range"));
    }

    #[test]
    fn classifier_decodes_from_json() {
        let json = r#"{
            "kind": "forest",
            "n_features": 1,
            "classes": [0, 1],
            "trees": [{"nodes": [
                {"feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                {"value": [1.0, 0.0]},
                {"value": [0.0, 1.0]}
            ]}]
        }"#;
        let clf: Classifier = serde_json::from_str(json).unwrap();
        assert!(clf.validate(1).is_ok());
        assert_eq!(clf.predict(&[0.9]).unwrap(), ClassLabel::Code(1));
    }

    #[test]
    fn class_label_display() {
        assert_eq!(ClassLabel::Code(3).to_string(), "3");
        assert_eq!(ClassLabel::Name("Urea".into()).to_string(), "Urea");
    }
}
