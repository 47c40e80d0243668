// src/classifier/tree.rs
use super::{check_row, Classifier, ClassifierError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        label: i64,
    },
}

/// Flat binary decision tree; node 0 is the root, `x[feature] <= threshold` goes left.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTreeClassifier {
    nodes: Vec<TreeNode>,
    n_features: usize,
}

impl DecisionTreeClassifier {
    pub fn new(nodes: Vec<TreeNode>, n_features: usize) -> Result<Self, String> {
        if nodes.is_empty() {
            return Err("decision tree has no nodes".to_string());
        }
        for (idx, node) in nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= n_features {
                    return Err(format!(
                        "node {idx} splits on feature {feature}, model has {n_features}"
                    ));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {idx} has a non-finite threshold"));
                }
                // Children must come after their parent, which also rules out cycles.
                for child in [left, right] {
                    if *child <= idx || *child >= nodes.len() {
                        return Err(format!("node {idx} has invalid child index {child}"));
                    }
                }
            }
        }

        Ok(Self { nodes, n_features })
    }

    fn classify(&self, row: &[f64]) -> Result<i64, ClassifierError> {
        check_row(row, self.n_features)?;

        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { label }) => return Ok(*label),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(ClassifierError::Evaluation(format!(
                        "node index {idx} out of range"
                    )))
                }
            }
        }
    }
}

impl Classifier for DecisionTreeClassifier {
    fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<i64>, ClassifierError> {
        batch.iter().map(|row| self.classify(row)).collect()
    }

    fn kind(&self) -> &'static str {
        "decision_tree"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}
