// src/classifier/mod.rs
//! The opaque model seam: anything that maps feature rows to binary labels.

mod artifact;
mod linear;
mod tree;

pub use artifact::{load_classifier, LoadedModel, ModelArtifact, ModelLoadError};
pub use linear::{LinearClassifier, StandardScaler};
pub use tree::{DecisionTreeClassifier, TreeNode};

/// Inference over a batch of feature rows.
///
/// Implementations are immutable once built and shared across requests,
/// so `predict` takes `&self` and must be safe to call concurrently.
pub trait Classifier: Send + Sync {
    /// One label per input row, in input order.
    fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<i64>, ClassifierError>;

    /// Short identifier of the model family, e.g. `"linear"`.
    fn kind(&self) -> &'static str;

    /// Number of features each row must carry.
    fn n_features(&self) -> usize;
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ClassifierError {
    #[error("X has {actual} features, but the model is expecting {expected} features as input")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("input contains a non-finite value at feature {0}")]
    NonFiniteInput(usize),

    #[error("model evaluation failed: {0}")]
    Evaluation(String),
}

/// Shared row-shape check used by the built-in models.
pub(crate) fn check_row(row: &[f64], expected: usize) -> Result<(), ClassifierError> {
    if row.len() != expected {
        return Err(ClassifierError::FeatureCountMismatch {
            expected,
            actual: row.len(),
        });
    }
    if let Some(idx) = row.iter().position(|v| !v.is_finite()) {
        return Err(ClassifierError::NonFiniteInput(idx));
    }
    Ok(())
}
