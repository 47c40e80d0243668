// src/classifier/linear.rs
use super::{check_row, Classifier, ClassifierError};
use serde::{Deserialize, Serialize};

/// Per-feature standardization fitted at training time: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect()
    }
}

/// Linear decision function; positive class when `w·x + b > 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearClassifier {
    weights: Vec<f64>,
    intercept: f64,
    scaler: Option<StandardScaler>,
}

impl LinearClassifier {
    pub fn new(
        weights: Vec<f64>,
        intercept: f64,
        scaler: Option<StandardScaler>,
    ) -> Result<Self, String> {
        if weights.is_empty() {
            return Err("linear model has no weights".to_string());
        }
        if weights.iter().any(|w| !w.is_finite()) || !intercept.is_finite() {
            return Err("linear model has non-finite coefficients".to_string());
        }
        if let Some(scaler) = &scaler {
            if scaler.mean.len() != weights.len() || scaler.scale.len() != weights.len() {
                return Err(format!(
                    "scaler has {} means and {} scales for {} weights",
                    scaler.mean.len(),
                    scaler.scale.len(),
                    weights.len()
                ));
            }
            if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err("scaler scale values must be finite and nonzero".to_string());
            }
        }

        Ok(Self {
            weights,
            intercept,
            scaler,
        })
    }

    pub fn decision_function(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        check_row(row, self.weights.len())?;

        let scaled;
        let x = match &self.scaler {
            Some(scaler) => {
                scaled = scaler.transform(row);
                scaled.as_slice()
            }
            None => row,
        };

        let score = self
            .weights
            .iter()
            .zip(x)
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.intercept;
        if !score.is_finite() {
            return Err(ClassifierError::Evaluation(format!(
                "decision function is not finite ({score})"
            )));
        }
        Ok(score)
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<i64>, ClassifierError> {
        batch
            .iter()
            .map(|row| {
                self.decision_function(row)
                    .map(|score| if score > 0.0 { 1 } else { 0 })
            })
            .collect()
    }

    fn kind(&self) -> &'static str {
        "linear"
    }

    fn n_features(&self) -> usize {
        self.weights.len()
    }
}
