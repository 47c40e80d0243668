// src/prediction/outcome.rs
use serde::Serialize;

pub const NOT_DIABETIC_LABEL: &str = "The Person is not Diabetic";
pub const DIABETIC_LABEL: &str = "The Person is Diabetic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    NotDiabetic,
    Diabetic,
}

impl Outcome {
    /// `0` is negative; any other label counts as positive.
    pub fn from_label(label: i64) -> Self {
        if label == 0 {
            Outcome::NotDiabetic
        } else {
            Outcome::Diabetic
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::NotDiabetic => NOT_DIABETIC_LABEL,
            Outcome::Diabetic => DIABETIC_LABEL,
        }
    }

    /// Short form used in metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::NotDiabetic => "not_diabetic",
            Outcome::Diabetic => "diabetic",
        }
    }
}

/// Body of a successful prediction response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub prediction: &'static str,
}

impl From<Outcome> for PredictionResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            prediction: outcome.label(),
        }
    }
}
