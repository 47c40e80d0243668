// src/prediction/error.rs
use serde::Serialize;

use crate::classifier::ClassifierError;

/// One problem with one request field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }

    pub fn single(error: FieldError) -> Self {
        Self(vec![error])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.field.as_str()).collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("invalid patient record: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("classifier invocation failed: {0}")]
    ClassifierInvocation(#[from] ClassifierError),
}

impl PredictionError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::Validation(_) => "validation",
            PredictionError::ModelUnavailable(_) => "model_unavailable",
            PredictionError::ClassifierInvocation(_) => "classifier_invocation",
        }
    }
}
