// src/prediction/mod.rs
mod error;
mod outcome;
mod record;
mod service;

pub use error::{FieldError, PredictionError, ValidationErrors};
pub use outcome::{Outcome, PredictionResponse, DIABETIC_LABEL, NOT_DIABETIC_LABEL};
pub use record::{PatientRecord, FEATURE_COUNT, FEATURE_ORDER};
pub use service::{ModelInfo, ModelState, PredictionService};
