// src/prediction/service.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::error::PredictionError;
use super::outcome::Outcome;
use super::record::{PatientRecord, FEATURE_ORDER};
use crate::classifier::{load_classifier, Classifier, LoadedModel};
use crate::health::HealthReport;

/// What startup managed to load. Fixed for the life of the process.
#[derive(Debug, Clone)]
pub enum ModelState {
    Loaded(LoadedModel),
    Unavailable { reason: String },
}

/// Read-only description of the model, for the introspection endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
    pub feature_order: Vec<&'static str>,
}

pub struct PredictionService {
    model: ModelState,
    started_at: DateTime<Utc>,
}

impl PredictionService {
    pub fn new(model: ModelState) -> Self {
        Self {
            model,
            started_at: Utc::now(),
        }
    }

    /// Load the artifact once. A failed load leaves the service up without a model.
    pub fn from_artifact<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let state = match load_classifier(path) {
            Ok(model) => {
                info!(
                    "Classifier loaded from {} (kind={}, features={})",
                    path.display(),
                    model.classifier.kind(),
                    model.classifier.n_features()
                );
                ModelState::Loaded(model)
            }
            Err(e) => {
                error!("Classifier unavailable: {}", e);
                ModelState::Unavailable {
                    reason: e.to_string(),
                }
            }
        };
        Self::new(state)
    }

    pub fn with_classifier(classifier: Arc<dyn Classifier>) -> Self {
        Self::new(ModelState::Loaded(LoadedModel {
            classifier,
            name: None,
            version: None,
        }))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::new(ModelState::Unavailable {
            reason: reason.into(),
        })
    }

    pub fn is_model_loaded(&self) -> bool {
        matches!(self.model, ModelState::Loaded(_))
    }

    /// Validate a raw JSON body, then predict. Validation always runs first.
    pub fn predict_json(&self, body: &[u8]) -> Result<Outcome, PredictionError> {
        let record = PatientRecord::from_json_bytes(body)?;
        self.predict(&record)
    }

    pub fn predict(&self, record: &PatientRecord) -> Result<Outcome, PredictionError> {
        let model = match &self.model {
            ModelState::Loaded(model) => model,
            ModelState::Unavailable { reason } => {
                return Err(PredictionError::ModelUnavailable(reason.clone()))
            }
        };

        let batch = vec![record.to_features().to_vec()];
        let labels = model.classifier.predict(&batch)?;
        let label = match labels.as_slice() {
            [label] => *label,
            other => {
                return Err(PredictionError::ClassifierInvocation(
                    crate::classifier::ClassifierError::Evaluation(format!(
                        "expected 1 label for 1 row, got {}",
                        other.len()
                    )),
                ))
            }
        };

        let outcome = Outcome::from_label(label);
        debug!(label, outcome = outcome.as_str(), "Prediction computed");
        Ok(outcome)
    }

    pub fn health(&self) -> HealthReport {
        HealthReport::new(self.is_model_loaded(), self.started_at)
    }

    pub fn model_info(&self) -> ModelInfo {
        let feature_order = FEATURE_ORDER.to_vec();
        match &self.model {
            ModelState::Loaded(model) => ModelInfo {
                loaded: true,
                unavailable_reason: None,
                kind: Some(model.classifier.kind()),
                name: model.name.clone(),
                version: model.version.clone(),
                n_features: Some(model.classifier.n_features()),
                feature_order,
            },
            ModelState::Unavailable { reason } => ModelInfo {
                loaded: false,
                unavailable_reason: Some(reason.clone()),
                kind: None,
                name: None,
                version: None,
                n_features: None,
                feature_order,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records the rows it sees and answers with a fixed label.
    struct RecordingClassifier {
        label: i64,
        calls: AtomicUsize,
        rows: Mutex<Vec<Vec<f64>>>,
    }

    impl RecordingClassifier {
        fn new(label: i64) -> Arc<Self> {
            Arc::new(Self {
                label,
                calls: AtomicUsize::new(0),
                rows: Mutex::new(Vec::new()),
            })
        }
    }

    impl Classifier for RecordingClassifier {
        fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<i64>, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.rows.lock().unwrap().extend(batch.iter().cloned());
            Ok(vec![self.label; batch.len()])
        }

        fn kind(&self) -> &'static str {
            "recording"
        }

        fn n_features(&self) -> usize {
            8
        }
    }

    struct EmptyOutput;

    impl Classifier for EmptyOutput {
        fn predict(&self, _batch: &[Vec<f64>]) -> Result<Vec<i64>, ClassifierError> {
            Ok(Vec::new())
        }

        fn kind(&self) -> &'static str {
            "empty"
        }

        fn n_features(&self) -> usize {
            8
        }
    }

    const BODY: &[u8] = br#"{"Pregnancies":1,"Glucose":85,"BloodPressure":66,"SkinThickness":29,"Insulin":0,"BMI":26.6,"DiabetesPedigreeFunction":0.351,"Age":31}"#;

    #[test]
    fn sends_one_row_in_training_order() {
        let fake = RecordingClassifier::new(0);
        let service = PredictionService::with_classifier(fake.clone());

        let outcome = service.predict_json(BODY).unwrap();

        assert_eq!(outcome, Outcome::NotDiabetic);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *fake.rows.lock().unwrap(),
            vec![vec![1.0, 85.0, 66.0, 29.0, 0.0, 26.6, 0.351, 31.0]]
        );
    }

    #[test]
    fn nonzero_label_is_diabetic() {
        let service = PredictionService::with_classifier(RecordingClassifier::new(1));
        assert_eq!(service.predict_json(BODY).unwrap(), Outcome::Diabetic);
    }

    #[test]
    fn invalid_input_never_reaches_the_classifier() {
        let fake = RecordingClassifier::new(1);
        let service = PredictionService::with_classifier(fake.clone());

        let body = br#"{"Pregnancies":1,"Glucose":"abc","BloodPressure":66,"SkinThickness":29,"Insulin":0,"BMI":26.6,"DiabetesPedigreeFunction":0.351,"Age":31}"#;
        let err = service.predict_json(body).unwrap_err();

        assert!(matches!(err, PredictionError::Validation(_)));
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn validation_precedes_model_availability() {
        let service = PredictionService::unavailable("missing");
        let err = service.predict_json(b"{}").unwrap_err();
        assert!(matches!(err, PredictionError::Validation(_)));
    }

    #[test]
    fn missing_model_is_reported_and_health_stays_up() {
        let dir = tempfile::tempdir().unwrap();
        let service = PredictionService::from_artifact(dir.path().join("absent.json"));

        let err = service.predict_json(BODY).unwrap_err();
        assert!(matches!(err, PredictionError::ModelUnavailable(_)));
        assert_eq!(err.kind(), "model_unavailable");

        let health = service.health();
        assert!(!health.model_loaded);
        assert_eq!(health.status, crate::health::HealthStatus::Healthy);

        let info = service.model_info();
        assert!(!info.loaded);
        assert!(info.unavailable_reason.unwrap().contains("absent.json"));
    }

    #[test]
    fn wrong_label_count_is_an_invocation_error() {
        let service = PredictionService::with_classifier(Arc::new(EmptyOutput));
        let err = service.predict_json(BODY).unwrap_err();
        assert!(matches!(err, PredictionError::ClassifierInvocation(_)));
    }

    #[test]
    fn model_info_lists_feature_order() {
        let service = PredictionService::with_classifier(RecordingClassifier::new(0));
        let info = service.model_info();
        assert!(info.loaded);
        assert_eq!(info.kind, Some("recording"));
        assert_eq!(info.feature_order, FEATURE_ORDER.to_vec());
    }
}
