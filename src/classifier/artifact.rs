// src/classifier/artifact.rs
use super::{Classifier, DecisionTreeClassifier, LinearClassifier, StandardScaler, TreeNode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// On-disk description of a trained model, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        version: Option<String>,
        weights: Vec<f64>,
        intercept: f64,
        #[serde(default)]
        scaler: Option<StandardScaler>,
    },
    DecisionTree {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        version: Option<String>,
        n_features: usize,
        nodes: Vec<TreeNode>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("model artifact not found at {0}")]
    NotFound(PathBuf),

    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to deserialize model artifact {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("invalid model artifact {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// A classifier together with the metadata it was exported with.
#[derive(Clone)]
pub struct LoadedModel {
    pub classifier: Arc<dyn Classifier>,
    pub name: Option<String>,
    pub version: Option<String>,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("kind", &self.classifier.kind())
            .field("name", &self.name)
            .field("version", &self.version)
            .finish()
    }
}

impl ModelArtifact {
    pub fn from_str_for_path(path: &Path, contents: &str) -> Result<Self, ModelLoadError> {
        let ext = path.extension().and_then(|s| s.to_str());
        let parsed = match ext {
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(contents).map_err(|e| e.to_string())
            }
            _ => serde_json::from_str(contents).map_err(|e| e.to_string()),
        };
        parsed.map_err(|reason| ModelLoadError::Parse {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn build(self, path: &Path) -> Result<LoadedModel, ModelLoadError> {
        let invalid = |reason: String| ModelLoadError::Invalid {
            path: path.to_path_buf(),
            reason,
        };

        match self {
            ModelArtifact::Linear {
                name,
                version,
                weights,
                intercept,
                scaler,
            } => {
                let model = LinearClassifier::new(weights, intercept, scaler).map_err(invalid)?;
                Ok(LoadedModel {
                    classifier: Arc::new(model),
                    name,
                    version,
                })
            }
            ModelArtifact::DecisionTree {
                name,
                version,
                n_features,
                nodes,
            } => {
                let model = DecisionTreeClassifier::new(nodes, n_features).map_err(invalid)?;
                Ok(LoadedModel {
                    classifier: Arc::new(model),
                    name,
                    version,
                })
            }
        }
    }
}

/// Read, deserialize and check a classifier artifact.
pub fn load_classifier<P: AsRef<Path>>(path: P) -> Result<LoadedModel, ModelLoadError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ModelLoadError::NotFound(path.to_path_buf())
        } else {
            ModelLoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let model = ModelArtifact::from_str_for_path(path, &contents)?.build(path)?;
    tracing::debug!(
        kind = model.classifier.kind(),
        n_features = model.classifier.n_features(),
        "Classifier artifact parsed from {}",
        path.display()
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_linear_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{"kind":"linear","name":"svm","version":"1","weights":[1.0,2.0],"intercept":-1.0}"#,
        )
        .unwrap();

        let model = load_classifier(&path).unwrap();
        assert_eq!(model.classifier.kind(), "linear");
        assert_eq!(model.classifier.n_features(), 2);
        assert_eq!(model.name.as_deref(), Some("svm"));
        assert_eq!(model.classifier.predict(&[vec![1.0, 1.0]]).unwrap(), vec![1]);
    }

    #[test]
    fn loads_tree_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.yaml");
        std::fs::write(
            &path,
            "kind: decision_tree\nn_features: 1\nnodes:\n  - {feature: 0, threshold: 0.5, left: 1, right: 2}\n  - {label: 0}\n  - {label: 1}\n",
        )
        .unwrap();

        let model = load_classifier(&path).unwrap();
        assert_eq!(model.classifier.kind(), "decision_tree");
        assert_eq!(model.classifier.predict(&[vec![0.7]]).unwrap(), vec![1]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_classifier(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ModelLoadError::NotFound(_)));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.sav");
        std::fs::write(&path, "ccopy_reg\n_reconstructor\n").unwrap();
        assert!(matches!(
            load_classifier(&path),
            Err(ModelLoadError::Parse { .. })
        ));
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, r#"{"kind":"random_forest","trees":[]}"#).unwrap();
        assert!(matches!(
            load_classifier(&path),
            Err(ModelLoadError::Parse { .. })
        ));
    }

    #[test]
    fn structural_problems_are_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, r#"{"kind":"linear","weights":[],"intercept":0.0}"#).unwrap();
        assert!(matches!(
            load_classifier(&path),
            Err(ModelLoadError::Invalid { .. })
        ));
    }
}
