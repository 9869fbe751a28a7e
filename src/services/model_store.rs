use crate::core::{ActiveModel, ModelArtifact, ModelError, ScoringModel};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while locating or loading a model artifact
#[derive(Debug, Error)]
pub enum ModelStoreError {
    #[error("Model not found: {0}")]
    NotFound(String),

    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in model artifact {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid TOML in model artifact {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid model artifact {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: ModelError,
    },

    #[error("Unsupported model artifact format: {0}")]
    UnsupportedFormat(String),
}

/// Artifact formats, in lookup order
const ARTIFACT_EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Locates `model_<id>.<ext>` artifacts inside a model directory
#[derive(Debug, Clone)]
pub struct ModelStore {
    model_dir: PathBuf,
}

impl ModelStore {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Load the artifact registered under `model_id`
    pub async fn load(&self, model_id: &str) -> Result<ActiveModel, ModelStoreError> {
        if !is_valid_model_id(model_id) {
            tracing::warn!("Rejected model id that cannot name an artifact: {:?}", model_id);
            return Err(ModelStoreError::NotFound(model_id.to_string()));
        }

        for extension in ARTIFACT_EXTENSIONS {
            let path = self.model_dir.join(format!("model_{}.{}", model_id, extension));
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    let model = parse_artifact(&path, &bytes)?;
                    tracing::debug!("Loaded model {} from {}", model_id, path.display());
                    return Ok(ActiveModel::new(model_id, model));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(ModelStoreError::Io {
                        path: path.display().to_string(),
                        source,
                    })
                }
            }
        }

        Err(ModelStoreError::NotFound(model_id.to_string()))
    }

    /// Load an artifact from an explicit path (used for the startup model)
    pub async fn load_path(path: &Path, model_id: &str) -> Result<ActiveModel, ModelStoreError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ModelStoreError::NotFound(path.display().to_string())
            } else {
                ModelStoreError::Io {
                    path: path.display().to_string(),
                    source,
                }
            }
        })?;
        let model = parse_artifact(path, &bytes)?;
        Ok(ActiveModel::new(model_id, model))
    }
}

/// Ids are used as file name fragments, so only a conservative alphabet is
/// allowed and parent-directory sequences are refused
pub fn is_valid_model_id(model_id: &str) -> bool {
    !model_id.is_empty()
        && !model_id.contains("..")
        && model_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn parse_artifact(path: &Path, bytes: &[u8]) -> Result<ScoringModel, ModelStoreError> {
    let display = path.display().to_string();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let artifact: ModelArtifact = match extension.as_str() {
        "json" => serde_json::from_slice(bytes).map_err(|source| ModelStoreError::Json {
            path: display.clone(),
            source,
        })?,
        "toml" => {
            let text = String::from_utf8_lossy(bytes);
            toml::from_str(&text).map_err(|source| ModelStoreError::Toml {
                path: display.clone(),
                source,
            })?
        }
        _ => return Err(ModelStoreError::UnsupportedFormat(display)),
    };

    ScoringModel::from_artifact(artifact).map_err(|source| ModelStoreError::Invalid {
        path: display,
        source,
    })
}
