use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::models::domain::EstimatorKind;

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    pub status_code: u16,
}

/// Response for a successful model swap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelChangedResponse {
    pub message: String,
}

impl ModelChangedResponse {
    pub fn success() -> Self {
        Self {
            message: "Model changed successfully".to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Metadata about the active model
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfoResponse {
    pub model_id: String,
    pub estimator: EstimatorKind,
    pub features: Vec<String>,
    pub classes: Vec<Value>,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}
