use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse};
use crate::core::PredictionError;
use crate::models::ErrorResponse;
use crate::services::{AssetError, ModelStoreError};
use thiserror::Error;

/// Errors surfaced at the request boundary
///
/// Every variant renders as a JSON body with an `error` message, so no
/// failure inside a handler escapes past the request that caused it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Prediction(String),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Prediction(_) => "prediction_error",
        }
    }
}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.to_string(),
            kind: self.kind().to_string(),
            status_code: status.as_u16(),
        })
    }
}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        ApiError::Prediction(err.to_string())
    }
}

impl From<ModelStoreError> for ApiError {
    fn from(err: ModelStoreError) -> Self {
        match err {
            ModelStoreError::NotFound(_) => ApiError::NotFound("Model not found".to_string()),
            other => ApiError::Prediction(other.to_string()),
        }
    }
}

impl From<AssetError> for ApiError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::NotFound(_) => ApiError::NotFound("File not found".to_string()),
            other => ApiError::Prediction(other.to_string()),
        }
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::Validation(format!("Invalid JSON: {}", err)).into()
}
