use actix_web::{web, HttpResponse};
use serde_json::Value;
use validator::Validate;
use crate::core::parse_batch;
use crate::error::ApiError;
use crate::models::{ModelChangedResponse, ModelInfoResponse, NewModelRequest};
use super::AppState;

/// Configure prediction and model management routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/predict", web::post().to(predict))
        .route("/new_model", web::post().to(new_model))
        .route("/model", web::get().to(model_info));
}

/// Score a batch of records
///
/// POST /predict
///
/// Request body:
/// ```json
/// [{"income": 50000, "age": 35}, {"income": "n/a"}]
/// ```
///
/// Response: one probability vector per record, e.g. `[[0.82, 0.18], [0.9, 0.1]]`
async fn predict(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    // One snapshot for the whole request, so a concurrent swap cannot mix
    // schemas between alignment and scoring
    let active = state.models.current();
    let model_id = active.id.clone();

    let result = match parse_batch(body.into_inner()) {
        Ok(batch) => {
            tracing::debug!("Scoring {} records with model {}", batch.len(), model_id);
            // Large batches are CPU bound; keep them off the worker's event loop
            web::block(move || active.model.predict(&batch))
                .await
                .map_err(|e| ApiError::Prediction(format!("Scoring task failed: {}", e)))?
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(probabilities) => Ok(HttpResponse::Ok().json(probabilities)),
        Err(e) => {
            tracing::error!("Prediction failed with model {}: {}", model_id, e);
            Err(e.into())
        }
    }
}

/// Switch the active model
///
/// POST /new_model
///
/// Request body:
/// ```json
/// {"model_id": "v2"}
/// ```
async fn new_model(
    state: web::Data<AppState>,
    req: web::Json<NewModelRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for new_model request: {}", errors);
        return Err(ApiError::Validation(errors.to_string()));
    }
    let Some(model_id) = req.model_id.as_deref() else {
        return Err(ApiError::Validation("model_id is required".to_string()));
    };

    let next = match state.store.load(model_id).await {
        Ok(next) => next,
        Err(e) => {
            tracing::warn!("Could not load model {}: {}", model_id, e);
            return Err(e.into());
        }
    };

    let previous = state.models.replace(next);
    tracing::info!("Active model changed from {} to {}", previous.id, model_id);

    Ok(HttpResponse::Ok().json(ModelChangedResponse::success()))
}

/// Describe the active model
///
/// GET /model
async fn model_info(state: web::Data<AppState>) -> HttpResponse {
    let active = state.models.current();

    HttpResponse::Ok().json(ModelInfoResponse {
        model_id: active.id.clone(),
        estimator: active.model.kind(),
        features: active.model.schema().names().to_vec(),
        classes: active.model.classes().to_vec(),
        loaded_at: active.loaded_at,
    })
}
