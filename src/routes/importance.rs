use actix_web::{web, HttpResponse};
use serde_json::Value;
use crate::error::ApiError;
use crate::services::Asset;
use super::AppState;

/// Configure feature importance asset routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/global_importance", web::get().to(global_importance))
        .route("/get_local_importance", web::post().to(local_importance));
}

async fn global_importance(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let asset = state.assets.global_importance().await?;
    Ok(asset_response(asset))
}

/// POST /get_local_importance
///
/// The body names the subject, e.g. `{"SK_ID_CURR": 100002}`. It is optional;
/// without a usable subject the shared local importance file is served.
async fn local_importance(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let record = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            tracing::debug!("Ignoring unparseable local importance body: {}", e);
            Value::Null
        })
    };

    let asset = state.assets.local_importance(&record).await?;
    Ok(asset_response(asset))
}

fn asset_response(asset: Asset) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(asset.media_type)
        .body(asset.bytes)
}
