// Route exports
pub mod importance;
pub mod meta;
pub mod scoring;

use actix_web::web;
use crate::config::{ServiceSettings, Settings};
use crate::core::ModelHandle;
use crate::error::handle_json_payload_error;
use crate::services::{AssetStore, ModelStore, ModelStoreError};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub models: ModelHandle,
    pub store: Arc<ModelStore>,
    pub assets: Arc<AssetStore>,
    pub service: Arc<ServiceSettings>,
}

impl AppState {
    /// Build the state from settings, loading the startup model
    pub async fn load(settings: &Settings) -> Result<Self, ModelStoreError> {
        let initial = ModelStore::load_path(
            &settings.model.artifact_path,
            &settings.model.initial_model_id,
        )
        .await?;

        tracing::info!(
            "Loaded model {} from {} ({} features, {})",
            initial.id,
            settings.model.artifact_path.display(),
            initial.model.schema().len(),
            initial.model.kind()
        );

        Ok(Self {
            models: ModelHandle::new(initial),
            store: Arc::new(ModelStore::new(settings.model.model_dir.clone())),
            assets: Arc::new(AssetStore::new(&settings.assets)),
            service: Arc::new(settings.service.clone()),
        })
    }
}

/// Register state, extractor configuration and routes on an app
pub fn configure_app(
    state: AppState,
    max_payload_bytes: usize,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(state))
            .app_data(
                web::JsonConfig::default()
                    .limit(max_payload_bytes)
                    // Dashboard clients do not always set a JSON content type
                    .content_type_required(false)
                    .error_handler(handle_json_payload_error),
            )
            .configure(configure_routes);
    }
}

/// Routes live at the root so existing dashboard clients keep working
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(scoring::configure)
        .configure(meta::configure)
        .configure(importance::configure);
}
