// Service exports
pub mod assets;
pub mod model_store;

pub use assets::{media_type_for, Asset, AssetError, AssetStore};
pub use model_store::{is_valid_model_id, ModelStore, ModelStoreError};
