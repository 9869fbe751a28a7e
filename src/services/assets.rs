use crate::config::AssetSettings;
use actix_web::web::Bytes;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Errors that can occur while serving importance assets
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Failed to read asset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A file served as-is, with the media type derived from its extension
#[derive(Debug, Clone)]
pub struct Asset {
    pub bytes: Bytes,
    pub media_type: &'static str,
}

/// Cached file contents with the metadata they were read under
#[derive(Debug, Clone)]
struct CachedAsset {
    bytes: Bytes,
    len: u64,
    modified: Option<SystemTime>,
}

/// Extensions tried for per-subject local importance files
const LOCAL_EXTENSIONS: [&str; 4] = ["png", "svg", "pdf", "html"];

/// Serves the pre-rendered feature importance files
///
/// Files are deposited by the explainability job. Every read stats the file,
/// and cached bytes are only served while its length and mtime are unchanged,
/// so deleted or rewritten files are picked up on the next request.
pub struct AssetStore {
    global_path: PathBuf,
    local_path: PathBuf,
    local_dir: Option<PathBuf>,
    subject_key: String,
    cache: moka::future::Cache<PathBuf, CachedAsset>,
}

impl AssetStore {
    pub fn new(settings: &AssetSettings) -> Self {
        let cache = moka::future::CacheBuilder::new(settings.cache_capacity)
            .time_to_live(Duration::from_secs(settings.cache_ttl_secs))
            .build();

        Self {
            global_path: settings.global_importance_path.clone(),
            local_path: settings.local_importance_path.clone(),
            local_dir: settings.local_importance_dir.clone(),
            subject_key: settings.subject_key.clone(),
            cache,
        }
    }

    pub async fn global_importance(&self) -> Result<Asset, AssetError> {
        self.read(&self.global_path).await
    }

    /// Local importance for the subject named in `record`, falling back to
    /// the shared local importance file
    pub async fn local_importance(&self, record: &Value) -> Result<Asset, AssetError> {
        if let (Some(dir), Some(subject)) = (&self.local_dir, self.subject_id(record)) {
            for extension in LOCAL_EXTENSIONS {
                let path = dir.join(format!("local_importance_{}.{}", subject, extension));
                match self.read(&path).await {
                    Ok(asset) => return Ok(asset),
                    Err(AssetError::NotFound(_)) => continue,
                    Err(e) => return Err(e),
                }
            }
            tracing::debug!("No local importance file for subject {}, using shared file", subject);
        }

        self.read(&self.local_path).await
    }

    /// Extract the subject identifier from a record, or from the first record
    /// of an array
    pub fn subject_id(&self, record: &Value) -> Option<String> {
        let record = match record {
            Value::Array(items) => items.first()?,
            other => other,
        };

        let id = match record.get(&self.subject_key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i.to_string()
                } else if let Some(u) = n.as_u64() {
                    u.to_string()
                } else {
                    // CSV round-trips turn integer ids into floats like 100002.0
                    let f = n.as_f64()?;
                    if f.fract() != 0.0 || !f.is_finite() || f.abs() > 1e15 {
                        return None;
                    }
                    format!("{}", f as i64)
                }
            }
            _ => return None,
        };

        let safe = !id.is_empty()
            && id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
        safe.then_some(id)
    }

    async fn read(&self, path: &Path) -> Result<Asset, AssetError> {
        let media_type = media_type_for(path);

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) => return Err(self.read_failed(path, e).await),
        };
        let len = metadata.len();
        let modified = metadata.modified().ok();

        if let Some(cached) = self.cache.get(path).await {
            if cached.len == len && cached.modified == modified {
                tracing::trace!("Asset cache hit: {}", path.display());
                return Ok(Asset { bytes: cached.bytes, media_type });
            }
            tracing::debug!("Asset changed on disk: {}", path.display());
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => return Err(self.read_failed(path, e).await),
        };

        let entry = CachedAsset {
            bytes: bytes.clone(),
            len,
            modified,
        };
        self.cache.insert(path.to_path_buf(), entry).await;
        Ok(Asset { bytes, media_type })
    }

    async fn read_failed(&self, path: &Path, source: std::io::Error) -> AssetError {
        self.cache.invalidate(path).await;

        if source.kind() == ErrorKind::NotFound {
            AssetError::NotFound(path.display().to_string())
        } else {
            AssetError::Io {
                path: path.display().to_string(),
                source,
            }
        }
    }
}

/// Media type for an asset path, by extension
pub fn media_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "html" | "htm" => "text/html; charset=utf-8",
        _ => "application/octet-stream",
    }
}
