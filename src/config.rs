use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub assets: AssetSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5001 }
fn default_max_payload_bytes() -> usize { 16 * 1024 * 1024 }

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    /// Artifact loaded at startup
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,
    /// Directory searched for `model_<id>` artifacts on swap
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    /// Id reported for the startup artifact
    #[serde(default = "default_initial_model_id")]
    pub initial_model_id: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            artifact_path: default_artifact_path(),
            model_dir: default_model_dir(),
            initial_model_id: default_initial_model_id(),
        }
    }
}

fn default_artifact_path() -> PathBuf { PathBuf::from("model.json") }
fn default_model_dir() -> PathBuf { PathBuf::from(".") }
fn default_initial_model_id() -> String { "default".to_string() }

/// Static metadata served by `/version` and `/threshold`
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSettings {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_threshold")]
    pub threshold: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            threshold: default_threshold(),
        }
    }
}

fn default_version() -> String { "2.0".to_string() }
fn default_threshold() -> String { "0.1".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct AssetSettings {
    #[serde(default = "default_global_importance_path")]
    pub global_importance_path: PathBuf,
    #[serde(default = "default_local_importance_path")]
    pub local_importance_path: PathBuf,
    /// Optional directory holding per-subject `local_importance_<id>` files
    pub local_importance_dir: Option<PathBuf>,
    #[serde(default = "default_subject_key")]
    pub subject_key: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            global_importance_path: default_global_importance_path(),
            local_importance_path: default_local_importance_path(),
            local_importance_dir: None,
            subject_key: default_subject_key(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_global_importance_path() -> PathBuf { PathBuf::from("global_importance.png") }
fn default_local_importance_path() -> PathBuf { PathBuf::from("local_importance.png") }
fn default_subject_key() -> String { "SK_ID_CURR".to_string() }
fn default_cache_ttl_secs() -> u64 { 30 }
fn default_cache_capacity() -> u64 { 64 }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SCORING__)
    /// 5. `PORT` and `MODEL_PATH`
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SCORING__SERVER__WORKERS -> server.workers
            .add_source(scoring_environment())
            .build()?;

        let settings = apply_process_overrides(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(scoring_environment())
            .build()?;

        let settings = apply_process_overrides(settings)?;

        settings.try_deserialize()
    }
}

/// `SCORING__*` variables, kept as strings
///
/// Numeric fields are converted on deserialize. Parsing here would turn a
/// version like `2.0` into `2`.
fn scoring_environment() -> Environment {
    Environment::with_prefix("SCORING")
        .prefix_separator("__")
        .separator("__")
}

/// Apply the bare `PORT` and `MODEL_PATH` variables the deployment scripts set
fn apply_process_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(port) = env::var("PORT") {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::Message(format!("PORT is not a valid port: {}", port)))?;
        builder = builder.set_override("server.port", i64::from(port))?;
    }
    if let Ok(model_path) = env::var("MODEL_PATH") {
        builder = builder.set_override("model.artifact_path", model_path)?;
    }

    builder.build()
}
