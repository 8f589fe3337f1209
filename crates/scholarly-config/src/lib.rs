//! Shared configuration for Scholarly tools.
//!
//! TOML settings layered with environment overrides, translation to
//! `scholarly_core::EngineConfig`, and selection of the backing store.
//! The core crate never reads files; consumers go through here.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use scholarly_core::{CoreError, Engine, EngineConfig, FileStore, KeyValueStore, MemoryStore};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] CoreError),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub storage: Storage,

    #[serde(default)]
    pub subscription: SubscriptionSettings,

    #[serde(default)]
    pub links: Links,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// Where records are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per key under `data_dir`.
    #[default]
    File,
    /// Process memory; nothing survives exit.
    Memory,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Storage {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Overrides the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SubscriptionSettings {
    #[serde(default = "default_trial_days")]
    pub trial_days: i64,

    /// Seconds between expiry sweeps; 0 disables the background sweep.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    #[serde(default = "default_payment_request_ttl_days")]
    pub payment_request_ttl_days: i64,
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self {
            trial_days: default_trial_days(),
            sweep_interval_secs: default_sweep_interval_secs(),
            payment_request_ttl_days: default_payment_request_ttl_days(),
        }
    }
}

fn default_trial_days() -> i64 {
    scholarly_core::config::DEFAULT_TRIAL_DAYS
}
fn default_sweep_interval_secs() -> u64 {
    scholarly_core::config::DEFAULT_SWEEP_INTERVAL.as_secs()
}
fn default_payment_request_ttl_days() -> i64 {
    scholarly_core::config::DEFAULT_PAYMENT_REQUEST_TTL_DAYS
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Links {
    /// Origin the app is served from (e.g., "https://scholarly.example").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Serve routes under the production base path.
    #[serde(default)]
    pub production: bool,
}

impl Default for Links {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            production: false,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5173".into()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("app", "scholarly", "scholarly")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("scholarly");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default directory for the file store.
pub fn default_data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("data"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from `path` + environment.
///
/// Environment variables use the `SCHOLARLY_` prefix with `__` between
/// table and key, e.g. `SCHOLARLY_STORAGE__BACKEND=memory`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SCHOLARLY_").split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to core types ───────────────────────────────────────

/// Build an `EngineConfig` from the loaded settings.
pub fn to_engine_config(cfg: &Config) -> Result<EngineConfig, ConfigError> {
    let sub = &cfg.subscription;
    if sub.trial_days <= 0 {
        return Err(ConfigError::Validation {
            field: "subscription.trial_days".into(),
            reason: format!("must be positive, got {}", sub.trial_days),
        });
    }
    if sub.payment_request_ttl_days <= 0 {
        return Err(ConfigError::Validation {
            field: "subscription.payment_request_ttl_days".into(),
            reason: format!("must be positive, got {}", sub.payment_request_ttl_days),
        });
    }

    let mut link_base: url::Url =
        cfg.links
            .base_url
            .parse()
            .map_err(|_| ConfigError::Validation {
                field: "links.base_url".into(),
                reason: format!("invalid URL: {}", cfg.links.base_url),
            })?;
    let path = format!(
        "{}{}",
        link_base.path().trim_end_matches('/'),
        EngineConfig::base_path(cfg.links.production)
    );
    link_base.set_path(&path);

    Ok(EngineConfig {
        trial_days: sub.trial_days,
        sweep_interval: Duration::from_secs(sub.sweep_interval_secs),
        payment_request_ttl_days: sub.payment_request_ttl_days,
        link_base,
    })
}

/// Open the configured store. `data_dir` takes precedence over the
/// configured directory.
pub fn open_store(
    cfg: &Config,
    data_dir: Option<&Path>,
) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
    match cfg.storage.backend {
        StorageBackend::Memory => {
            debug!("using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::File => {
            let dir = data_dir
                .map(Path::to_path_buf)
                .or_else(|| cfg.storage.data_dir.clone())
                .unwrap_or_else(default_data_dir);
            Ok(Arc::new(FileStore::open(dir)?))
        }
    }
}

/// Build an [`Engine`] from config: translated settings over the
/// configured store.
pub fn build_engine(cfg: &Config, data_dir: Option<&Path>) -> Result<Engine, ConfigError> {
    let engine_config = to_engine_config(cfg)?;
    let store = open_store(cfg, data_dir)?;
    Ok(Engine::new(store, engine_config))
}
