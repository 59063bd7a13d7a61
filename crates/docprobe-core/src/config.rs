use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Backend endpoint and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the backend (e.g. `https://xyz.supabase.co`). REST and storage
    /// APIs are reached under `/rest/v1` and `/storage/v1`.
    pub url: String,
    /// API key sent as `apikey` and `Authorization: Bearer`. Usually set via `DOCPROBE_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:54321".to_string(),
            api_key: None,
        }
    }
}

/// Where records and their documents live in the relational API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Table holding the records looked up by id.
    pub records_table: String,
    /// Name of the one-to-many relation from a record to its documents.
    pub documents_relation: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            records_table: "records".to_string(),
            documents_relation: "documents".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket that storage paths are relative to.
    pub bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "documents".to_string(),
        }
    }
}

/// Per-request timeouts applied to every outbound call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub connect_secs: u64,
    /// Whole-request limit, including the payload body.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 60,
        }
    }
}

/// Global configuration loaded from `~/.config/docprobe/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

pub const ENV_URL: &str = "DOCPROBE_URL";
pub const ENV_API_KEY: &str = "DOCPROBE_API_KEY";
pub const ENV_BUCKET: &str = "DOCPROBE_BUCKET";

impl ProbeConfig {
    /// Apply environment overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty(ENV_URL) {
            self.service.url = url;
        }
        if let Some(key) = non_empty(ENV_API_KEY) {
            self.service.api_key = Some(key);
        }
        if let Some(bucket) = non_empty(ENV_BUCKET) {
            self.storage.bucket = bucket;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(self.service.url.trim())
            .with_context(|| format!("service.url is not a valid URL: {:?}", self.service.url))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            bail!("service.url must be http or https, got {}", base.scheme());
        }
        if self.data.records_table.trim().is_empty() {
            bail!("data.records_table must not be empty");
        }
        if self.data.documents_relation.trim().is_empty() {
            bail!("data.documents_relation must not be empty");
        }
        if self.storage.bucket.trim().is_empty() {
            bail!("storage.bucket must not be empty");
        }
        if self.timeouts.connect_secs == 0 || self.timeouts.request_secs == 0 {
            bail!("timeouts must be at least one second");
        }
        Ok(())
    }

    /// Copy safe to print: the API key is masked.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if cfg.service.api_key.is_some() {
            cfg.service.api_key = Some("***".to_string());
        }
        cfg
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("docprobe")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Read the config file at `path`, writing the defaults there first if it is missing.
/// Values are not validated.
pub fn load_from(path: &Path) -> Result<ProbeConfig> {
    if !path.exists() {
        let default_cfg = ProbeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&data).with_context(|| format!("parse {}", path.display()))
}

/// Config file plus environment overrides, unvalidated. For showing a broken config.
pub fn load_unchecked() -> Result<ProbeConfig> {
    let mut cfg = load_from(&config_path()?)?;
    cfg.apply_env(|key| std::env::var(key).ok());
    Ok(cfg)
}
