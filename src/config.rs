use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_resource_extension() -> String {
    "json".to_string()
}

fn default_locale() -> String {
    "de_DE".to_string()
}

fn default_index() -> String {
    "www".to_string()
}

fn default_source() -> String {
    "internal".to_string()
}

fn default_chunk_size() -> usize {
    500
}

fn default_solr_url() -> String {
    "http://127.0.0.1:8983/solr".to_string()
}

/// Library configuration, passed explicitly to the components that need it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuarryConfig {
    #[serde(rename = "resourceDir")]
    pub resource_dir: PathBuf,

    #[serde(rename = "workDir")]
    pub work_dir: PathBuf,

    #[serde(rename = "resourceExtension", default = "default_resource_extension")]
    pub resource_extension: String,

    #[serde(rename = "defaultIndex", default = "default_index")]
    pub default_index: String,

    #[serde(rename = "defaultLocale", default = "default_locale")]
    pub default_locale: String,

    #[serde(rename = "solrUrl", default = "default_solr_url")]
    pub solr_url: String,

    #[serde(default = "default_source")]
    pub source: String,

    #[serde(rename = "cleanupThreshold")]
    pub cleanup_threshold: usize,

    #[serde(rename = "chunkSize", default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for QuarryConfig {
    fn default() -> Self {
        QuarryConfig {
            resource_dir: PathBuf::from("./resources"),
            work_dir: PathBuf::from("./var"),
            resource_extension: default_resource_extension(),
            default_index: default_index(),
            default_locale: default_locale(),
            solr_url: default_solr_url(),
            source: default_source(),
            cleanup_threshold: 0,
            chunk_size: default_chunk_size(),
        }
    }
}

impl QuarryConfig {
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: QuarryConfig = serde_json::from_str(&content)
            .map_err(|e| crate::error::QuarryError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Load `path` if it exists (falling back to defaults on parse errors),
    /// then apply `QUARRY_*` environment overrides.
    pub fn load_or_default(path: &Path) -> Self {
        let mut config = if path.exists() {
            match Self::load(path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::error!("Failed to load {}: {}, using defaults", path.display(), e);
                    QuarryConfig::default()
                }
            }
        } else {
            QuarryConfig::default()
        };
        config.apply_env();
        config
    }

    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("QUARRY_RESOURCE_DIR") {
            self.resource_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("QUARRY_WORK_DIR") {
            self.work_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("QUARRY_DEFAULT_INDEX") {
            self.default_index = v;
        }
        if let Ok(v) = std::env::var("QUARRY_SOLR_URL") {
            self.solr_url = v;
        }
        if let Ok(v) = std::env::var("QUARRY_CHUNK_SIZE") {
            match v.parse::<usize>() {
                Ok(size) if size > 0 => self.chunk_size = size,
                _ => tracing::warn!("Ignoring invalid QUARRY_CHUNK_SIZE={}", v),
            }
        }
        if let Ok(v) = std::env::var("QUARRY_CLEANUP_THRESHOLD") {
            match v.parse::<usize>() {
                Ok(threshold) => self.cleanup_threshold = threshold,
                Err(_) => tracing::warn!("Ignoring invalid QUARRY_CLEANUP_THRESHOLD={}", v),
            }
        }
    }
}
