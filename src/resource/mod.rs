//! Loading resources from the resource tree and turning search hits back into resources.

pub mod factory;

pub use factory::{
    ExternalResourceFactory, InternalMediaResourceFactory, InternalResourceFactory,
    ResourceFactory, ResourceFactoryChain,
};

use crate::error::{QuarryError, Result};
use crate::indexer::translation::{normalize_location, translation_locale};
use crate::types::{Resource, ResourceLanguage};
use std::path::{Path, PathBuf};

/// Source of resources, addressed by location.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, location: &str, lang: &ResourceLanguage) -> Result<Resource>;

    fn exists(&self, location: &str) -> bool;
}

/// Resources stored as JSON files below a base directory.
///
/// Translations live next to their base file (`a.json.translations/en_US.json`)
/// and may also be addressed as `a.json?loc=en_US`.
#[derive(Debug, Clone)]
pub struct JsonResourceLoader {
    base: PathBuf,
}

impl JsonResourceLoader {
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        JsonResourceLoader {
            base: base.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        self.base.join(location.trim_start_matches('/'))
    }
}

impl ResourceLoader for JsonResourceLoader {
    fn load(&self, location: &str, lang: &ResourceLanguage) -> Result<Resource> {
        let location = normalize_location(location);
        let path = self.resolve(&location);
        if !path.is_file() {
            return Err(QuarryError::ResourceNotFound(location));
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| QuarryError::resource_load(location.as_str(), e))?;
        let json = serde_json::from_str(&content)
            .map_err(|e| QuarryError::resource_load(location.as_str(), e))?;

        let lang = match translation_locale(&location) {
            Some(locale) => ResourceLanguage::of(locale),
            None => lang.clone(),
        };
        Resource::from_json(&location, json, &lang)
    }

    fn exists(&self, location: &str) -> bool {
        self.resolve(&normalize_location(location)).is_file()
    }
}
