use crate::types::ResourceLocation;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Finds indexable resource files below a resource base directory.
///
/// Locations are returned base-relative with a leading `/`, sorted.
#[derive(Debug, Clone)]
pub struct LocationFinder {
    base: PathBuf,
    extension: String,
}

impl LocationFinder {
    pub fn new<P: AsRef<Path>>(base: P, extension: &str) -> Self {
        LocationFinder {
            base: base.as_ref().to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn find_all(&self) -> Vec<ResourceLocation> {
        let mut locations = self.walk(&self.base);
        locations.sort();
        locations
    }

    /// Files are taken verbatim, directories expanded recursively, missing
    /// entries dropped. A location named twice, directly or through a
    /// directory, is kept at its first position.
    pub fn find_paths(&self, paths: &[ResourceLocation]) -> Vec<ResourceLocation> {
        let mut seen = HashSet::new();
        let mut locations = Vec::new();
        for location in paths {
            let full = self.resolve(location);
            let found = if full.is_file() {
                vec![location.clone()]
            } else if full.is_dir() {
                let mut found = self.walk(&full);
                found.sort();
                found
            } else {
                tracing::debug!("Skipping missing location {}", location);
                continue;
            };
            for location in found {
                if seen.insert(location.clone()) {
                    locations.push(location);
                }
            }
        }
        locations
    }

    fn resolve(&self, location: &str) -> PathBuf {
        self.base.join(location.trim_start_matches('/'))
    }

    fn walk(&self, dir: &Path) -> Vec<ResourceLocation> {
        let mut locations = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Error reading {}: {}", dir.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.has_extension(entry.path()) {
                continue;
            }
            if let Some(location) = self.to_location(entry.path()) {
                locations.push(location);
            }
        }
        locations
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }

    fn to_location(&self, path: &Path) -> Option<ResourceLocation> {
        let relative = path.strip_prefix(&self.base).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()?;
        Some(format!("/{}", parts.join("/")))
    }
}
