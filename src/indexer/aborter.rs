use crate::error::Result;
use std::path::{Path, PathBuf};

/// Cross-process abort requests, signalled by a marker file in the work dir.
///
/// The marker `background-indexer-<type>-<key>.abort` only has to exist;
/// its content is ignored.
#[derive(Debug, Clone)]
pub struct IndexingAborter {
    work_dir: PathBuf,
    indexer_type: String,
}

impl IndexingAborter {
    pub fn new<P: AsRef<Path>>(work_dir: P, indexer_type: &str) -> Self {
        IndexingAborter {
            work_dir: work_dir.as_ref().to_path_buf(),
            indexer_type: indexer_type.to_string(),
        }
    }

    pub fn marker_path(&self, key: &str) -> PathBuf {
        self.work_dir
            .join(format!("background-indexer-{}-{}.abort", self.indexer_type, key))
    }

    pub fn request_abort(&self, key: &str) -> Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        std::fs::write(self.marker_path(key), b"")?;
        tracing::info!("[IDX {}] abort requested", key);
        Ok(())
    }

    pub fn should_abort(&self, key: &str) -> bool {
        self.marker_path(key).exists()
    }

    /// Remove the marker. A missing marker is not an error.
    pub fn reset(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.marker_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
