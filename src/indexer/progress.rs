use super::status::{IndexerState, IndexerStatus, IndexerStatusStore};
use crate::error::QuarryError;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};

/// Receives progress events of an indexer run.
pub trait IndexerProgressHandler: Send + Sync {
    fn prepare(&self, message: &str);

    /// Begin a full run; counters and error markers are reset.
    fn start(&self, total: usize);

    /// Begin an update run; `total` is added to the stored total and the
    /// start time is kept.
    fn start_update(&self, total: usize);

    fn advance(&self, step: usize);

    fn skip(&self, step: usize);

    fn error(&self, error: &QuarryError);

    fn finish(&self);

    fn abort(&self);

    fn get_status(&self) -> IndexerStatus;
}

struct Progress {
    status: IndexerStatus,
    update_run: bool,
}

/// Handler that persists every change through an [`IndexerStatusStore`], so
/// another process can read the status of a background run.
pub struct BackgroundIndexerProgressHandler {
    store: Arc<dyn IndexerStatusStore>,
    key: String,
    progress: Mutex<Progress>,
}

impl BackgroundIndexerProgressHandler {
    pub fn new(store: Arc<dyn IndexerStatusStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let status = match store.load(&key) {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("[IDX {}] unable to load status: {}", key, e);
                IndexerStatus::default()
            }
        };
        BackgroundIndexerProgressHandler {
            store,
            key,
            progress: Mutex::new(Progress {
                status,
                update_run: false,
            }),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn lock(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update<F: FnOnce(&mut Progress)>(&self, f: F) {
        let mut progress = self.lock();
        f(&mut progress);
        progress.status.last_update = Some(Utc::now());
        if let Err(e) = self.store.store(&self.key, &progress.status) {
            tracing::warn!("[IDX {}] unable to store status: {}", self.key, e);
        }
    }
}

impl IndexerProgressHandler for BackgroundIndexerProgressHandler {
    fn prepare(&self, message: &str) {
        self.update(|p| {
            p.status.state = IndexerState::Preparing;
            p.status.prepare_message = Some(message.to_string());
        });
    }

    fn start(&self, total: usize) {
        self.update(|p| {
            p.update_run = false;
            p.status = IndexerStatus {
                state: IndexerState::Running,
                start_time: Some(Utc::now()),
                total,
                ..Default::default()
            };
        });
    }

    fn start_update(&self, total: usize) {
        self.update(|p| {
            p.update_run = true;
            p.status.state = IndexerState::Running;
            p.status.prepare_message = None;
            p.status.total += total;
            if p.status.start_time.is_none() {
                p.status.start_time = Some(Utc::now());
            }
        });
    }

    fn advance(&self, step: usize) {
        self.update(|p| {
            p.status.processed += step;
            p.status.updated += step;
        });
    }

    fn skip(&self, step: usize) {
        self.update(|p| {
            p.status.skipped += step;
            p.status.updated = p.status.updated.saturating_sub(step);
        });
    }

    fn error(&self, error: &QuarryError) {
        tracing::error!("[IDX {}] {}", self.key, error);
        self.update(|p| p.status.errors += 1);
    }

    fn finish(&self) {
        self.update(|p| {
            if p.status.state != IndexerState::Aborted {
                p.status.state = IndexerState::Finished;
            }
            if !p.update_run {
                p.status.end_time = Some(Utc::now());
            }
        });
    }

    fn abort(&self) {
        self.update(|p| {
            p.status.state = IndexerState::Aborted;
            p.status.end_time = Some(Utc::now());
        });
    }

    fn get_status(&self) -> IndexerStatus {
        self.lock().status.clone()
    }
}

/// Decorator buffering error messages while delegating everything.
pub struct ErrorCollectingProgressHandler {
    inner: Arc<dyn IndexerProgressHandler>,
    errors: Mutex<Vec<String>>,
}

impl ErrorCollectingProgressHandler {
    pub fn new(inner: Arc<dyn IndexerProgressHandler>) -> Self {
        ErrorCollectingProgressHandler {
            inner,
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn inner(&self) -> Arc<dyn IndexerProgressHandler> {
        Arc::clone(&self.inner)
    }
}

impl IndexerProgressHandler for ErrorCollectingProgressHandler {
    fn prepare(&self, message: &str) {
        self.inner.prepare(message);
    }

    fn start(&self, total: usize) {
        self.inner.start(total);
    }

    fn start_update(&self, total: usize) {
        self.inner.start_update(total);
    }

    fn advance(&self, step: usize) {
        self.inner.advance(step);
    }

    fn skip(&self, step: usize) {
        self.inner.skip(step);
    }

    fn error(&self, error: &QuarryError) {
        self.errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(error.to_string());
        self.inner.error(error);
    }

    fn finish(&self) {
        self.inner.finish();
    }

    fn abort(&self) {
        self.inner.abort();
    }

    fn get_status(&self) -> IndexerStatus {
        self.inner.get_status()
    }
}
