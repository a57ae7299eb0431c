//! Indexing pipeline: find resource locations, split them by language, load,
//! enrich and submit them chunk by chunk, clean up stale documents and commit.

pub mod aborter;
pub mod contact;
pub mod content;
pub mod document;
pub mod enricher;
pub mod finder;
pub mod index_name;
pub mod progress;
pub mod status;
pub mod translation;

pub use aborter::IndexingAborter;
pub use contact::ContactPointTransformer;
pub use content::{ContentCollector, ContentMatcher, HeadlineMatcher, RichTextMatcher};
pub use document::Schema2xDocument;
pub use enricher::{DocumentEnricher, EnricherChain, Schema2xDocumentEnricher};
pub use finder::LocationFinder;
pub use index_name::IndexName;
pub use progress::{
    BackgroundIndexerProgressHandler, ErrorCollectingProgressHandler, IndexerProgressHandler,
};
pub use status::{
    status_key, FileIndexerStatusStore, IndexerState, IndexerStatus, IndexerStatusStore,
    MemoryIndexerStatusStore,
};
pub use translation::{normalize_location, TranslationSplitter, TranslationSplitterResult};

use crate::config::QuarryConfig;
use crate::engine::SearchEngineClient;
use crate::error::{QuarryError, Result};
use crate::query::format_term;
use crate::resource::ResourceLoader;
use crate::types::{Resource, ResourceLanguage, ResourceLocation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock};

fn default_enabled() -> bool {
    true
}

/// Identity of one indexer: the source it feeds and its display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexerConfiguration {
    pub source: String,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl IndexerConfiguration {
    pub fn new(source: impl Into<String>, name: impl Into<String>) -> Self {
        IndexerConfiguration {
            source: source.into(),
            name: name.into(),
            enabled: true,
            data: Map::new(),
        }
    }
}

/// Options of one [`Indexer::index`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexerParameter {
    /// Overrides the configured default index.
    pub index: Option<String>,
    pub cleanup_threshold: usize,
    pub chunk_size: usize,
    /// Locations or directories to index; empty means a full run.
    pub paths: Vec<ResourceLocation>,
}

impl IndexerParameter {
    pub fn from_config(config: &QuarryConfig) -> Self {
        IndexerParameter {
            index: None,
            cleanup_threshold: config.cleanup_threshold,
            chunk_size: config.chunk_size,
            paths: Vec::new(),
        }
    }

    pub fn with_paths(mut self, paths: Vec<ResourceLocation>) -> Self {
        self.paths = paths;
        self
    }

    pub fn is_full_run(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Chunk starting at `offset`, clamped to the list; `None` once exhausted.
pub(crate) fn next_chunk<T>(items: &[T], offset: usize, length: usize) -> Option<&[T]> {
    if length == 0 || offset >= items.len() {
        return None;
    }
    let end = offset.saturating_add(length).min(items.len());
    Some(&items[offset..end])
}

struct GroupOutcome {
    indexed: usize,
    aborted: bool,
}

pub struct Indexer {
    configuration: IndexerConfiguration,
    index_name: IndexName,
    finder: LocationFinder,
    loader: Arc<dyn ResourceLoader>,
    splitter: TranslationSplitter,
    enrichers: EnricherChain,
    engine: Arc<dyn SearchEngineClient>,
    aborter: IndexingAborter,
    progress: RwLock<Arc<dyn IndexerProgressHandler>>,
}

impl Indexer {
    /// Indexer over `config.resource_dir` with the default enricher and a
    /// status file in `config.work_dir`.
    pub fn new(
        config: &QuarryConfig,
        configuration: IndexerConfiguration,
        loader: Arc<dyn ResourceLoader>,
        engine: Arc<dyn SearchEngineClient>,
    ) -> Self {
        let store: Arc<dyn IndexerStatusStore> =
            Arc::new(FileIndexerStatusStore::new(&config.work_dir));
        let progress: Arc<dyn IndexerProgressHandler> = Arc::new(
            BackgroundIndexerProgressHandler::new(
                store,
                status_key(&config.default_index, &configuration.source),
            ),
        );
        let enrichers = EnricherChain::new(vec![Arc::new(Schema2xDocumentEnricher::new(
            Arc::clone(&loader),
            &config.default_locale,
        ))]);

        Indexer {
            aborter: IndexingAborter::new(&config.work_dir, &configuration.source),
            configuration,
            index_name: IndexName::new(config.default_index.as_str())
                .with_default_locale(config.default_locale.as_str()),
            finder: LocationFinder::new(&config.resource_dir, &config.resource_extension),
            loader,
            splitter: TranslationSplitter::new(),
            enrichers,
            engine,
            progress: RwLock::new(progress),
        }
    }

    pub fn with_enrichers(mut self, enrichers: EnricherChain) -> Self {
        self.enrichers = enrichers;
        self
    }

    pub fn with_progress_handler(self, handler: Arc<dyn IndexerProgressHandler>) -> Self {
        self.set_progress_handler(handler);
        self
    }

    pub fn name(&self) -> &str {
        &self.configuration.name
    }

    pub fn source(&self) -> &str {
        &self.configuration.source
    }

    pub fn enabled(&self) -> bool {
        self.configuration.enabled
    }

    pub fn index_name(&self) -> &IndexName {
        &self.index_name
    }

    pub fn progress_handler(&self) -> Arc<dyn IndexerProgressHandler> {
        Arc::clone(&self.progress.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Install `handler` and return the one it replaces.
    pub fn set_progress_handler(
        &self,
        handler: Arc<dyn IndexerProgressHandler>,
    ) -> Arc<dyn IndexerProgressHandler> {
        let mut current = self.progress.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *current, handler)
    }

    /// Ask a running (or the next) run to stop at its next chunk boundary.
    pub fn abort(&self) -> Result<()> {
        self.aborter.request_abort(self.index_name.default_index())
    }

    pub fn index(&self, parameter: &IndexerParameter) -> Result<IndexerStatus> {
        if parameter.chunk_size == 0 {
            return Err(QuarryError::InvalidParameter(
                "chunk size must be greater than 0".to_string(),
            ));
        }

        let index_name = match &parameter.index {
            Some(index) => self.index_name.rebase(index.as_str()),
            None => self.index_name.clone(),
        };
        let base_key = index_name.default_index().to_string();
        let full_run = parameter.is_full_run();
        let progress = self.progress_handler();

        let locations = if full_run {
            progress.prepare("collecting resource locations");
            self.finder.find_all()
        } else {
            let normalized: Vec<ResourceLocation> = parameter
                .paths
                .iter()
                .map(|p| normalize_location(p))
                .collect();
            self.finder.find_paths(&normalized)
        };

        if locations.is_empty() {
            tracing::info!("[IDX {}] nothing to index", base_key);
            if full_run {
                progress.finish();
            }
            return Ok(IndexerStatus::default());
        }

        let process_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            "[IDX {}] {} run over {} locations, process {}",
            base_key,
            if full_run { "full" } else { "update" },
            locations.len(),
            process_id
        );

        if full_run {
            progress.start(locations.len());
        } else {
            progress.start_update(locations.len());
        }

        let available = match self.engine.available_indexes() {
            Ok(indexes) => indexes,
            Err(e) => {
                progress.error(&e);
                progress.finish();
                return Ok(progress.get_status());
            }
        };

        let split = self.splitter.split(&locations);
        let mut groups: Vec<(ResourceLanguage, &[ResourceLocation])> =
            vec![(ResourceLanguage::default_language(), split.bases())];
        for lang in split.locales() {
            let translations = split.translations(&lang);
            groups.push((lang, translations));
        }

        let mut aborted = false;
        for (lang, group) in groups {
            if group.is_empty() {
                continue;
            }
            let index = index_name.for_language(&lang);
            if !available.contains(&index) {
                tracing::warn!(
                    "[IDX {}] index not available, skipping {} locations",
                    index,
                    group.len()
                );
                progress.error(&QuarryError::IndexNotFound(index));
                continue;
            }

            let outcome =
                self.index_group(&index, &lang, group, parameter, &process_id, &base_key, &progress);

            if !outcome.aborted && full_run {
                self.cleanup(&index, outcome.indexed, parameter.cleanup_threshold, &process_id, &progress);
            }
            self.commit(&index, &progress);

            if outcome.aborted {
                aborted = true;
                break;
            }
        }

        if !aborted {
            progress.finish();
        }
        let status = progress.get_status();
        tracing::info!("[IDX {}] {}", base_key, status.status_line());
        Ok(status)
    }

    #[allow(clippy::too_many_arguments)]
    fn index_group(
        &self,
        index: &str,
        lang: &ResourceLanguage,
        locations: &[ResourceLocation],
        parameter: &IndexerParameter,
        process_id: &str,
        abort_key: &str,
        progress: &Arc<dyn IndexerProgressHandler>,
    ) -> GroupOutcome {
        tracing::info!(
            "[IDX {}] indexing {} locations ({})",
            index,
            locations.len(),
            if lang.is_default() { "base" } else { lang.locale() }
        );

        let mut indexed = 0;
        let mut offset = 0;
        while let Some(chunk) = next_chunk(locations, offset, parameter.chunk_size) {
            offset += parameter.chunk_size;

            if self.aborter.should_abort(abort_key) {
                tracing::info!("[IDX {}] abort requested, stopping", index);
                if let Err(e) = self.aborter.reset(abort_key) {
                    tracing::warn!("[IDX {}] unable to remove abort marker: {}", index, e);
                }
                progress.abort();
                return GroupOutcome {
                    indexed,
                    aborted: true,
                };
            }

            indexed += self.index_chunk(index, lang, chunk, process_id, progress);
        }

        GroupOutcome {
            indexed,
            aborted: false,
        }
    }

    /// Load, enrich and submit one chunk; returns the number of documents
    /// the engine accepted.
    fn index_chunk(
        &self,
        index: &str,
        lang: &ResourceLanguage,
        chunk: &[ResourceLocation],
        process_id: &str,
        progress: &Arc<dyn IndexerProgressHandler>,
    ) -> usize {
        let resources: Vec<Resource> = chunk
            .iter()
            .filter_map(|location| match self.loader.load(location, lang) {
                Ok(resource) => Some(resource),
                Err(e) => {
                    progress.error(&e);
                    None
                }
            })
            .collect();
        progress.advance(resources.len());

        let mut batch = self.engine.create_update_batch(index);
        let mut skipped = 0;
        for resource in &resources {
            match self.enrichers.enrich(resource, process_id) {
                Ok(Some(mut doc)) => {
                    doc.sp_source = vec![self.configuration.source.clone()];
                    batch.add_document(doc.to_fields());
                }
                Ok(None) => skipped += 1,
                Err(e) => progress.error(&e),
            }
        }
        if skipped > 0 {
            progress.skip(skipped);
        }

        if batch.is_empty() {
            tracing::debug!("[IDX {}] chunk of {} produced no documents", index, chunk.len());
            return 0;
        }

        let count = batch.len();
        tracing::debug!("[IDX {}] submitting {} documents", index, count);
        match self.engine.update(batch) {
            Ok(result) if result.is_success() => count,
            Ok(result) => {
                tracing::warn!(
                    "[IDX {}] update rejected with status {}",
                    index,
                    result.status
                );
                progress.error(&QuarryError::UpdateRejected {
                    index: index.to_string(),
                    status: result.status,
                    message: result.status_message,
                });
                0
            }
            Err(e) => {
                progress.error(&e);
                0
            }
        }
    }

    fn cleanup(
        &self,
        index: &str,
        indexed: usize,
        threshold: usize,
        process_id: &str,
        progress: &Arc<dyn IndexerProgressHandler>,
    ) {
        if threshold == 0 || indexed < threshold {
            return;
        }
        let query = format!(
            "sp_source:{} AND -crawl_process_id:{}",
            format_term(self.source()),
            format_term(process_id)
        );
        tracing::info!("[IDX {}] removing stale documents: {}", index, query);
        if let Err(e) = self.engine.delete_by_query(index, &query) {
            progress.error(&e);
        }
    }

    fn commit(&self, index: &str, progress: &Arc<dyn IndexerProgressHandler>) {
        if let Err(e) = self
            .engine
            .commit(index)
            .and_then(|_| self.engine.optimize(index))
        {
            progress.error(&e);
        }
    }

    /// Delete the documents with the given ids of this source from every
    /// managed index, then commit.
    pub fn remove(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let terms: Vec<String> = ids.iter().map(|id| format_term(id)).collect();
        let query = format!(
            "sp_source:{} AND sp_id:({})",
            format_term(self.source()),
            terms.join(" ")
        );

        let indexes: Vec<String> = self
            .engine
            .available_indexes()?
            .into_iter()
            .filter(|name| self.index_name.is_managed(name))
            .collect();

        for index in &indexes {
            tracing::info!("[IDX {}] removing {} documents", index, ids.len());
            self.engine.delete_by_query(index, &query)?;
        }
        for index in &indexes {
            self.engine.commit(index)?;
        }
        Ok(())
    }
}
