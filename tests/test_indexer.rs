mod common;

use common::{page, write_raw, Fixture};
use quarry::indexer::{ErrorCollectingProgressHandler, IndexerProgressHandler, IndexingAborter};
use quarry::{IndexerParameter, IndexerState, IndexerStatus, QuarryError};
use serde_json::json;
use std::sync::Arc;

fn parameter(fixture: &Fixture, chunk_size: usize, cleanup_threshold: usize) -> IndexerParameter {
    IndexerParameter {
        chunk_size,
        cleanup_threshold,
        ..IndexerParameter::from_config(&fixture.config)
    }
}

/// Requests an abort as soon as the first chunk has been loaded, the way a
/// second process would while a run is in progress.
struct AbortingProgressHandler {
    inner: Arc<dyn IndexerProgressHandler>,
    aborter: IndexingAborter,
    key: String,
}

impl IndexerProgressHandler for AbortingProgressHandler {
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
        self.aborter.request_abort(&self.key).unwrap();
    }

    fn skip(&self, step: usize) {
        self.inner.skip(step);
    }

    fn error(&self, error: &QuarryError) {
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

#[test]
fn test_end_to_end_with_translations_and_load_error() {
    let fixture = Fixture::new(&["www", "www-en"]);
    let pages = fixture.add_pages("/pages", 11);
    write_raw(fixture.resources(), "/pages/broken.json", "{ not json");
    fixture.add(
        &format!("{}.translations/en_US.json", pages[0]),
        page("p000", "Page 0 (en)"),
    );
    fixture.add(
        &format!("{}.translations/en_US.json", pages[1]),
        page("p001", "Page 1 (en)"),
    );

    let status = fixture
        .indexer()
        .index(&parameter(&fixture, 10, 0))
        .unwrap();

    assert_eq!(status.state, IndexerState::Finished);
    assert_eq!(status.total, 14);
    assert_eq!(status.errors, 1);
    assert_eq!(status.processed, 13);
    assert_eq!(status.skipped, 0);
    assert!(status.end_time.is_some());

    let base_batches = fixture.engine.batch_sizes("www");
    assert_eq!(base_batches.len(), 2);
    assert_eq!(base_batches.iter().sum::<usize>(), 11);
    assert_eq!(fixture.engine.batch_sizes("www-en"), vec![2]);

    let translated = fixture.engine.submitted_ids("www-en");
    assert_eq!(translated, vec!["p000", "p001"]);
    assert_eq!(fixture.engine.commits(), vec!["www", "www-en"]);
}

#[test]
fn test_chunk_count_and_last_chunk_size() {
    let fixture = Fixture::new(&["www"]);
    fixture.add_pages("/news", 25);

    fixture
        .indexer()
        .index(&parameter(&fixture, 10, 0))
        .unwrap();

    assert_eq!(fixture.engine.batch_sizes("www"), vec![10, 10, 5]);
}

#[test]
fn test_exact_multiple_of_chunk_size() {
    let fixture = Fixture::new(&["www"]);
    fixture.add_pages("/news", 20);

    fixture
        .indexer()
        .index(&parameter(&fixture, 10, 0))
        .unwrap();

    assert_eq!(fixture.engine.batch_sizes("www"), vec![10, 10]);
}

#[test]
fn test_documents_carry_source_and_process_id() {
    let fixture = Fixture::new(&["www"]);
    fixture.add_pages("/news", 3);

    fixture
        .indexer()
        .index(&parameter(&fixture, 10, 0))
        .unwrap();

    let updates = fixture.engine.updates.lock().unwrap();
    let docs = &updates[0].documents;
    let pid = docs[0]["crawl_process_id"].as_str().unwrap().to_string();
    for doc in docs {
        assert_eq!(doc["sp_source"], json!(["internal"]));
        assert_eq!(doc["crawl_process_id"], json!(pid));
        assert_eq!(doc["sp_canonical"], json!(true));
    }
}

#[test]
fn test_skipped_resources_are_processed_not_errors() {
    let fixture = Fixture::new(&["www"]);
    fixture.add_pages("/news", 3);
    let mut hidden = page("hidden", "Hidden");
    hidden["metadata"]["noIndex"] = json!(true);
    fixture.add("/news/hidden.json", hidden);

    let status = fixture
        .indexer()
        .index(&parameter(&fixture, 10, 0))
        .unwrap();

    assert_eq!(status.processed, 4);
    assert_eq!(status.skipped, 1);
    assert_eq!(status.errors, 0);
    assert_eq!(status.updated, 3);
    assert_eq!(fixture.engine.submitted_ids("www").len(), 3);
}

#[test]
fn test_abort_before_first_chunk() {
    let fixture = Fixture::new(&["www"]);
    fixture.add_pages("/news", 5);
    let indexer = fixture.indexer();

    indexer.abort().unwrap();
    let marker = fixture
        .config
        .work_dir
        .join("background-indexer-internal-www.abort");
    assert!(marker.exists());

    let status = indexer.index(&parameter(&fixture, 2, 1)).unwrap();

    assert_eq!(status.state, IndexerState::Aborted);
    assert!(fixture.engine.batch_sizes("www").is_empty());
    assert!(fixture.engine.deletes().is_empty());
    assert!(!marker.exists());

    let status = indexer.index(&parameter(&fixture, 2, 0)).unwrap();
    assert_eq!(status.state, IndexerState::Finished);
    assert_eq!(fixture.engine.batch_sizes("www"), vec![2, 2, 1]);
}

#[test]
fn test_abort_during_run_stops_at_next_chunk() {
    let fixture = Fixture::new(&["www", "www-en"]);
    let pages = fixture.add_pages("/news", 4);
    fixture.add(
        &format!("{}.translations/en_US.json", pages[0]),
        page("p000", "English"),
    );
    let indexer = fixture.indexer();
    let aborter = IndexingAborter::new(&fixture.config.work_dir, "internal");
    indexer.set_progress_handler(Arc::new(AbortingProgressHandler {
        inner: indexer.progress_handler(),
        aborter: aborter.clone(),
        key: "www".to_string(),
    }));

    let status = indexer.index(&parameter(&fixture, 2, 1)).unwrap();

    assert_eq!(status.state, IndexerState::Aborted);
    assert_eq!(status.total, 5);
    assert_eq!(status.processed, 2);
    assert!(status.end_time.is_some());
    assert_eq!(fixture.engine.batch_sizes("www"), vec![2]);
    assert!(fixture.engine.batch_sizes("www-en").is_empty());
    assert!(fixture.engine.deletes().is_empty());
    assert_eq!(fixture.engine.commits(), vec!["www"]);
    assert!(!aborter.should_abort("www"));
}

#[test]
fn test_chunk_without_loadable_resources_does_not_stop_run() {
    let fixture = Fixture::new(&["www"]);
    write_raw(fixture.resources(), "/a/broken0.json", "{ not json");
    write_raw(fixture.resources(), "/a/broken1.json", "{ not json");
    fixture.add_pages("/b", 2);

    let status = fixture
        .indexer()
        .index(&parameter(&fixture, 2, 0))
        .unwrap();

    assert_eq!(status.state, IndexerState::Finished);
    assert_eq!(status.total, 4);
    assert_eq!(status.errors, 2);
    assert_eq!(status.processed, 2);
    assert_eq!(fixture.engine.batch_sizes("www"), vec![2]);
    assert_eq!(fixture.engine.submitted_ids("www"), vec!["p000", "p001"]);
    assert_eq!(fixture.engine.commits(), vec!["www"]);
}

#[test]
fn test_cleanup_threshold_boundary() {
    let below = Fixture::new(&["www"]);
    below.add_pages("/news", 4);
    below
        .indexer()
        .index(&parameter(&below, 10, 5))
        .unwrap();
    assert!(below.engine.deletes().is_empty());

    let at = Fixture::new(&["www"]);
    at.add_pages("/news", 5);
    at.indexer().index(&parameter(&at, 10, 5)).unwrap();

    let deletes = at.engine.deletes();
    assert_eq!(deletes.len(), 1);
    let (index, query) = &deletes[0];
    assert_eq!(index, "www");
    let pid = at.engine.updates.lock().unwrap()[0].documents[0]["crawl_process_id"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(
        query,
        &format!("sp_source:internal AND -crawl_process_id:{}", pid)
    );
}

#[test]
fn test_cleanup_disabled_with_zero_threshold() {
    let fixture = Fixture::new(&["www"]);
    fixture.add_pages("/news", 5);
    fixture
        .indexer()
        .index(&parameter(&fixture, 10, 0))
        .unwrap();
    assert!(fixture.engine.deletes().is_empty());
}

#[test]
fn test_update_run_never_cleans_up_and_accumulates() {
    let fixture = Fixture::new(&["www"]);
    let pages = fixture.add_pages("/news", 3);
    let indexer = fixture.indexer();

    let full = indexer.index(&parameter(&fixture, 10, 0)).unwrap();
    assert_eq!(full.total, 3);

    let update = indexer
        .index(&parameter(&fixture, 10, 1).with_paths(vec![pages[0].clone()]))
        .unwrap();

    assert!(fixture.engine.deletes().is_empty());
    assert_eq!(update.total, 4);
    assert_eq!(update.processed, 4);
    assert_eq!(update.start_time, full.start_time);
    assert_eq!(update.end_time, full.end_time);
}

#[test]
fn test_update_run_with_directory_and_loc_query() {
    let fixture = Fixture::new(&["www", "www-en"]);
    let pages = fixture.add_pages("/news", 2);
    fixture.add_pages("/events", 2);
    fixture.add(
        &format!("{}.translations/en_US.json", pages[0]),
        page("p000", "English"),
    );

    let status = fixture
        .indexer()
        .index(&parameter(&fixture, 10, 0).with_paths(vec![
            "/events".to_string(),
            "/events/p000.json".to_string(),
            format!("{}?loc=en_US", pages[0]),
            "/missing.json".to_string(),
        ]))
        .unwrap();

    assert_eq!(status.total, 3);
    assert_eq!(fixture.engine.batch_sizes("www"), vec![2]);
    assert_eq!(fixture.engine.submitted_ids("www-en"), vec!["p000"]);
}

#[test]
fn test_missing_language_index_skips_group() {
    let fixture = Fixture::new(&["www"]);
    let pages = fixture.add_pages("/news", 2);
    fixture.add(
        &format!("{}.translations/it_IT.json", pages[0]),
        page("p000", "Italiano"),
    );

    let status = fixture
        .indexer()
        .index(&parameter(&fixture, 10, 0))
        .unwrap();

    assert_eq!(status.state, IndexerState::Finished);
    assert_eq!(status.errors, 1);
    assert_eq!(fixture.engine.batch_sizes("www"), vec![2]);
    assert!(fixture.engine.batch_sizes("www-it").is_empty());
    assert_eq!(fixture.engine.commits(), vec!["www"]);
}

#[test]
fn test_default_locale_translation_goes_to_base_index() {
    let fixture = Fixture::new(&["www"]);
    assert_eq!(fixture.config.default_locale, "de_DE");
    let pages = fixture.add_pages("/news", 2);
    fixture.add(
        &format!("{}.translations/de_DE.json", pages[0]),
        page("p000", "Deutsch"),
    );

    let status = fixture
        .indexer()
        .index(&parameter(&fixture, 10, 0))
        .unwrap();

    assert_eq!(status.state, IndexerState::Finished);
    assert_eq!(status.errors, 0);
    assert_eq!(status.processed, 3);
    assert_eq!(fixture.engine.submitted_ids("www"), vec!["p000", "p001", "p000"]);
    assert!(fixture.engine.batch_sizes("www-de").is_empty());
}

#[test]
fn test_rejected_update_is_recorded_and_processed() {
    let fixture = Fixture::new(&["www"]);
    fixture.add_pages("/news", 3);
    fixture.engine.reject_updates(400);

    let status = fixture
        .indexer()
        .index(&parameter(&fixture, 2, 1))
        .unwrap();

    assert_eq!(status.state, IndexerState::Finished);
    assert_eq!(status.errors, 2);
    assert_eq!(status.processed, 3);
    assert!(fixture.engine.deletes().is_empty());
}

#[test]
fn test_empty_tree_is_noop() {
    let fixture = Fixture::new(&["www"]);

    let status = fixture
        .indexer()
        .index(&parameter(&fixture, 10, 0))
        .unwrap();

    assert_eq!(status.state, IndexerState::Idle);
    assert_eq!(status.total, 0);
    assert!(fixture.engine.batch_sizes("www").is_empty());
    assert!(fixture.engine.commits().is_empty());
}

#[test]
fn test_zero_chunk_size_is_rejected() {
    let fixture = Fixture::new(&["www"]);
    fixture.add_pages("/news", 1);

    let err = fixture
        .indexer()
        .index(&parameter(&fixture, 0, 0))
        .unwrap_err();
    assert!(matches!(err, QuarryError::InvalidParameter(_)));
}

#[test]
fn test_error_collecting_handler_swap() {
    let fixture = Fixture::new(&["www"]);
    fixture.add_pages("/news", 2);
    write_raw(fixture.resources(), "/news/broken.json", "[]");
    let indexer = fixture.indexer();

    let collecting = Arc::new(ErrorCollectingProgressHandler::new(indexer.progress_handler()));
    let previous =
        indexer.set_progress_handler(Arc::clone(&collecting) as Arc<dyn IndexerProgressHandler>);

    let status = indexer.index(&parameter(&fixture, 10, 0)).unwrap();
    indexer.set_progress_handler(previous);

    assert_eq!(status.errors, 1);
    let errors = collecting.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("/news/broken.json"), "{}", errors[0]);
}

#[test]
fn test_status_is_persisted_in_work_dir() {
    let fixture = Fixture::new(&["www"]);
    fixture.add_pages("/news", 2);
    fixture
        .indexer()
        .index(&parameter(&fixture, 10, 0))
        .unwrap();

    let path = fixture
        .config
        .work_dir
        .join("background-indexer-status-www-internal.json");
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(stored["state"], "FINISHED");
    assert_eq!(stored["processed"], 2);
}

#[test]
fn test_remove_ids_from_managed_indexes() {
    let fixture = Fixture::new(&["www", "www-en", "intranet"]);
    let indexer = fixture.indexer();

    indexer.remove(&[]).unwrap();
    assert!(fixture.engine.deletes().is_empty());

    indexer
        .remove(&["12".to_string(), "a b".to_string()])
        .unwrap();

    let deletes = fixture.engine.deletes();
    assert_eq!(deletes.len(), 2);
    assert_eq!(deletes[0].0, "www");
    assert_eq!(deletes[1].0, "www-en");
    assert_eq!(deletes[0].1, "sp_source:internal AND sp_id:(12 \"a b\")");
    assert_eq!(fixture.engine.commits(), vec!["www", "www-en"]);
}

#[test]
fn test_indexer_identity() {
    let fixture = Fixture::new(&["www"]);
    let indexer = fixture.indexer();
    assert_eq!(indexer.name(), "Internal resources");
    assert_eq!(indexer.source(), "internal");
    assert!(indexer.enabled());
}
