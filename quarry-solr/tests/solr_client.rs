use quarry::engine::{SearchEngineClient, SolrParams, UpdateBatch};
use quarry::QuarryError;
use quarry_solr::SolrClient;
use serde_json::{json, Map};
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The blocking client must not run on the async test runtime.
async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/solr/www/update"))
        .and(body_json(json!([{"sp_id": "1"}])))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"responseHeader": {"status": 0, "QTime": 3}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/solr", server.uri());
    let result = blocking(move || {
        let client = SolrClient::new(&base);
        let mut batch = client.create_update_batch("www");
        let mut doc = Map::new();
        doc.insert("sp_id".to_string(), json!("1"));
        batch.add_document(doc);
        client.update(batch)
    })
    .await
    .unwrap();

    assert!(result.is_success());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_rejected_by_solr() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/solr/www/update"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "responseHeader": {"status": 400},
            "error": {"msg": "unknown field 'foo'", "code": 400}
        })))
        .mount(&server)
        .await;

    let base = format!("{}/solr", server.uri());
    let result = blocking(move || SolrClient::new(&base).update(UpdateBatch::new("www")))
        .await
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.status, 400);
    assert_eq!(result.status_message, "unknown field 'foo'");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_is_search_engine_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/solr/www/update"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let base = format!("{}/solr", server.uri());
    let err = blocking(move || SolrClient::new(&base).commit("www"))
        .await
        .unwrap_err();

    assert!(matches!(err, QuarryError::SearchEngine(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_commit_optimize_bodies() {
    let server = MockServer::start().await;
    let ok = ResponseTemplate::new(200).set_body_json(json!({"responseHeader": {"status": 0}}));
    for body in [
        json!({"delete": {"query": "sp_source:internal AND -crawl_process_id:abc"}}),
        json!({"commit": {}}),
        json!({"optimize": {}}),
    ] {
        Mock::given(method("POST"))
            .and(path("/solr/www/update"))
            .and(body_json(body))
            .respond_with(ok.clone())
            .expect(1)
            .mount(&server)
            .await;
    }

    let base = format!("{}/solr", server.uri());
    blocking(move || -> quarry::Result<()> {
        let client = SolrClient::new(&base);
        client.delete_by_query("www", "sp_source:internal AND -crawl_process_id:abc")?;
        client.commit("www")?;
        client.optimize("www")
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_available_indexes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/admin/cores"))
        .and(query_param("action", "STATUS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responseHeader": {"status": 0},
            "status": {"www-en": {"name": "www-en"}, "www": {"name": "www"}}
        })))
        .mount(&server)
        .await;

    let base = format!("{}/solr", server.uri());
    let indexes = blocking(move || SolrClient::new(&base).available_indexes())
        .await
        .unwrap();

    assert_eq!(indexes, vec!["www", "www-en"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_select_sends_form_params() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/solr/www/select"))
        .and(body_string_contains("fq=sp_site%3A3"))
        .and(body_string_contains("fq=-sp_archive%3Atrue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responseHeader": {"status": 0, "QTime": 2},
            "response": {"numFound": 0, "docs": []}
        })))
        .mount(&server)
        .await;

    let base = format!("{}/solr", server.uri());
    let response = blocking(move || {
        let mut params = SolrParams::new();
        params.add("q", "*:*");
        params.add("fq", "sp_site:3");
        params.add("fq", "-sp_archive:true");
        SolrClient::new(&base).select("www", &params)
    })
    .await
    .unwrap();

    assert_eq!(response["responseHeader"]["QTime"], 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_select_missing_core() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/solr/nope/select"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let base = format!("{}/solr", server.uri());
    let err = blocking(move || SolrClient::new(&base).select("nope", &SolrParams::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, QuarryError::SearchEngine(_)));
}
