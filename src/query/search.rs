use super::field_mapper::FieldMapper;
use super::filter::Filter;
use super::result::{facet_groups, pairs, SearchResult, SuggestResult};
use super::select::SelectQuery;
use super::translator::QueryTranslator;
use crate::engine::{SearchEngineClient, SolrParams};
use crate::error::Result;
use crate::indexer::IndexName;
use crate::resource::ResourceFactoryChain;
use crate::types::ResourceLanguage;
use serde_json::Value;
use std::sync::Arc;

/// Index serving `lang` below `index`, routed the way the indexer fills it.
fn language_index(index: &str, lang: &ResourceLanguage, default_locale: &str) -> String {
    IndexName::new(index)
        .with_default_locale(default_locale)
        .for_language(lang)
}

fn query_time(response: &Value) -> u64 {
    response["responseHeader"]["QTime"].as_u64().unwrap_or(0)
}

/// Runs select queries and maps the hits back to resources.
pub struct Search {
    engine: Arc<dyn SearchEngineClient>,
    translator: QueryTranslator,
    factories: ResourceFactoryChain,
    default_locale: String,
}

impl Search {
    pub fn new(
        engine: Arc<dyn SearchEngineClient>,
        mapper: Arc<dyn FieldMapper>,
        factories: ResourceFactoryChain,
        default_locale: &str,
    ) -> Self {
        Search {
            engine,
            translator: QueryTranslator::new(mapper),
            factories,
            default_locale: default_locale.to_string(),
        }
    }

    pub fn search(&self, query: &SelectQuery) -> Result<SearchResult> {
        let index = language_index(&query.index, &query.lang, &self.default_locale);
        let params = self.translator.translate(query)?;
        tracing::debug!("[SEARCH {}] {:?}", index, params.pairs());

        let response = self.engine.select(&index, &params)?;

        let total = response["response"]["numFound"].as_u64().unwrap_or(0);
        let mut results = Vec::new();
        if let Some(docs) = response["response"]["docs"].as_array() {
            for doc in docs.iter().filter_map(Value::as_object) {
                match self.factories.create(doc, &query.lang) {
                    Ok(resource) => results.push(resource),
                    Err(e) if e.is_per_resource() => {
                        tracing::warn!("[SEARCH {}] dropping hit: {}", index, e);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(SearchResult {
            total,
            limit: query.limit,
            offset: query.offset,
            results,
            facet_groups: facet_groups(&query.facets, &response),
            query_time: query_time(&response),
        })
    }
}

const SUGGEST_FIELD: &str = "raw_content";

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestQuery {
    pub index: String,
    pub lang: ResourceLanguage,
    pub term: String,
    pub limit: usize,
    pub filters: Vec<Filter>,
    pub archive: bool,
}

impl SuggestQuery {
    pub fn new(index: impl Into<String>, term: impl Into<String>) -> Self {
        SuggestQuery {
            index: index.into(),
            lang: ResourceLanguage::default_language(),
            term: term.into(),
            limit: 10,
            filters: Vec::new(),
            archive: false,
        }
    }
}

/// Prefix completion from the terms of the indexed content.
pub struct Suggest {
    engine: Arc<dyn SearchEngineClient>,
    translator: QueryTranslator,
    default_locale: String,
}

impl Suggest {
    pub fn new(
        engine: Arc<dyn SearchEngineClient>,
        mapper: Arc<dyn FieldMapper>,
        default_locale: &str,
    ) -> Self {
        Suggest {
            engine,
            translator: QueryTranslator::new(mapper),
            default_locale: default_locale.to_string(),
        }
    }

    pub fn params(&self, query: &SuggestQuery) -> Result<SolrParams> {
        let mut params = SolrParams::new();
        params.add("q", "*:*");
        params.add("rows", "0");
        params.add("wt", "json");
        for filter in &query.filters {
            params.add("fq", self.translator.tagged_filter_query(filter)?);
        }
        if !query.archive {
            params.add("fq", format!("-{}:true", self.translator.mapper().archive_field()));
        }
        params.add("facet", "true");
        params.add("facet.field", SUGGEST_FIELD);
        params.add("facet.prefix", query.term.trim().to_lowercase());
        params.add("facet.limit", query.limit.to_string());
        params.add("facet.mincount", "1");
        Ok(params)
    }

    pub fn suggest(&self, query: &SuggestQuery) -> Result<SuggestResult> {
        if query.term.trim().is_empty() {
            return Ok(SuggestResult::default());
        }
        let index = language_index(&query.index, &query.lang, &self.default_locale);
        let response = self.engine.select(&index, &self.params(query)?)?;
        Ok(SuggestResult {
            suggestions: pairs(&response["facet_counts"]["facet_fields"][SUGGEST_FIELD]),
            query_time: query_time(&response),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_index() {
        assert_eq!(
            language_index("www", &ResourceLanguage::default_language(), "de_DE"),
            "www"
        );
        assert_eq!(language_index("www", &ResourceLanguage::of("de_DE"), "de_DE"), "www");
        assert_eq!(language_index("www", &ResourceLanguage::of("de_AT"), "de_DE"), "www-de");
        assert_eq!(language_index("www", &ResourceLanguage::of("en_US"), "de_DE"), "www-en");
    }
}
