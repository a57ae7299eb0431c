use super::facet::{Facet, FacetKind};
use super::filter::Filter;
use super::sort::SortCriteria;
use super::translator::multi_query_key;
use crate::error::{QuarryError, Result};
use crate::types::ResourceLanguage;
use chrono_tz::Tz;
use std::collections::HashSet;

pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryOperator {
    #[default]
    And,
    Or,
}

impl QueryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryOperator::And => "AND",
            QueryOperator::Or => "OR",
        }
    }
}

/// Relevance tuning for the edismax parser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Boosting {
    /// `qf`: fields searched, with their boost.
    pub query_fields: Vec<(String, f32)>,
    /// `pf`: phrase boosts.
    pub phrase_fields: Vec<(String, f32)>,
    /// `bq`
    pub boost_queries: Vec<String>,
    /// `bf`
    pub boost_functions: Vec<String>,
    pub tie: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub index: String,
    pub text: Option<String>,
    pub lang: ResourceLanguage,
    pub fields: Vec<String>,
    pub sort: Vec<SortCriteria>,
    pub filters: Vec<Filter>,
    pub facets: Vec<Facet>,
    pub operator: QueryOperator,
    pub boosting: Option<Boosting>,
    pub archive: bool,
    pub timezone: Option<Tz>,
    pub offset: usize,
    pub limit: usize,
}

impl SelectQuery {
    pub fn builder(index: impl Into<String>) -> SelectQueryBuilder {
        SelectQueryBuilder::new(index)
    }

    /// Checks the invariants [`SelectQueryBuilder::build`] enforces; the
    /// translator runs it again before every request.
    ///
    /// Facet keys must be unique, including the `<key>_<sub key>` names
    /// multi-query facets report under.
    pub fn validate(&self) -> Result<()> {
        if self.index.trim().is_empty() {
            return Err(QuarryError::MissingField("index".to_string()));
        }

        let mut filter_keys = HashSet::new();
        for key in self.filters.iter().filter_map(|f| f.key.as_deref()) {
            if !filter_keys.insert(key) {
                return Err(QuarryError::DuplicateKey {
                    kind: "filter".to_string(),
                    key: key.to_string(),
                });
            }
        }

        let mut facet_keys = HashSet::new();
        for facet in &self.facets {
            if facet.key.is_empty() {
                return Err(QuarryError::MissingField("facet key".to_string()));
            }
            if !facet_keys.insert(facet.key.clone()) {
                return Err(duplicate_facet(&facet.key));
            }
        }

        let mut reported = HashSet::new();
        for facet in &self.facets {
            let keys: Vec<String> = match &facet.kind {
                FacetKind::MultiQuery(queries) => queries
                    .iter()
                    .map(|(sub_key, _)| multi_query_key(&facet.key, sub_key))
                    .collect(),
                _ => vec![facet.key.clone()],
            };
            for key in keys {
                if !reported.insert(key.clone()) {
                    return Err(duplicate_facet(&key));
                }
            }
        }

        Ok(())
    }
}

fn duplicate_facet(key: &str) -> QuarryError {
    QuarryError::DuplicateKey {
        kind: "facet".to_string(),
        key: key.to_string(),
    }
}

/// Builds a [`SelectQuery`]; invariants are checked in [`SelectQueryBuilder::build`].
#[derive(Debug, Clone)]
pub struct SelectQueryBuilder {
    query: SelectQuery,
}

impl SelectQueryBuilder {
    pub fn new(index: impl Into<String>) -> Self {
        SelectQueryBuilder {
            query: SelectQuery {
                index: index.into(),
                text: None,
                lang: ResourceLanguage::default_language(),
                fields: Vec::new(),
                sort: Vec::new(),
                filters: Vec::new(),
                facets: Vec::new(),
                operator: QueryOperator::default(),
                boosting: None,
                archive: false,
                timezone: None,
                offset: 0,
                limit: DEFAULT_LIMIT,
            },
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.query.text = (!text.trim().is_empty()).then_some(text);
        self
    }

    pub fn lang(mut self, lang: ResourceLanguage) -> Self {
        self.query.lang = lang;
        self
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.query.fields.push(field.into());
        self
    }

    pub fn sort(mut self, criteria: SortCriteria) -> Self {
        self.query.sort.push(criteria);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.query.filters.push(filter);
        self
    }

    pub fn facet(mut self, facet: Facet) -> Self {
        self.query.facets.push(facet);
        self
    }

    pub fn operator(mut self, operator: QueryOperator) -> Self {
        self.query.operator = operator;
        self
    }

    pub fn boosting(mut self, boosting: Boosting) -> Self {
        self.query.boosting = Some(boosting);
        self
    }

    pub fn archive(mut self, archive: bool) -> Self {
        self.query.archive = archive;
        self
    }

    pub fn timezone(mut self, timezone: Tz) -> Self {
        self.query.timezone = Some(timezone);
        self
    }

    /// Parse an IANA zone name (`Europe/Berlin`).
    pub fn timezone_name(self, name: &str) -> Result<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|_| QuarryError::InvalidQuery(format!("unknown timezone: {}", name)))?;
        Ok(self.timezone(tz))
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.query.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = limit;
        self
    }

    pub fn build(self) -> Result<SelectQuery> {
        self.query.validate()?;
        Ok(self.query)
    }
}
