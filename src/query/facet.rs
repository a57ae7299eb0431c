use super::date::{AbsoluteDateRange, DateInterval, RelativeDateRange};
use super::filter::{GeoPoint, QueryField};

#[derive(Debug, Clone, PartialEq)]
pub enum FacetKind {
    Field {
        field: QueryField,
        /// Restrict counting to these terms.
        terms: Vec<String>,
        limit: Option<usize>,
    },
    Query(String),
    /// Named sub-queries, reported as one group.
    MultiQuery(Vec<(String, String)>),
    AbsoluteDateRange {
        field: QueryField,
        range: AbsoluteDateRange,
        gap: Option<DateInterval>,
    },
    RelativeDateRange {
        field: QueryField,
        range: RelativeDateRange,
        gap: Option<DateInterval>,
    },
    /// Hits between `from` and `to` kilometers away from `center`.
    SpatialDistanceRange {
        center: GeoPoint,
        from: f64,
        to: f64,
    },
}

/// A facet request. `key` must be unique within a query; `excludes` names
/// filter tags ignored while counting.
#[derive(Debug, Clone, PartialEq)]
pub struct Facet {
    pub key: String,
    pub excludes: Vec<String>,
    pub kind: FacetKind,
}

impl Facet {
    pub fn new(key: impl Into<String>, kind: FacetKind) -> Self {
        Facet {
            key: key.into(),
            excludes: Vec::new(),
            kind,
        }
    }

    pub fn field(key: impl Into<String>, field: QueryField) -> Self {
        Facet::new(
            key,
            FacetKind::Field {
                field,
                terms: Vec::new(),
                limit: None,
            },
        )
    }

    pub fn query(key: impl Into<String>, query: impl Into<String>) -> Self {
        Facet::new(key, FacetKind::Query(query.into()))
    }

    pub fn multi_query(key: impl Into<String>, queries: Vec<(String, String)>) -> Self {
        Facet::new(key, FacetKind::MultiQuery(queries))
    }

    pub fn absolute_date_range(
        key: impl Into<String>,
        field: QueryField,
        range: AbsoluteDateRange,
        gap: Option<DateInterval>,
    ) -> Self {
        Facet::new(key, FacetKind::AbsoluteDateRange { field, range, gap })
    }

    pub fn relative_date_range(
        key: impl Into<String>,
        field: QueryField,
        range: RelativeDateRange,
        gap: Option<DateInterval>,
    ) -> Self {
        Facet::new(key, FacetKind::RelativeDateRange { field, range, gap })
    }

    pub fn distance_range(key: impl Into<String>, center: GeoPoint, from: f64, to: f64) -> Self {
        Facet::new(key, FacetKind::SpatialDistanceRange { center, from, to })
    }

    pub fn with_terms<I, S>(mut self, new_terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let FacetKind::Field { terms, .. } = &mut self.kind {
            *terms = new_terms.into_iter().map(Into::into).collect();
        }
        self
    }

    pub fn with_limit(mut self, new_limit: usize) -> Self {
        if let FacetKind::Field { limit, .. } = &mut self.kind {
            *limit = Some(new_limit);
        }
        self
    }

    pub fn excluding<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes = tags.into_iter().map(Into::into).collect();
        self
    }
}
