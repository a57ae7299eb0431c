//! Language-neutral query model (filters, facets, sorting) and its
//! translation into Solr request parameters.

pub mod date;
pub mod facet;
pub mod field_mapper;
pub mod filter;
pub mod result;
pub mod search;
pub mod select;
pub mod sort;
pub mod translator;

pub use date::{AbsoluteDateRange, DateInterval, DateRangeRounding, RelativeDateRange};
pub use facet::{Facet, FacetKind};
pub use field_mapper::{FieldMapper, Schema2xFieldMapper};
pub use filter::{format_term, DistanceMode, Filter, FilterKind, GeoPoint, QueryField};
pub use result::{FacetGroup, FacetValue, SearchResult, SuggestResult};
pub use search::{Search, Suggest, SuggestQuery};
pub use select::{Boosting, QueryOperator, SelectQuery, SelectQueryBuilder};
pub use sort::{SortCriteria, SortDirection, SortField};
pub use translator::QueryTranslator;
