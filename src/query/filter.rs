use super::date::{AbsoluteDateRange, RelativeDateRange};

/// Logical field a filter, facet or query refers to. Resolved to an engine
/// field by a [`super::FieldMapper`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryField {
    ObjectType,
    ContentSectionType,
    Category,
    Group,
    Site,
    Id,
    Source,
    Language,
    Date,
    Geo,
    /// Looked up by name (`"category"`, `"objectType"`, ...).
    Named(String),
    /// Engine field used verbatim.
    Raw(String),
}

impl QueryField {
    pub fn raw(field: impl Into<String>) -> Self {
        QueryField::Raw(field.into())
    }

    pub fn named(name: impl Into<String>) -> Self {
        QueryField::Named(name.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        GeoPoint { lat, lng }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceMode {
    /// Exact circle around the center.
    #[default]
    GreatCircle,
    /// Square enclosing the circle; cheaper.
    BoundingBox,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    Field {
        field: QueryField,
        values: Vec<String>,
        exclude: bool,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    /// Engine query passed through unchanged.
    Query(String),
    AbsoluteDateRange {
        field: QueryField,
        range: AbsoluteDateRange,
    },
    RelativeDateRange {
        field: QueryField,
        range: RelativeDateRange,
    },
    SpatialOrbital {
        center: GeoPoint,
        /// Radius in kilometers.
        distance: f64,
        mode: DistanceMode,
    },
    SpatialArbitraryRectangle {
        south_west: GeoPoint,
        north_east: GeoPoint,
    },
}

/// A filter query. `key` identifies it within a query, `tags` let facets
/// exclude it.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub key: Option<String>,
    pub tags: Vec<String>,
    pub kind: FilterKind,
}

impl Filter {
    pub fn new(kind: FilterKind) -> Self {
        Filter {
            key: None,
            tags: Vec::new(),
            kind,
        }
    }

    pub fn field<I, S>(field: QueryField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::new(FilterKind::Field {
            field,
            values: values.into_iter().map(Into::into).collect(),
            exclude: false,
        })
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::new(FilterKind::And(filters))
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::new(FilterKind::Or(filters))
    }

    pub fn not(filter: Filter) -> Self {
        Filter::new(FilterKind::Not(Box::new(filter)))
    }

    pub fn query(query: impl Into<String>) -> Self {
        Filter::new(FilterKind::Query(query.into()))
    }

    pub fn absolute_date_range(field: QueryField, range: AbsoluteDateRange) -> Self {
        Filter::new(FilterKind::AbsoluteDateRange { field, range })
    }

    pub fn relative_date_range(field: QueryField, range: RelativeDateRange) -> Self {
        Filter::new(FilterKind::RelativeDateRange { field, range })
    }

    pub fn orbital(center: GeoPoint, distance: f64, mode: DistanceMode) -> Self {
        Filter::new(FilterKind::SpatialOrbital {
            center,
            distance,
            mode,
        })
    }

    pub fn rectangle(south_west: GeoPoint, north_east: GeoPoint) -> Self {
        Filter::new(FilterKind::SpatialArbitraryRectangle {
            south_west,
            north_east,
        })
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Negate a field filter (`-field:value`). No effect on other kinds.
    pub fn excluded(mut self) -> Self {
        if let FilterKind::Field { exclude, .. } = &mut self.kind {
            *exclude = true;
        }
        self
    }
}

const SPECIAL_CHARS: &[char] = &[
    ' ', ':', '"', '(', ')', '[', ']', '{', '}', '\\', '/', '+', '!', '^', '~', '*', '?', '&', '|',
    '%',
];

/// Single query term; quoted when it contains whitespace or query syntax.
pub fn format_term(value: &str) -> String {
    if value.is_empty() {
        return "\"\"".to_string();
    }
    if value.contains(SPECIAL_CHARS) || value.starts_with('-') {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}
