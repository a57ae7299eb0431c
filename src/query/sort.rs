use super::filter::GeoPoint;

#[derive(Debug, Clone, PartialEq)]
pub enum SortField {
    Name,
    Headline,
    Date,
    Score,
    /// Distance of the first geo point to the given center.
    Distance(GeoPoint),
    /// Looked up by name (`"name"`, `"date"`, ...).
    Named(String),
    /// Engine field used verbatim.
    Raw(String),
}

impl SortField {
    pub fn named(name: impl Into<String>) -> Self {
        SortField::Named(name.into())
    }

    pub fn raw(field: impl Into<String>) -> Self {
        SortField::Raw(field.into())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortCriteria {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortCriteria {
    pub fn asc(field: SortField) -> Self {
        SortCriteria {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        SortCriteria {
            field,
            direction: SortDirection::Desc,
        }
    }
}
