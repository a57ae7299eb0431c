use super::filter::QueryField;
use super::sort::SortField;
use crate::error::{QuarryError, Result};

/// Maps logical fields and sort criteria onto the fields of an index schema.
pub trait FieldMapper: Send + Sync {
    fn field(&self, field: &QueryField) -> Result<String>;

    fn sort_field(&self, field: &SortField) -> Result<String>;

    fn geo_field(&self) -> &str;

    fn archive_field(&self) -> &str;
}

/// Field layout of the `Schema2x` document.
#[derive(Debug, Clone, Copy, Default)]
pub struct Schema2xFieldMapper;

impl Schema2xFieldMapper {
    fn named_field(name: &str) -> Option<QueryField> {
        let field = match name {
            "objectType" => QueryField::ObjectType,
            "contentSectionType" | "contentType" => QueryField::ContentSectionType,
            "category" => QueryField::Category,
            "group" => QueryField::Group,
            "site" => QueryField::Site,
            "id" => QueryField::Id,
            "source" => QueryField::Source,
            "language" => QueryField::Language,
            "date" => QueryField::Date,
            "geo" => QueryField::Geo,
            _ => return None,
        };
        Some(field)
    }

    fn named_sort(name: &str) -> Option<SortField> {
        let field = match name {
            "name" => SortField::Name,
            "headline" => SortField::Headline,
            "date" => SortField::Date,
            "score" => SortField::Score,
            _ => return None,
        };
        Some(field)
    }
}

impl FieldMapper for Schema2xFieldMapper {
    fn field(&self, field: &QueryField) -> Result<String> {
        let name = match field {
            QueryField::ObjectType => "sp_objecttype",
            QueryField::ContentSectionType => "sp_contenttype",
            QueryField::Category => "sp_category_path",
            QueryField::Group => "sp_group_path",
            QueryField::Site => "sp_site",
            QueryField::Id => "sp_id",
            QueryField::Source => "sp_source",
            QueryField::Language => "sp_language",
            QueryField::Date => "sp_date",
            QueryField::Geo => "sp_geo_points",
            QueryField::Raw(name) => return Ok(name.clone()),
            QueryField::Named(name) => {
                return match Self::named_field(name) {
                    Some(resolved) => self.field(&resolved),
                    None => Err(QuarryError::unsupported("field", name.as_str())),
                };
            }
        };
        Ok(name.to_string())
    }

    fn sort_field(&self, field: &SortField) -> Result<String> {
        let name = match field {
            SortField::Name => "sp_sortvalue",
            SortField::Headline => "sp_title",
            SortField::Date => "sp_date",
            SortField::Score => "score",
            SortField::Distance(center) => {
                return Ok(format!(
                    "geodist({},{},{})",
                    self.geo_field(),
                    center.lat,
                    center.lng
                ))
            }
            SortField::Raw(name) => return Ok(name.clone()),
            SortField::Named(name) => {
                return match Self::named_sort(name) {
                    Some(resolved) => self.sort_field(&resolved),
                    None => Err(QuarryError::unsupported("sort criteria", name.as_str())),
                };
            }
        };
        Ok(name.to_string())
    }

    fn geo_field(&self) -> &str {
        "sp_geo_points"
    }

    fn archive_field(&self) -> &str {
        "sp_archive"
    }
}
