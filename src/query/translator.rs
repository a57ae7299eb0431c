//! Translation of the query model into Solr request parameters.

use super::date::DateInterval;
use super::facet::{Facet, FacetKind};
use super::field_mapper::FieldMapper;
use super::filter::{format_term, DistanceMode, Filter, FilterKind};
use super::select::{Boosting, SelectQuery};
use crate::engine::SolrParams;
use crate::error::{QuarryError, Result};
use std::sync::Arc;

pub struct QueryTranslator {
    mapper: Arc<dyn FieldMapper>,
}

impl QueryTranslator {
    pub fn new(mapper: Arc<dyn FieldMapper>) -> Self {
        QueryTranslator { mapper }
    }

    pub fn mapper(&self) -> &dyn FieldMapper {
        self.mapper.as_ref()
    }

    pub fn translate(&self, query: &SelectQuery) -> Result<SolrParams> {
        query.validate()?;
        let mut params = SolrParams::new();

        params.add("q", query.text.as_deref().unwrap_or("*:*"));
        params.add("q.op", query.operator.as_str());
        params.add("start", query.offset.to_string());
        params.add("rows", query.limit.to_string());
        params.add("wt", "json");

        if !query.fields.is_empty() {
            params.add("fl", query.fields.join(","));
        }

        if !query.sort.is_empty() {
            let mut sort = Vec::with_capacity(query.sort.len());
            for criteria in &query.sort {
                sort.push(format!(
                    "{} {}",
                    self.mapper.sort_field(&criteria.field)?,
                    criteria.direction.as_str()
                ));
            }
            params.add("sort", sort.join(","));
        }

        for filter in &query.filters {
            params.add("fq", self.tagged_filter_query(filter)?);
        }
        if !query.archive {
            params.add("fq", format!("-{}:true", self.mapper.archive_field()));
        }

        if let Some(tz) = query.timezone {
            params.add("TZ", tz.name());
        }

        if let Some(boosting) = &query.boosting {
            if query.text.is_some() {
                self.add_boosting(boosting, &mut params);
            }
        }

        if !query.facets.is_empty() {
            params.add("facet", "true");
            params.add("facet.mincount", "1");
            for facet in &query.facets {
                self.add_facet(facet, &mut params)?;
            }
        }

        Ok(params)
    }

    /// Filter query including `{!tag=...}` local params.
    pub fn tagged_filter_query(&self, filter: &Filter) -> Result<String> {
        let fq = self.filter_query(filter)?;
        if filter.tags.is_empty() {
            return Ok(fq);
        }
        let tag = format!("tag={}", filter.tags.join(","));
        Ok(match fq.strip_prefix("{!") {
            Some(rest) => format!("{{!{} {}", tag, rest),
            None => format!("{{!{}}}{}", tag, fq),
        })
    }

    pub fn filter_query(&self, filter: &Filter) -> Result<String> {
        match &filter.kind {
            FilterKind::Field {
                field,
                values,
                exclude,
            } => {
                let name = self.mapper.field(field)?;
                let prefix = if *exclude { "-" } else { "" };
                match values.as_slice() {
                    [] => Err(QuarryError::InvalidQuery(format!(
                        "field filter on {} without values",
                        name
                    ))),
                    [value] => Ok(format!("{}{}:{}", prefix, name, format_term(value))),
                    values => {
                        let terms: Vec<String> = values.iter().map(|v| format_term(v)).collect();
                        Ok(format!("{}{}:({})", prefix, name, terms.join(" ")))
                    }
                }
            }
            FilterKind::And(filters) => self.combine(filters, "AND"),
            FilterKind::Or(filters) => self.combine(filters, "OR"),
            FilterKind::Not(inner) => Ok(format!("NOT {}", self.filter_query(inner)?)),
            FilterKind::Query(query) => Ok(query.clone()),
            FilterKind::AbsoluteDateRange { field, range } => {
                let (from, to) = range.bounds();
                Ok(format!("{}:[{} TO {}]", self.mapper.field(field)?, from, to))
            }
            FilterKind::RelativeDateRange { field, range } => {
                let (from, to) = range.bounds();
                Ok(format!("{}:[{} TO {}]", self.mapper.field(field)?, from, to))
            }
            FilterKind::SpatialOrbital {
                center,
                distance,
                mode,
            } => {
                let parser = match mode {
                    DistanceMode::GreatCircle => "geofilt",
                    DistanceMode::BoundingBox => "bbox",
                };
                Ok(format!(
                    "{{!{} sfield={} pt={} d={}}}",
                    parser,
                    self.mapper.geo_field(),
                    center,
                    distance
                ))
            }
            FilterKind::SpatialArbitraryRectangle {
                south_west,
                north_east,
            } => Ok(format!(
                "{}:[{} TO {}]",
                self.mapper.geo_field(),
                south_west,
                north_east
            )),
        }
    }

    fn combine(&self, filters: &[Filter], operator: &str) -> Result<String> {
        if filters.is_empty() {
            return Err(QuarryError::InvalidQuery(format!(
                "{} filter without children",
                operator
            )));
        }
        let parts = filters
            .iter()
            .map(|f| self.filter_query(f))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("({})", parts.join(&format!(" {} ", operator))))
    }

    fn add_boosting(&self, boosting: &Boosting, params: &mut SolrParams) {
        params.add("defType", "edismax");
        let weighted = |fields: &[(String, f32)]| {
            fields
                .iter()
                .map(|(field, boost)| format!("{}^{}", field, boost))
                .collect::<Vec<_>>()
                .join(" ")
        };
        if !boosting.query_fields.is_empty() {
            params.add("qf", weighted(&boosting.query_fields));
        }
        if !boosting.phrase_fields.is_empty() {
            params.add("pf", weighted(&boosting.phrase_fields));
        }
        for bq in &boosting.boost_queries {
            params.add("bq", bq.as_str());
        }
        for bf in &boosting.boost_functions {
            params.add("bf", bf.as_str());
        }
        if let Some(tie) = boosting.tie {
            params.add("tie", tie.to_string());
        }
    }

    fn local_params(key: &str, excludes: &[String]) -> String {
        let mut local = format!("key={}", key);
        if !excludes.is_empty() {
            local.push_str(&format!(" ex={}", excludes.join(",")));
        }
        local
    }

    fn add_facet(&self, facet: &Facet, params: &mut SolrParams) -> Result<()> {
        let local = Self::local_params(&facet.key, &facet.excludes);
        match &facet.kind {
            FacetKind::Field {
                field,
                terms,
                limit,
            } => {
                let name = self.mapper.field(field)?;
                let mut local = local;
                if !terms.is_empty() {
                    local.push_str(&format!(" terms={}", terms.join(",")));
                }
                params.add("facet.field", format!("{{!{}}}{}", local, name));
                if let Some(limit) = limit {
                    params.add(format!("f.{}.facet.limit", name), limit.to_string());
                }
            }
            FacetKind::Query(query) => {
                params.add("facet.query", format!("{{!{}}}{}", local, query));
            }
            FacetKind::MultiQuery(queries) => {
                for (sub_key, query) in queries {
                    let local = Self::local_params(
                        &multi_query_key(&facet.key, sub_key),
                        &facet.excludes,
                    );
                    params.add("facet.query", format!("{{!{}}}{}", local, query));
                }
            }
            FacetKind::AbsoluteDateRange { field, range, gap } => {
                let (from, to) = range.bounds();
                if gap.is_some() && (from == "*" || to == "*") {
                    return Err(QuarryError::InvalidQuery(format!(
                        "range facet {} needs both bounds",
                        facet.key
                    )));
                }
                self.add_range_facet(&local, &self.mapper.field(field)?, &from, &to, gap, params)?;
            }
            FacetKind::RelativeDateRange { field, range, gap } => {
                let (from, to) = range.bounds();
                self.add_range_facet(&local, &self.mapper.field(field)?, &from, &to, gap, params)?;
            }
            FacetKind::SpatialDistanceRange { center, from, to } => {
                params.add(
                    "facet.query",
                    format!(
                        "{{!frange {} l={} u={}}}geodist({},{},{})",
                        local,
                        from,
                        to,
                        self.mapper.geo_field(),
                        center.lat,
                        center.lng
                    ),
                );
            }
        }
        Ok(())
    }

    fn add_range_facet(
        &self,
        local: &str,
        field: &str,
        from: &str,
        to: &str,
        gap: &Option<DateInterval>,
        params: &mut SolrParams,
    ) -> Result<()> {
        match gap {
            None => {
                params.add("facet.query", format!("{{!{}}}{}:[{} TO {}]", local, field, from, to));
            }
            Some(gap) => {
                if gap.is_zero() {
                    return Err(QuarryError::InvalidInterval {
                        interval: gap.to_string(),
                        reason: "facet gap must not be empty".to_string(),
                    });
                }
                params.add(
                    "facet.range",
                    format!(
                        "{{!{} facet.range.start={} facet.range.end={} facet.range.gap={}}}{}",
                        local,
                        from,
                        to,
                        gap.to_date_math('+'),
                        field
                    ),
                );
            }
        }
        Ok(())
    }
}

/// Key under which one sub-query of a multi-query facet is reported.
pub fn multi_query_key(key: &str, sub_key: &str) -> String {
    format!("{}_{}", key, sub_key)
}
