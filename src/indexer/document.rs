use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Format used for every date field sent to the engine.
pub fn format_solr_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Search document of the `Schema2x` schema.
///
/// Unset fields (`None`, empty lists, empty maps) are left out of
/// [`Schema2xDocument::to_fields`]; the metadata maps are flattened into
/// `meta_string_<key>` / `meta_bool_<key>` fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema2xDocument {
    pub sp_id: Option<String>,
    pub sp_name: Option<String>,
    pub sp_anchor: Option<String>,
    pub id: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub sp_title: Option<String>,
    pub sp_sortvalue: Option<String>,
    pub sp_objecttype: Option<String>,
    pub sp_contenttype: Vec<String>,
    pub sp_canonical: Option<bool>,
    pub sp_archive: Option<bool>,
    pub crawl_process_id: Option<String>,
    pub sp_language: Option<String>,
    pub meta_content_language: Option<String>,
    pub sp_changed: Option<DateTime<Utc>>,
    pub sp_generated: Option<DateTime<Utc>>,
    pub sp_date: Option<DateTime<Utc>>,
    pub sp_date_list: Vec<DateTime<Utc>>,
    pub sp_boost_keywords: Option<String>,
    pub sp_source: Vec<String>,
    pub sp_category: Vec<String>,
    pub sp_category_path: Vec<String>,
    pub sp_group: Option<String>,
    pub sp_group_path: Vec<String>,
    pub sp_site: Vec<String>,
    pub sp_geo_points: Vec<String>,
    pub keywords: Vec<String>,
    pub content: Option<String>,
    pub include_groups: Vec<String>,
    pub exclude_groups: Vec<String>,
    pub meta_string: BTreeMap<String, Vec<String>>,
    pub meta_bool: BTreeMap<String, bool>,
}

impl Schema2xDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_meta_string(&mut self, key: &str, values: Vec<String>) {
        self.meta_string.insert(key.to_string(), values);
    }

    pub fn set_meta_bool(&mut self, key: &str, value: bool) {
        self.meta_bool.insert(key.to_string(), value);
    }

    /// Field set submitted to the engine.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();

        put_str(&mut fields, "sp_id", &self.sp_id);
        put_str(&mut fields, "sp_name", &self.sp_name);
        put_str(&mut fields, "sp_anchor", &self.sp_anchor);
        put_str(&mut fields, "id", &self.id);
        put_str(&mut fields, "url", &self.url);
        put_str(&mut fields, "title", &self.title);
        put_str(&mut fields, "description", &self.description);
        put_str(&mut fields, "sp_title", &self.sp_title);
        put_str(&mut fields, "sp_sortvalue", &self.sp_sortvalue);
        put_str(&mut fields, "sp_objecttype", &self.sp_objecttype);
        put_list(&mut fields, "sp_contenttype", &self.sp_contenttype);
        put_bool(&mut fields, "sp_canonical", self.sp_canonical);
        put_bool(&mut fields, "sp_archive", self.sp_archive);
        put_str(&mut fields, "crawl_process_id", &self.crawl_process_id);
        put_str(&mut fields, "sp_language", &self.sp_language);
        put_str(&mut fields, "meta_content_language", &self.meta_content_language);
        put_date(&mut fields, "sp_changed", &self.sp_changed);
        put_date(&mut fields, "sp_generated", &self.sp_generated);
        put_date(&mut fields, "sp_date", &self.sp_date);
        if !self.sp_date_list.is_empty() {
            let dates = self
                .sp_date_list
                .iter()
                .map(|d| Value::String(format_solr_date(d)))
                .collect();
            fields.insert("sp_date_list".to_string(), Value::Array(dates));
        }
        put_str(&mut fields, "sp_boost_keywords", &self.sp_boost_keywords);
        put_list(&mut fields, "sp_source", &self.sp_source);
        put_list(&mut fields, "sp_category", &self.sp_category);
        put_list(&mut fields, "sp_category_path", &self.sp_category_path);
        put_str(&mut fields, "sp_group", &self.sp_group);
        put_list(&mut fields, "sp_group_path", &self.sp_group_path);
        put_list(&mut fields, "sp_site", &self.sp_site);
        put_list(&mut fields, "sp_geo_points", &self.sp_geo_points);
        put_list(&mut fields, "keywords", &self.keywords);
        put_str(&mut fields, "content", &self.content);
        put_list(&mut fields, "include_groups", &self.include_groups);
        put_list(&mut fields, "exclude_groups", &self.exclude_groups);

        for (key, values) in &self.meta_string {
            put_list(&mut fields, &format!("meta_string_{}", key), values);
        }
        for (key, value) in &self.meta_bool {
            fields.insert(format!("meta_bool_{}", key), Value::Bool(*value));
        }

        fields
    }
}

fn put_str(fields: &mut Map<String, Value>, name: &str, value: &Option<String>) {
    if let Some(v) = value {
        fields.insert(name.to_string(), Value::String(v.clone()));
    }
}

fn put_bool(fields: &mut Map<String, Value>, name: &str, value: Option<bool>) {
    if let Some(v) = value {
        fields.insert(name.to_string(), Value::Bool(v));
    }
}

fn put_date(fields: &mut Map<String, Value>, name: &str, value: &Option<DateTime<Utc>>) {
    if let Some(d) = value {
        fields.insert(name.to_string(), Value::String(format_solr_date(d)));
    }
}

fn put_list(fields: &mut Map<String, Value>, name: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let list = values.iter().map(|v| Value::String(v.clone())).collect();
    fields.insert(name.to_string(), Value::Array(list));
}
