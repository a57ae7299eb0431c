use super::contact::ContactPointTransformer;
use super::content::{normalize_whitespace, ContentCollector};
use super::document::Schema2xDocument;
use crate::error::{QuarryError, Result};
use crate::resource::ResourceLoader;
use crate::types::{DataBag, Resource, ResourceLanguage};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;

/// Populates search document fields from a resource.
pub trait DocumentEnricher: Send + Sync {
    /// `false` excludes the resource from the index; it is counted as skipped.
    fn is_indexable(&self, resource: &Resource) -> bool;

    fn enrich_document(
        &self,
        resource: &Resource,
        doc: &mut Schema2xDocument,
        process_id: &str,
    ) -> Result<()>;
}

/// Enrichers applied in order. The first one rejecting a resource stops the chain.
#[derive(Clone, Default)]
pub struct EnricherChain {
    enrichers: Vec<Arc<dyn DocumentEnricher>>,
}

impl EnricherChain {
    pub fn new(enrichers: Vec<Arc<dyn DocumentEnricher>>) -> Self {
        EnricherChain { enrichers }
    }

    pub fn push(&mut self, enricher: Arc<dyn DocumentEnricher>) {
        self.enrichers.push(enricher);
    }

    pub fn len(&self) -> usize {
        self.enrichers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enrichers.is_empty()
    }

    /// `Ok(None)` when an enricher rejected the resource.
    pub fn enrich(&self, resource: &Resource, process_id: &str) -> Result<Option<Schema2xDocument>> {
        let mut doc = Schema2xDocument::new();
        for enricher in &self.enrichers {
            if !enricher.is_indexable(resource) {
                return Ok(None);
            }
            enricher.enrich_document(resource, &mut doc, process_id)?;
        }
        Ok(Some(doc))
    }
}

const SIGNATURE_LEN: usize = 11;

/// Group id without its numeric signature suffix (`editors12345678901` → `editors`).
pub fn strip_group_signature(group: &str) -> &str {
    let len = group.len();
    if len > SIGNATURE_LEN && group.is_char_boundary(len - SIGNATURE_LEN) {
        let (name, signature) = group.split_at(len - SIGNATURE_LEN);
        if signature.bytes().all(|b| b.is_ascii_digit()) {
            return name;
        }
    }
    group
}

fn epoch(bag: &DataBag, path: &str) -> Option<DateTime<Utc>> {
    epoch_value(bag.get(path)?)
}

fn epoch_value(value: &Value) -> Option<DateTime<Utc>> {
    let secs = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    if secs <= 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(value_to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Default enricher for resources of the internal resource tree.
pub struct Schema2xDocumentEnricher {
    loader: Arc<dyn ResourceLoader>,
    collector: ContentCollector,
    contact_points: ContactPointTransformer,
    default_locale: String,
}

impl Schema2xDocumentEnricher {
    pub fn new(loader: Arc<dyn ResourceLoader>, default_locale: &str) -> Self {
        Schema2xDocumentEnricher {
            loader,
            collector: ContentCollector::with_default_matchers(),
            contact_points: ContactPointTransformer::new(),
            default_locale: default_locale.to_string(),
        }
    }

    pub fn with_collector(mut self, collector: ContentCollector) -> Self {
        self.collector = collector;
        self
    }

    fn locale(&self, resource: &Resource) -> String {
        if let Some(locale) = resource.data.get_text("init.locale") {
            return locale.to_string();
        }
        if !resource.lang.is_default() {
            return resource.lang.locale().to_string();
        }
        resource
            .data
            .get_array("init.groupPath")
            .iter()
            .rev()
            .find_map(|group| group.get("locale").and_then(Value::as_str))
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.default_locale.clone())
    }

    fn title(data: &DataBag) -> Option<String> {
        data.get_text("metadata.headline")
            .or_else(|| data.get_text("base.teaser.headline"))
            .or_else(|| data.get_text("base.title"))
            .map(str::to_string)
    }

    // Teaser headline first; differs from `title` on purpose.
    fn sort_value(data: &DataBag) -> Option<String> {
        data.get_text("base.teaser.headline")
            .or_else(|| data.get_text("metadata.headline"))
            .or_else(|| data.get_text("base.title"))
            .map(str::to_string)
    }

    fn content_types(resource: &Resource, media: bool) -> Vec<String> {
        let data = &resource.data;
        let mut types = Vec::new();
        if !resource.object_type.is_empty() {
            types.push(resource.object_type.clone());
        }
        if !media {
            push_unique(&mut types, "article".to_string());
        }
        for section in string_list(data.get("contentSectionTypes")) {
            push_unique(&mut types, section);
        }
        let markers = [
            ("base.teaser.image", "teaserImage"),
            ("base.teaser.image.copyright", "teaserImageCopyright"),
            ("base.teaser.headline", "teaserHeadline"),
            ("base.teaser.text", "teaserText"),
        ];
        for (path, marker) in markers {
            if data.has(path) {
                push_unique(&mut types, marker.to_string());
            }
        }
        types
    }

    fn sites(&self, resource: &Resource) -> Result<Vec<String>> {
        let data = &resource.data;
        let parents = data.get_array("base.trees.navigation.parents");
        let mut sites = Vec::new();

        if parents.is_empty() {
            if let Some(site) = data.get("init.siteGroupId").and_then(value_to_string) {
                sites.push(site);
            }
            return Ok(sites);
        }

        for parent in &parents {
            if let Some(site) = parent
                .get("siteGroup")
                .and_then(|g| g.get("id"))
                .and_then(value_to_string)
            {
                push_unique(&mut sites, site);
            }
        }

        if let Some(root_url) = parents[0].get("url").and_then(Value::as_str) {
            let root = self
                .loader
                .load(root_url, &resource.lang)
                .map_err(|e| QuarryError::enrichment(resource.location.as_str(), e))?;
            if let Some(site) = root.data.get("init.siteGroupId").and_then(value_to_string) {
                push_unique(&mut sites, site);
            }
        }
        Ok(sites)
    }

    fn access(data: &DataBag, doc: &mut Schema2xDocument) {
        let policy = data.get_string("init.access.type").unwrap_or_default();
        let groups: Vec<String> = string_list(data.get("init.access.groups"))
            .iter()
            .map(|g| strip_group_signature(g).to_string())
            .collect();

        let (include, exclude) = match policy {
            "allow" if !groups.is_empty() => (groups, vec!["none".to_string()]),
            "deny" if !groups.is_empty() => (vec!["all".to_string()], groups),
            _ => (vec!["all".to_string()], vec!["none".to_string()]),
        };
        doc.include_groups = include;
        doc.exclude_groups = exclude;
    }

    fn schedulings(data: &DataBag, doc: &mut Schema2xDocument) {
        let mut first: Option<DateTime<Utc>> = None;
        for scheduling in data.get_array("metadata.schedulings") {
            let from = scheduling.get("from").and_then(epoch_value);
            let to = scheduling.get("to").and_then(epoch_value);
            for date in [from, to].into_iter().flatten() {
                if !doc.sp_date_list.contains(&date) {
                    doc.sp_date_list.push(date);
                }
            }
            if let Some(from) = from {
                first = Some(first.map_or(from, |f| f.min(from)));
            }
            if let Some(content_type) = scheduling.get("contentType").and_then(Value::as_str) {
                push_unique(&mut doc.sp_contenttype, content_type.to_string());
            }
        }
        if first.is_some() {
            doc.sp_date = first;
        }
    }

    fn categories(data: &DataBag, doc: &mut Schema2xDocument) -> Vec<String> {
        let mut names = Vec::new();
        for category in data.get_array("metadata.categories") {
            let Some(id) = category.get("id").and_then(value_to_string) else {
                continue;
            };
            for ancestor in string_list(category.get("path")) {
                push_unique(&mut doc.sp_category_path, ancestor);
            }
            push_unique(&mut doc.sp_category_path, id.clone());
            push_unique(&mut doc.sp_category, id);
            if let Some(name) = category.get("name").and_then(Value::as_str) {
                names.push(name.to_string());
            }
        }
        names
    }

    fn geo_points(data: &DataBag) -> Vec<String> {
        data.get_array("base.geo.points")
            .iter()
            .filter_map(|p| {
                let lat = p.get("lat").and_then(Value::as_f64)?;
                let lng = p.get("lng").and_then(Value::as_f64)?;
                Some(format!("{},{}", lat, lng))
            })
            .collect()
    }

    fn metadata(data: &DataBag, doc: &mut Schema2xDocument) {
        let Some(meta) = data.get_object("metadata.meta") else {
            return;
        };
        for (key, value) in meta {
            match value {
                Value::Bool(b) => doc.set_meta_bool(key, *b),
                Value::String(_) | Value::Array(_) => {
                    let values = match value {
                        Value::String(s) => vec![s.clone()],
                        _ => string_list(Some(value)),
                    };
                    if !values.is_empty() {
                        doc.set_meta_string(key, values);
                    }
                }
                _ => {}
            }
        }
    }

    fn content(&self, data: &DataBag, category_names: &[String]) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();
        if let Some(explicit) = data.get_string("searchindexdata.content") {
            parts.push(explicit.to_string());
        }
        if let Some(tree) = data.get_object("content") {
            parts.push(self.collector.collect(tree));
        }
        parts.push(
            self.contact_points
                .transform(&data.get_array("contactPoints")),
        );
        parts.extend(category_names.iter().cloned());

        let content = normalize_whitespace(&parts.join(" "));
        (!content.is_empty()).then_some(content)
    }
}

impl DocumentEnricher for Schema2xDocumentEnricher {
    fn is_indexable(&self, resource: &Resource) -> bool {
        !resource.data.get_bool("metadata.noIndex")
    }

    fn enrich_document(
        &self,
        resource: &Resource,
        doc: &mut Schema2xDocument,
        process_id: &str,
    ) -> Result<()> {
        let data = &resource.data;
        let media = data.get_bool("init.media");

        doc.sp_id = Some(resource.id.clone());
        if !resource.name.is_empty() {
            doc.sp_name = Some(resource.name.clone());
        }
        doc.sp_objecttype = (!resource.object_type.is_empty()).then(|| resource.object_type.clone());
        doc.sp_canonical = Some(true);
        doc.sp_archive = Some(data.get_bool("base.archive"));
        doc.crawl_process_id = Some(process_id.to_string());

        let url = data
            .get_text("init.mediaUrl")
            .or_else(|| data.get_text("init.url"))
            .unwrap_or(resource.location.as_str())
            .to_string();
        doc.id = Some(url.clone());
        doc.url = Some(url);

        doc.sp_contenttype = Self::content_types(resource, media);

        let locale = ResourceLanguage::of(self.locale(resource));
        doc.sp_language = Some(locale.code().to_string());
        doc.meta_content_language = Some(locale.locale().to_string());

        doc.sp_changed = epoch(data, "init.changed");
        doc.sp_generated = epoch(data, "init.generated");
        doc.sp_date = epoch(data, "init.date").or(doc.sp_changed);

        doc.title = Self::title(data);
        doc.sp_title = doc.title.clone();
        doc.sp_sortvalue = Self::sort_value(data);
        doc.description = data
            .get_text("metadata.description")
            .or_else(|| data.get_text("base.teaser.text"))
            .map(str::to_string);
        doc.keywords = string_list(data.get("metadata.keywords"));
        doc.sp_boost_keywords = data.get_text("metadata.boostKeywords").map(str::to_string);

        let group_path: Vec<String> = data
            .get_array("init.groupPath")
            .iter()
            .filter_map(|g| g.get("id").and_then(value_to_string))
            .collect();
        doc.sp_group = group_path.last().cloned();
        doc.sp_group_path = group_path;

        doc.sp_site = self.sites(resource)?;
        Self::access(data, doc);
        Self::schedulings(data, doc);
        let category_names = Self::categories(data, doc);
        doc.sp_geo_points = Self::geo_points(data);
        Self::metadata(data, doc);
        doc.content = self.content(data, &category_names);

        Ok(())
    }
}
