use super::ResourceLoader;
use crate::error::{QuarryError, Result};
use crate::types::{DataBag, Resource, ResourceLanguage};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Builds a [`Resource`] from one search hit.
pub trait ResourceFactory: Send + Sync {
    fn accept(&self, document: &Map<String, Value>) -> bool;

    fn create(&self, document: &Map<String, Value>, lang: &ResourceLanguage) -> Result<Resource>;
}

fn field<'a>(document: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    match document.get(name)? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(items) => items.first().and_then(Value::as_str),
        _ => None,
    }
}

fn from_fields(
    document: &Map<String, Value>,
    lang: &ResourceLanguage,
    default_type: &str,
) -> Result<Resource> {
    let url = field(document, "url").unwrap_or_default();
    let id = field(document, "sp_id")
        .or_else(|| field(document, "id"))
        .ok_or_else(|| QuarryError::MissingField("sp_id".to_string()))?;
    let name = field(document, "sp_title")
        .or_else(|| field(document, "title"))
        .unwrap_or_default();
    let object_type = field(document, "sp_objecttype").unwrap_or(default_type);
    let lang = match field(document, "meta_content_language") {
        Some(locale) if !locale.is_empty() => ResourceLanguage::of(locale),
        _ => lang.clone(),
    };

    Ok(Resource {
        location: url.to_string(),
        id: id.to_string(),
        name: name.to_string(),
        object_type: object_type.to_string(),
        lang,
        data: DataBag::new(document.clone()),
    })
}

/// Hits pointing outside the resource tree (URL with a scheme).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalResourceFactory;

impl ResourceFactory for ExternalResourceFactory {
    fn accept(&self, document: &Map<String, Value>) -> bool {
        field(document, "url").is_some_and(|url| url.contains("://"))
    }

    fn create(&self, document: &Map<String, Value>, lang: &ResourceLanguage) -> Result<Resource> {
        from_fields(document, lang, "external")
    }
}

/// Media hits; media resources are fully described by their index fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct InternalMediaResourceFactory;

impl ResourceFactory for InternalMediaResourceFactory {
    fn accept(&self, document: &Map<String, Value>) -> bool {
        field(document, "sp_objecttype") == Some("media")
    }

    fn create(&self, document: &Map<String, Value>, lang: &ResourceLanguage) -> Result<Resource> {
        from_fields(document, lang, "media")
    }
}

/// Hits of the resource tree, loaded again through the [`ResourceLoader`].
#[derive(Clone)]
pub struct InternalResourceFactory {
    loader: Arc<dyn ResourceLoader>,
}

impl InternalResourceFactory {
    pub fn new(loader: Arc<dyn ResourceLoader>) -> Self {
        InternalResourceFactory { loader }
    }
}

impl ResourceFactory for InternalResourceFactory {
    fn accept(&self, document: &Map<String, Value>) -> bool {
        field(document, "url").is_some_and(|url| url.starts_with('/'))
    }

    fn create(&self, document: &Map<String, Value>, lang: &ResourceLanguage) -> Result<Resource> {
        let url = field(document, "url")
            .ok_or_else(|| QuarryError::MissingField("url".to_string()))?;
        self.loader.load(url, lang)
    }
}

/// First accepting factory wins.
#[derive(Clone, Default)]
pub struct ResourceFactoryChain {
    factories: Vec<Arc<dyn ResourceFactory>>,
}

impl ResourceFactoryChain {
    pub fn new(factories: Vec<Arc<dyn ResourceFactory>>) -> Self {
        ResourceFactoryChain { factories }
    }

    /// External, media, then internal.
    pub fn with_defaults(loader: Arc<dyn ResourceLoader>) -> Self {
        ResourceFactoryChain::new(vec![
            Arc::new(ExternalResourceFactory),
            Arc::new(InternalMediaResourceFactory),
            Arc::new(InternalResourceFactory::new(loader)),
        ])
    }

    pub fn create(&self, document: &Map<String, Value>, lang: &ResourceLanguage) -> Result<Resource> {
        match self.factories.iter().find(|f| f.accept(document)) {
            Some(factory) => factory.create(document, lang),
            None => Err(QuarryError::unsupported(
                "document",
                field(document, "sp_id").unwrap_or("<unknown>"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StaticLoader;

    impl ResourceLoader for StaticLoader {
        fn load(&self, location: &str, lang: &ResourceLanguage) -> Result<Resource> {
            Resource::from_json(location, json!({"id": "internal", "name": "loaded"}), lang)
        }

        fn exists(&self, _location: &str) -> bool {
            true
        }
    }

    fn chain() -> ResourceFactoryChain {
        ResourceFactoryChain::with_defaults(Arc::new(StaticLoader))
    }

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_external_document() {
        let lang = ResourceLanguage::of("de_DE");
        let res = chain()
            .create(
                &doc(json!({"sp_id": "x1", "url": "https://example.org/", "sp_title": "Ext"})),
                &lang,
            )
            .unwrap();
        assert_eq!(res.object_type, "external");
        assert_eq!(res.name, "Ext");
        assert_eq!(res.location, "https://example.org/");
    }

    #[test]
    fn test_media_document() {
        let res = chain()
            .create(
                &doc(json!({"sp_id": "m1", "url": "/media/1.pdf", "sp_objecttype": "media"})),
                &ResourceLanguage::default_language(),
            )
            .unwrap();
        assert_eq!(res.object_type, "media");
        assert_eq!(res.id, "m1");
    }

    #[test]
    fn test_internal_document_is_loaded() {
        let res = chain()
            .create(
                &doc(json!({"sp_id": "1", "url": "/a.json", "sp_objecttype": "content"})),
                &ResourceLanguage::default_language(),
            )
            .unwrap();
        assert_eq!(res.name, "loaded");
    }

    #[test]
    fn test_no_factory() {
        let err = chain()
            .create(&doc(json!({"sp_id": "1"})), &ResourceLanguage::default_language())
            .unwrap_err();
        assert!(matches!(err, QuarryError::UnsupportedVariant { .. }));
    }
}
