use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Location of a resource below the resource base, e.g. `"/news/article.json"`.
pub type ResourceLocation = String;

/// Locale of a resource, e.g. `de_DE`. The empty locale is the default language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceLanguage(String);

impl ResourceLanguage {
    pub fn of(locale: impl Into<String>) -> Self {
        ResourceLanguage(locale.into())
    }

    pub fn default_language() -> Self {
        ResourceLanguage(String::new())
    }

    pub fn is_default(&self) -> bool {
        self.0.is_empty()
    }

    pub fn locale(&self) -> &str {
        &self.0
    }

    /// Two-letter language code (`"de"` for `de_DE`), empty for the default language.
    pub fn code(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(2)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for ResourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Nested key/value data of a resource with dotted-path accessors.
///
/// `bag.get_string("base.teaser.headline")` walks `base` → `teaser` → `headline`.
/// Array elements are addressed by their index (`"items.0.id"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataBag(Map<String, Value>);

impl DataBag {
    pub fn new(data: Map<String, Value>) -> Self {
        DataBag(data)
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => DataBag(map),
            _ => DataBag::default(),
        }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.0.get(first)?;
        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some_and(|v| !v.is_null())
    }

    pub fn get_string(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Non-empty string at `path`.
    pub fn get_text(&self, path: &str) -> Option<&str> {
        self.get_string(path).filter(|s| !s.trim().is_empty())
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        match self.get(path)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get_bool(&self, path: &str) -> bool {
        match self.get(path) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
            Some(Value::String(s)) => s == "true" || s == "1",
            _ => false,
        }
    }

    /// Array at `path`; objects are treated as lists of their values, in key order.
    pub fn get_array(&self, path: &str) -> Vec<&Value> {
        match self.get(path) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(Value::Object(map)) => map.values().collect(),
            _ => Vec::new(),
        }
    }

    pub fn get_object(&self, path: &str) -> Option<&Map<String, Value>> {
        self.get(path).and_then(Value::as_object)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// A CMS content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub location: ResourceLocation,
    pub id: String,
    pub name: String,
    pub object_type: String,
    pub lang: ResourceLanguage,
    pub data: DataBag,
}

impl Resource {
    /// Build a resource from a JSON object.
    ///
    /// Top-level `id`, `name`, `objectType` and `locale` become resource fields,
    /// the whole object becomes the data bag.
    ///
    /// # Errors
    ///
    /// Returns [`crate::QuarryError::ResourceLoad`] if `json` is not an object or
    /// has no `id`.
    pub fn from_json(
        location: &str,
        json: Value,
        lang: &ResourceLanguage,
    ) -> crate::error::Result<Self> {
        use crate::error::QuarryError;

        let obj = match json {
            Value::Object(obj) => obj,
            _ => {
                return Err(QuarryError::resource_load(
                    location,
                    "expected JSON object",
                ))
            }
        };

        let id = match obj.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(QuarryError::resource_load(location, "missing id")),
        };
        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let object_type = obj
            .get("objectType")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let lang = match obj.get("locale").and_then(Value::as_str) {
            Some(locale) if !locale.is_empty() => ResourceLanguage::of(locale),
            _ => lang.clone(),
        };

        Ok(Resource {
            location: location.to_string(),
            id,
            name,
            object_type,
            lang,
            data: DataBag::new(obj),
        })
    }
}
