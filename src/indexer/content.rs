//! Full-text extraction from the nested content tree of a resource.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock};

/// Decides whether a node of the content tree carries text.
///
/// `path` is the breadcrumb of keys leading to `value` (array positions are
/// given as their index).
pub trait ContentMatcher: Send + Sync {
    fn match_content(&self, path: &[String], value: &Map<String, Value>) -> Option<String>;
}

/// Depth-first, pre-order walk over all nested objects; every matcher is tried
/// on every object node and matches are joined with single spaces.
#[derive(Clone, Default)]
pub struct ContentCollector {
    matchers: Vec<Arc<dyn ContentMatcher>>,
}

impl ContentCollector {
    pub fn new(matchers: Vec<Arc<dyn ContentMatcher>>) -> Self {
        ContentCollector { matchers }
    }

    /// Collector with the headline and rich-text matchers.
    pub fn with_default_matchers() -> Self {
        ContentCollector::new(vec![Arc::new(HeadlineMatcher), Arc::new(RichTextMatcher)])
    }

    pub fn collect(&self, data: &Map<String, Value>) -> String {
        let mut snippets = Vec::new();
        let mut path = Vec::new();
        self.walk_object(&mut path, data, &mut snippets);
        snippets.join(" ")
    }

    fn walk_object(&self, path: &mut Vec<String>, data: &Map<String, Value>, out: &mut Vec<String>) {
        for (key, value) in data {
            path.push(key.clone());
            self.visit(path, value, out);
            path.pop();
        }
    }

    fn visit(&self, path: &mut Vec<String>, value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                for matcher in &self.matchers {
                    if let Some(text) = matcher.match_content(path, map) {
                        if !text.is_empty() {
                            out.push(text);
                        }
                    }
                }
                self.walk_object(path, map, out);
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    path.push(i.to_string());
                    self.visit(path, item, out);
                    path.pop();
                }
            }
            _ => {}
        }
    }
}

/// Headline of a content model: `{..., "model": {"headline": "..."}}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlineMatcher;

impl ContentMatcher for HeadlineMatcher {
    fn match_content(&self, path: &[String], value: &Map<String, Value>) -> Option<String> {
        if path.last().map(String::as_str) != Some("model") {
            return None;
        }
        value
            .get("headline")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
    }
}

/// Rich text nodes `{"type": "html", "normalized": "<p>...</p>"}`, converted to plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RichTextMatcher;

impl ContentMatcher for RichTextMatcher {
    fn match_content(&self, _path: &[String], value: &Map<String, Value>) -> Option<String> {
        if value.get("type").and_then(Value::as_str) != Some("html") {
            return None;
        }
        value
            .get("normalized")
            .and_then(Value::as_str)
            .map(html_to_text)
    }
}

fn tag_regex() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"))
}

fn whitespace_regex() -> &'static Regex {
    static WS: OnceLock<Regex> = OnceLock::new();
    WS.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// Strip markup and decode the common entities.
pub fn html_to_text(html: &str) -> String {
    let stripped = tag_regex().replace_all(html, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    normalize_whitespace(&decoded)
}

/// Collapse whitespace runs into single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    whitespace_regex().replace_all(text, " ").trim().to_string()
}
