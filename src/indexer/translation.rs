use crate::types::{ResourceLanguage, ResourceLocation};
use std::collections::BTreeMap;
use std::path::Path;

const TRANSLATIONS_SUFFIX: &str = ".translations";

/// Resolve a `?loc=<LOCALE>` location into the translation file it addresses.
///
/// `/a/b.json?loc=en_US` becomes `/a/b.json.translations/en_US.json`. A location
/// without query is returned as is; a query without a usable `loc` parameter is
/// dropped and the base location returned.
pub fn normalize_location(location: &str) -> ResourceLocation {
    let Some((path, query)) = location.split_once('?') else {
        return location.to_string();
    };

    match locale_from_query(query) {
        Some(locale) => {
            let ext = Path::new(path)
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{}", e))
                .unwrap_or_default();
            format!("{}{}/{}{}", path, TRANSLATIONS_SUFFIX, locale, ext)
        }
        None => path.to_string(),
    }
}

fn locale_from_query(query: &str) -> Option<&str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "loc")
        .map(|(_, value)| value)
        .filter(|value| is_locale(value))
}

fn is_locale(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 16
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Locale encoded in a translation location, `None` for base locations.
pub fn translation_locale(location: &str) -> Option<String> {
    let path = Path::new(location);
    let parent = path.parent()?.file_name()?.to_str()?;
    if !parent.ends_with(TRANSLATIONS_SUFFIX) {
        return None;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| is_locale(s))
        .map(|s| s.to_string())
}

/// Partition of locations into base language and per-locale translations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationSplitterResult {
    bases: Vec<ResourceLocation>,
    translations: BTreeMap<String, Vec<ResourceLocation>>,
}

impl TranslationSplitterResult {
    pub fn bases(&self) -> &[ResourceLocation] {
        &self.bases
    }

    pub fn locales(&self) -> Vec<ResourceLanguage> {
        self.translations
            .keys()
            .map(|locale| ResourceLanguage::of(locale.as_str()))
            .collect()
    }

    pub fn translations(&self, lang: &ResourceLanguage) -> &[ResourceLocation] {
        self.translations
            .get(lang.locale())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn all_translations(&self) -> &BTreeMap<String, Vec<ResourceLocation>> {
        &self.translations
    }

    pub fn len(&self) -> usize {
        self.bases.len() + self.translations.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TranslationSplitter;

impl TranslationSplitter {
    pub fn new() -> Self {
        TranslationSplitter
    }

    pub fn split(&self, locations: &[ResourceLocation]) -> TranslationSplitterResult {
        let mut result = TranslationSplitterResult::default();
        for location in locations {
            let normalized = normalize_location(location);
            match translation_locale(&normalized) {
                Some(locale) => result
                    .translations
                    .entry(locale)
                    .or_default()
                    .push(normalized),
                None => result.bases.push(normalized),
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations(list: &[&str]) -> Vec<ResourceLocation> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_query_location() {
        assert_eq!(
            normalize_location("/a/b.json?loc=it_IT"),
            "/a/b.json.translations/it_IT.json"
        );
        assert_eq!(
            normalize_location("/a/b.json?x=1&loc=en_US"),
            "/a/b.json.translations/en_US.json"
        );
    }

    #[test]
    fn test_normalize_malformed_query_falls_back_to_base() {
        assert_eq!(normalize_location("/a/b.json?loc="), "/a/b.json");
        assert_eq!(normalize_location("/a/b.json?loc=../../x"), "/a/b.json");
        assert_eq!(normalize_location("/a/b.json?garbage"), "/a/b.json");
        assert_eq!(normalize_location("/a/b.json"), "/a/b.json");
    }

    #[test]
    fn test_split_bases_and_translations() {
        let splitter = TranslationSplitter::new();
        let result = splitter.split(&locations(&[
            "/a.json",
            "/a.json.translations/en_US.json",
            "/b.json?loc=en_US",
            "/c.json.translations/it_IT.json",
            "/d.json?loc=",
        ]));

        assert_eq!(result.bases(), &locations(&["/a.json", "/d.json"])[..]);
        assert_eq!(
            result.translations(&ResourceLanguage::of("en_US")),
            &locations(&[
                "/a.json.translations/en_US.json",
                "/b.json.translations/en_US.json"
            ])[..]
        );
        assert_eq!(result.locales().len(), 2);
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn test_split_is_idempotent() {
        let splitter = TranslationSplitter::new();
        let first = splitter.split(&locations(&[
            "/x/a.json",
            "/x/a.json?loc=fr_FR",
            "/x/b.json.translations/de_CH.json",
            "/y/translations/c.json",
        ]));

        let mut again: Vec<ResourceLocation> = first.bases().to_vec();
        for list in first.all_translations().values() {
            again.extend(list.iter().cloned());
        }
        assert_eq!(splitter.split(&again), first);
    }

    #[test]
    fn test_directory_named_translations_without_suffix_is_base() {
        assert_eq!(translation_locale("/y/translations/c.json"), None);
        assert_eq!(
            translation_locale("/y/c.json.translations/en.json"),
            Some("en".to_string())
        );
    }
}
