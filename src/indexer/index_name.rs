use crate::types::ResourceLanguage;

/// Index naming shared by indexing and search: the default index serves the
/// base language and the default locale, other locales go to
/// `<default>-<language code>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexName {
    default_index: String,
    default_locale: Option<String>,
}

impl IndexName {
    pub fn new(default_index: impl Into<String>) -> Self {
        IndexName {
            default_index: default_index.into(),
            default_locale: None,
        }
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        let locale = locale.into();
        self.default_locale = (!locale.is_empty()).then_some(locale);
        self
    }

    /// Same locale routing below another default index.
    pub fn rebase(&self, default_index: impl Into<String>) -> Self {
        IndexName {
            default_index: default_index.into(),
            default_locale: self.default_locale.clone(),
        }
    }

    pub fn default_index(&self) -> &str {
        &self.default_index
    }

    pub fn default_locale(&self) -> Option<&str> {
        self.default_locale.as_deref()
    }

    pub fn for_language(&self, lang: &ResourceLanguage) -> String {
        if lang.is_default() || self.default_locale() == Some(lang.locale()) {
            self.default_index.clone()
        } else {
            format!("{}-{}", self.default_index, lang.code())
        }
    }

    /// Default index plus one index per distinct language of `langs`.
    pub fn managed_indexes(&self, langs: &[ResourceLanguage]) -> Vec<String> {
        let mut names = vec![self.default_index.clone()];
        for lang in langs {
            let name = self.for_language(lang);
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Whether `name` is the default index or one of its language indexes.
    pub fn is_managed(&self, name: &str) -> bool {
        if name == self.default_index {
            return true;
        }
        name.strip_prefix(&self.default_index)
            .and_then(|rest| rest.strip_prefix('-'))
            .is_some_and(|code| code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_indexes() {
        let names = IndexName::new("www");
        assert_eq!(names.for_language(&ResourceLanguage::default_language()), "www");
        assert_eq!(names.for_language(&ResourceLanguage::of("en_US")), "www-en");
        assert_eq!(
            names.managed_indexes(&[
                ResourceLanguage::of("en_US"),
                ResourceLanguage::of("en_GB"),
                ResourceLanguage::of("it_IT"),
            ]),
            vec!["www", "www-en", "www-it"]
        );
    }

    #[test]
    fn test_default_locale_uses_base_index() {
        let names = IndexName::new("www").with_default_locale("de_DE");
        assert_eq!(names.for_language(&ResourceLanguage::of("de_DE")), "www");
        assert_eq!(names.for_language(&ResourceLanguage::of("de_AT")), "www-de");
        assert_eq!(names.for_language(&ResourceLanguage::of("en_US")), "www-en");
        assert_eq!(
            names.managed_indexes(&[ResourceLanguage::of("de_DE"), ResourceLanguage::of("fr_FR")]),
            vec!["www", "www-fr"]
        );

        let intranet = names.rebase("intranet");
        assert_eq!(intranet.default_locale(), Some("de_DE"));
        assert_eq!(intranet.for_language(&ResourceLanguage::of("de_DE")), "intranet");

        assert_eq!(IndexName::new("www").with_default_locale("").default_locale(), None);
    }

    #[test]
    fn test_is_managed() {
        let names = IndexName::new("www");
        assert!(names.is_managed("www"));
        assert!(names.is_managed("www-fr"));
        assert!(!names.is_managed("www-archive"));
        assert!(!names.is_managed("intranet"));
    }
}
