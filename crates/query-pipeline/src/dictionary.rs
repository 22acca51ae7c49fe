//! Morphological dictionaries consulted by the morphology transformer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Source of word forms for a language.
///
/// Implementations must return an empty list for unknown languages and
/// unknown words rather than failing.
pub trait MorphologyDictionary: Send + Sync {
    fn lookup(&self, word: &str, language: &str) -> Vec<String>;

    /// Whether any forms are known for `language`.
    fn supports_language(&self, language: &str) -> bool;
}

/// In-memory dictionary keyed by language, then by lowercased word.
///
/// Serializes as `{"en": {"search": ["searches"]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticDictionary {
    languages: HashMap<String, HashMap<String, Vec<String>>>,
}

impl StaticDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn insert<I, S>(&mut self, language: &str, word: &str, forms: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages
            .entry(language.to_string())
            .or_default()
            .entry(word.to_lowercase())
            .or_default()
            .extend(forms.into_iter().map(Into::into));
    }

    pub fn with_forms<I, S>(mut self, language: &str, word: &str, forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(language, word, forms);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.languages.values().all(HashMap::is_empty)
    }
}

impl MorphologyDictionary for StaticDictionary {
    fn lookup(&self, word: &str, language: &str) -> Vec<String> {
        let Some(words) = self.languages.get(language) else {
            return Vec::new();
        };
        words
            .get(word)
            .or_else(|| words.get(&word.to_lowercase()))
            .cloned()
            .unwrap_or_default()
    }

    fn supports_language(&self, language: &str) -> bool {
        self.languages.contains_key(language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_on_word() {
        let dictionary = StaticDictionary::new().with_forms("en", "Search", ["searches"]);

        assert_eq!(dictionary.lookup("search", "en"), vec!["searches"]);
        assert_eq!(dictionary.lookup("SEARCH", "en"), vec!["searches"]);
    }

    #[test]
    fn unknown_language_and_word_are_empty() {
        let dictionary = StaticDictionary::new().with_forms("en", "search", ["searches"]);

        assert!(dictionary.lookup("search", "zz").is_empty());
        assert!(dictionary.lookup("kavanaba", "en").is_empty());
        assert!(dictionary.supports_language("en"));
        assert!(!dictionary.supports_language("zz"));
    }

    #[test]
    fn loads_from_json() {
        let dictionary =
            StaticDictionary::from_json(r#"{"en": {"engine": ["engines"]}}"#).unwrap();

        assert!(!dictionary.is_empty());
        assert_eq!(dictionary.lookup("engine", "en"), vec!["engines"]);
    }
}
