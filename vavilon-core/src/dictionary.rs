use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::LoadError;
use crate::host::DictionaryFetcher;
use crate::locale::LocaleTag;

pub type Strings = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionaryState {
    Pending,
    Loaded,
    Failed(String),
}

/// Translated strings for one locale tag.
///
/// A dictionary with no `source` is synthetic: it holds the page's original
/// text, captured the first time each key is replaced.
#[derive(Debug, Clone)]
pub struct Dictionary {
    source: Option<String>,
    strings: Strings,
    state: DictionaryState,
}

impl Dictionary {
    pub fn pending(origin: impl Into<String>) -> Self {
        Self {
            source: Some(origin.into()),
            strings: Strings::new(),
            state: DictionaryState::Pending,
        }
    }

    pub fn native() -> Self {
        Self {
            source: None,
            strings: Strings::new(),
            state: DictionaryState::Loaded,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_synthetic(&self) -> bool {
        self.source.is_none()
    }

    pub fn state(&self) -> &DictionaryState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == DictionaryState::Loaded
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    pub fn strings(&self) -> &Strings {
        &self.strings
    }

    /// Records original page text for `key` unless a value is already held.
    /// Returns whether the value was stored.
    pub fn capture(&mut self, key: &str, text: impl Into<String>) -> bool {
        if self.strings.contains_key(key) {
            return false;
        }
        self.strings.insert(key.to_string(), text.into());
        true
    }

    /// Populates the dictionary from a loaded payload. Values already captured
    /// from the page are kept.
    pub(crate) fn fill(&mut self, strings: Strings) {
        for (key, text) in strings {
            self.strings.entry(key).or_insert(text);
        }
        self.state = DictionaryState::Loaded;
    }

    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        self.state = DictionaryState::Failed(reason.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryRequest {
    pub locale: LocaleTag,
    pub origin: String,
}

/// Outcome of either load path, applied to the catalog by
/// [`Catalog::record`](crate::catalog::Catalog::record).
#[derive(Debug)]
pub struct DictionaryLoadResult {
    pub locale: LocaleTag,
    pub outcome: Result<Strings, LoadError>,
}

/// Fetches the eagerly matched dictionary; the caller awaits it inline.
pub async fn load_blocking(
    fetcher: &dyn DictionaryFetcher,
    request: &DictionaryRequest,
) -> DictionaryLoadResult {
    info!(locale = %request.locale, origin = %request.origin, "Loading dictionary");
    DictionaryLoadResult {
        locale: request.locale.clone(),
        outcome: fetcher.fetch(&request.origin).await,
    }
}

/// Builds an owned fetch for a dictionary that must not block start-up.
/// The returned future is meant to be spawned.
pub fn load_deferred(
    fetcher: Arc<dyn DictionaryFetcher>,
    request: DictionaryRequest,
) -> impl Future<Output = DictionaryLoadResult> + Send + 'static {
    async move {
        debug!(locale = %request.locale, origin = %request.origin, "Loading deferred dictionary");
        let outcome = fetcher.fetch(&request.origin).await;
        DictionaryLoadResult {
            locale: request.locale,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_keeps_first_value() {
        let mut dict = Dictionary::native();
        assert!(dict.capture("greeting", "Hello"));
        assert!(!dict.capture("greeting", "Bonjour"));
        assert_eq!(dict.get("greeting"), Some("Hello"));
        assert!(dict.is_synthetic());
        assert!(dict.is_loaded());
    }

    #[test]
    fn test_fill_preserves_captured_text() {
        let mut dict = Dictionary::pending("dicts/en.json");
        dict.capture("title", "Original title");
        dict.fill(Strings::from([
            ("title".to_string(), "Loaded title".to_string()),
            ("footer".to_string(), "Footer".to_string()),
        ]));

        assert!(dict.is_loaded());
        assert_eq!(dict.get("title"), Some("Original title"));
        assert_eq!(dict.get("footer"), Some("Footer"));
    }

    #[test]
    fn test_fail_leaves_strings_empty() {
        let mut dict = Dictionary::pending("dicts/de.json");
        dict.fail("no payload");
        assert_eq!(dict.state(), &DictionaryState::Failed("no payload".to_string()));
        assert!(dict.strings().is_empty());
        assert_eq!(dict.source(), Some("dicts/de.json"));
    }
}
