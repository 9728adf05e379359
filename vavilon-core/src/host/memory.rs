use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    DeclaredSource, DictionaryFetcher, ElementId, LanguageSettings, MarkedElement, Page,
    PreferenceStore,
};
use crate::config::{DEFAULT_DICTIONARY_ATTRIBUTE, DEFAULT_KEY_ATTRIBUTE, DEFAULT_MARKER_CLASS};
use crate::dictionary::Strings;
use crate::error::LoadError;
use crate::locale::LocaleTag;
use crate::registry::Marker;

/// An in-memory document: scripts that may declare dictionaries and
/// elements that may carry the translation marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticPage {
    pub lang: String,
    #[serde(default)]
    pub scripts: Vec<StaticScript>,
    #[serde(default)]
    pub elements: Vec<StaticElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticScript {
    pub src: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticElement {
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub text: String,
}

impl StaticPage {
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            ..Self::default()
        }
    }

    pub fn with_dictionary(mut self, locale: &str, src: &str) -> Self {
        self.scripts.push(StaticScript {
            src: src.to_string(),
            attributes: HashMap::from([(
                DEFAULT_DICTIONARY_ATTRIBUTE.to_string(),
                locale.to_string(),
            )]),
        });
        self
    }

    pub fn with_script(mut self, src: &str) -> Self {
        self.scripts.push(StaticScript {
            src: src.to_string(),
            attributes: HashMap::new(),
        });
        self
    }

    /// Adds a marked element using the default marker class and key annotation.
    pub fn with_element(mut self, key: &str, text: &str) -> Self {
        self.elements.push(StaticElement {
            classes: vec![DEFAULT_MARKER_CLASS.to_string()],
            attributes: HashMap::from([(DEFAULT_KEY_ATTRIBUTE.to_string(), key.to_string())]),
            text: text.to_string(),
        });
        self
    }

    pub fn with_plain_element(mut self, text: &str) -> Self {
        self.elements.push(StaticElement {
            text: text.to_string(),
            ..StaticElement::default()
        });
        self
    }

    pub fn texts(&self) -> Vec<&str> {
        self.elements.iter().map(|e| e.text.as_str()).collect()
    }
}

impl Page for StaticPage {
    fn lang(&self) -> String {
        self.lang.clone()
    }

    fn dictionary_sources(&self, attribute: &str) -> Vec<DeclaredSource> {
        self.scripts
            .iter()
            .filter_map(|script| {
                let locale = script.attributes.get(attribute)?;
                (!locale.is_empty()).then(|| DeclaredSource {
                    locale: locale.clone(),
                    origin: script.src.clone(),
                })
            })
            .collect()
    }

    fn marked_elements(&self, marker: &Marker) -> Vec<MarkedElement> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.classes.iter().any(|c| *c == marker.class))
            .map(|(index, element)| MarkedElement {
                id: ElementId(index),
                key: element.attributes.get(&marker.key_attribute).cloned(),
            })
            .collect()
    }

    fn text(&self, id: ElementId) -> Option<String> {
        self.elements.get(id.0).map(|e| e.text.clone())
    }

    fn set_text(&mut self, id: ElementId, text: &str) {
        if let Some(element) = self.elements.get_mut(id.0) {
            element.text = text.to_string();
        }
    }
}

/// Preference store kept in memory. Clones share the stored value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Arc::new(Mutex::new(Some(value.into()))),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.value.lock().ok().and_then(|v| v.clone())
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> Option<String> {
        self.get()
    }

    fn save(&mut self, locale: &LocaleTag) {
        if let Ok(mut value) = self.value.lock() {
            *value = Some(locale.to_string());
        }
    }
}

/// Serves preset payloads keyed by origin and records every request.
/// Clones share the request log.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    payloads: HashMap<String, Strings>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload<K, V>(mut self, origin: &str, strings: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.payloads.insert(
            origin.to_string(),
            strings.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DictionaryFetcher for MemoryFetcher {
    async fn fetch(&self, origin: &str) -> Result<Strings, LoadError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(origin.to_string());
        }
        self.payloads
            .get(origin)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(origin.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FixedLanguages(pub Vec<String>);

impl FixedLanguages {
    pub fn new<S: Into<String>>(languages: impl IntoIterator<Item = S>) -> Self {
        Self(languages.into_iter().map(Into::into).collect())
    }
}

impl LanguageSettings for FixedLanguages {
    fn languages(&self) -> Vec<String> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_page_sources_and_elements() {
        let page = StaticPage::new("en")
            .with_script("js/app.js")
            .with_dictionary("fr", "dicts/fr.json")
            .with_plain_element("unmarked")
            .with_element("greeting", "Hello");

        let sources = page.dictionary_sources(DEFAULT_DICTIONARY_ATTRIBUTE);
        assert_eq!(
            sources,
            vec![DeclaredSource {
                locale: "fr".to_string(),
                origin: "dicts/fr.json".to_string(),
            }]
        );

        let marked = page.marked_elements(&Marker::default());
        assert_eq!(
            marked,
            vec![MarkedElement {
                id: ElementId(1),
                key: Some("greeting".to_string()),
            }]
        );
    }

    #[test]
    fn test_static_page_from_yaml() {
        let yaml = r#"
lang: en
scripts:
  - src: dicts/de.json
    attributes:
      data-vavilon-dict: de
elements:
  - classes: [vavilon, title]
    attributes:
      data-vavilon: title
    text: Welcome
"#;
        let mut page: StaticPage = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(page.dictionary_sources(DEFAULT_DICTIONARY_ATTRIBUTE).len(), 1);
        page.set_text(ElementId(0), "Willkommen");
        assert_eq!(page.text(ElementId(0)).as_deref(), Some("Willkommen"));
        assert_eq!(page.text(ElementId(7)), None);
    }

    #[test]
    fn test_memory_store_clones_share_value() {
        let store = MemoryStore::default();
        let mut writer = store.clone();
        assert_eq!(store.load(), None);
        writer.save(&LocaleTag::new("de-AT"));
        assert_eq!(store.get().as_deref(), Some("de-at"));
    }

    #[tokio::test]
    async fn test_memory_fetcher_records_requests() {
        let fetcher = MemoryFetcher::new().with_payload("dicts/fr.json", [("greeting", "Bonjour")]);

        let strings = fetcher.fetch("dicts/fr.json").await.unwrap();
        assert_eq!(strings.get("greeting").map(String::as_str), Some("Bonjour"));
        assert!(matches!(
            fetcher.fetch("dicts/xx.json").await,
            Err(LoadError::NotFound(_))
        ));
        assert_eq!(fetcher.requests(), vec!["dicts/fr.json", "dicts/xx.json"]);
    }
}
