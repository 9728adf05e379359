//! Locale tag -> dictionary mapping, built once from the page's declared
//! sources.
//!
//! Duplicate declarations for the same tag keep the last origin scanned. The
//! catalog never loses entries; the only entry added after discovery is the
//! synthetic page-native dictionary.

use std::collections::HashMap;

use tracing::{debug, error, info, warn};

use crate::dictionary::{Dictionary, DictionaryLoadResult, DictionaryRequest};
use crate::error::{Result, VavilonError};
use crate::host::DeclaredSource;
use crate::locale::LocaleTag;

#[derive(Debug, Default)]
pub struct Catalog {
    dictionaries: HashMap<LocaleTag, Dictionary>,
    order: Vec<LocaleTag>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoadPlan {
    pub eager: Option<DictionaryRequest>,
    pub deferred: Vec<DictionaryRequest>,
}

impl Catalog {
    pub fn discover(sources: impl IntoIterator<Item = DeclaredSource>) -> Self {
        let mut catalog = Self::default();
        for source in sources {
            let locale = LocaleTag::new(&source.locale);
            if locale.is_empty() {
                warn!(origin = %source.origin, "Ignoring dictionary declared without a locale");
                continue;
            }
            if catalog
                .dictionaries
                .insert(locale.clone(), Dictionary::pending(&source.origin))
                .is_some()
            {
                debug!(%locale, origin = %source.origin, "Duplicate dictionary declaration replaces the earlier one");
            } else {
                catalog.order.push(locale);
            }
        }
        info!(locales = ?catalog.order, "Discovered dictionaries");
        catalog
    }

    /// At most one eager load: a tag equal to `user` anywhere in the
    /// declarations, otherwise the first one sharing its language subtag.
    pub fn plan(&self, user: &LocaleTag) -> LoadPlan {
        let eager = self
            .order
            .iter()
            .find(|locale| *locale == user)
            .or_else(|| self.order.iter().find(|locale| locale.same_language(user)))
            .cloned();

        let mut plan = LoadPlan::default();
        for locale in &self.order {
            let Some(origin) = self.dictionaries.get(locale).and_then(Dictionary::source) else {
                continue;
            };
            let request = DictionaryRequest {
                locale: locale.clone(),
                origin: origin.to_string(),
            };
            if eager.as_ref() == Some(locale) {
                plan.eager = Some(request);
            } else {
                plan.deferred.push(request);
            }
        }
        plan
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.dictionaries.contains_key(locale)
    }

    pub fn get(&self, locale: &str) -> Option<&Dictionary> {
        self.dictionaries.get(locale)
    }

    /// Declared locales in discovery order, followed by the page-native one
    /// once it exists.
    pub fn locales(&self) -> impl Iterator<Item = &LocaleTag> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.dictionaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionaries.is_empty()
    }

    /// The dictionary that collects original page text, created on first use.
    /// When the page locale also has a declared dictionary, that one is used.
    pub fn native_mut(&mut self, page_locale: &LocaleTag) -> &mut Dictionary {
        if !self.dictionaries.contains_key(page_locale) {
            debug!(locale = %page_locale, "Creating page-native dictionary");
            self.order.push(page_locale.clone());
        }
        self.dictionaries
            .entry(page_locale.clone())
            .or_insert_with(Dictionary::native)
    }

    /// Applies a finished load. A failure stays recorded on the dictionary and
    /// is also returned to the caller.
    pub fn record(&mut self, result: DictionaryLoadResult) -> Result<()> {
        let DictionaryLoadResult { locale, outcome } = result;
        let Some(dictionary) = self.dictionaries.get_mut(&locale) else {
            warn!(%locale, "Load finished for a locale that was never declared");
            return Err(VavilonError::NoDictionaryFor(locale.to_string()));
        };

        match outcome {
            Ok(strings) => {
                info!(%locale, keys = strings.len(), "Dictionary loaded");
                dictionary.fill(strings);
                Ok(())
            }
            Err(err) => {
                error!(%locale, error = %err, "Dictionary failed to load");
                let reason = err.to_string();
                dictionary.fail(reason.clone());
                Err(VavilonError::DictionaryLoadFailed {
                    locale: locale.to_string(),
                    reason,
                })
            }
        }
    }
}
