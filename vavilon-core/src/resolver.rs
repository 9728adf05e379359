use std::fmt;

use tracing::info;

use crate::error::{Result, VavilonError};
use crate::host::{LanguageSettings, PreferenceStore};
use crate::locale::LocaleTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleOrigin {
    Preference,
    Host,
    Default,
}

impl fmt::Display for LocaleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocaleOrigin::Preference => write!(f, "preference"),
            LocaleOrigin::Host => write!(f, "host"),
            LocaleOrigin::Default => write!(f, "default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocale {
    pub tag: LocaleTag,
    pub origin: LocaleOrigin,
}

/// The visitor's preferred locale: the stored preference if there is one,
/// otherwise the first non-empty host language setting.
pub fn resolve(store: &dyn PreferenceStore, languages: &dyn LanguageSettings) -> Result<ResolvedLocale> {
    let preference = store
        .load()
        .map(LocaleTag::new)
        .filter(|tag| !tag.is_empty())
        .map(|tag| ResolvedLocale {
            tag,
            origin: LocaleOrigin::Preference,
        });

    let resolved = preference
        .or_else(|| {
            languages
                .languages()
                .into_iter()
                .map(LocaleTag::new)
                .find(|tag| !tag.is_empty())
                .map(|tag| ResolvedLocale {
                    tag,
                    origin: LocaleOrigin::Host,
                })
        })
        .ok_or(VavilonError::LocaleUnavailable)?;

    info!(locale = %resolved.tag, origin = %resolved.origin, "Resolved user locale");
    Ok(resolved)
}

/// Like [`resolve`], falling back to `default` when nothing is reported.
pub fn resolve_or_default(
    store: &dyn PreferenceStore,
    languages: &dyn LanguageSettings,
    default: Option<&LocaleTag>,
) -> Result<ResolvedLocale> {
    match (resolve(store, languages), default) {
        (Err(VavilonError::LocaleUnavailable), Some(tag)) => {
            let resolved = ResolvedLocale {
                tag: tag.clone(),
                origin: LocaleOrigin::Default,
            };
            info!(locale = %resolved.tag, origin = %resolved.origin, "Resolved user locale");
            Ok(resolved)
        }
        (result, _) => result,
    }
}
