use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A normalized locale identifier such as `en` or `en-us`.
///
/// The only way to build one is [`LocaleTag::new`], which trims and
/// lower-cases the input, so two tags compare equal exactly when their
/// sources differ only in case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LocaleTag(String);

impl LocaleTag {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-character language subtag (`en-us` -> `en`).
    pub fn language(&self) -> LocaleTag {
        Self(self.0.chars().take(2).collect())
    }

    pub fn same_language(&self, other: &LocaleTag) -> bool {
        self.language() == other.language()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for LocaleTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LocaleTag {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for LocaleTag {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl<'de> Deserialize<'de> for LocaleTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_and_whitespace() {
        assert_eq!(LocaleTag::new(" en-US ").as_str(), "en-us");
        assert_eq!(LocaleTag::new("FR"), LocaleTag::new("fr"));
    }

    #[test]
    fn test_language_subtag() {
        assert_eq!(LocaleTag::new("fr-CA").language().as_str(), "fr");
        assert_eq!(LocaleTag::new("de").language().as_str(), "de");
        assert!(LocaleTag::new("en-gb").same_language(&LocaleTag::new("EN-us")));
        assert!(!LocaleTag::new("en").same_language(&LocaleTag::new("es")));
    }

    #[test]
    fn test_deserialize_normalizes() {
        let tag: LocaleTag = serde_json::from_str("\"Pt-BR\"").unwrap();
        assert_eq!(tag.as_str(), "pt-br");
    }
}
