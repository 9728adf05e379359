mod yaml;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::locale::LocaleTag;
use crate::registry::Marker;

pub use yaml::{ConfigError, load_from_file, load_from_str};

pub const DEFAULT_MARKER_CLASS: &str = "vavilon";
pub const DEFAULT_KEY_ATTRIBUTE: &str = "data-vavilon";
pub const DEFAULT_DICTIONARY_ATTRIBUTE: &str = "data-vavilon-dict";
pub const DEFAULT_PREFERENCE_KEY: &str = "vavilon-locale";

/// Engine configuration. Every field has a default, so an empty document is
/// a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VavilonConfig {
    pub marker_class: String,
    pub key_attribute: String,
    /// Script annotation holding a dictionary's locale tag.
    pub dictionary_attribute: String,
    pub preference_key: String,
    /// Used when neither a stored preference nor a host language exists.
    pub default_locale: Option<LocaleTag>,
    pub logging: LoggingConfig,
}

impl Default for VavilonConfig {
    fn default() -> Self {
        Self {
            marker_class: DEFAULT_MARKER_CLASS.to_string(),
            key_attribute: DEFAULT_KEY_ATTRIBUTE.to_string(),
            dictionary_attribute: DEFAULT_DICTIONARY_ATTRIBUTE.to_string(),
            preference_key: DEFAULT_PREFERENCE_KEY.to_string(),
            default_locale: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl VavilonConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_from_file(path)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        load_from_str(content)
    }

    pub fn marker(&self) -> Marker {
        Marker {
            class: self.marker_class.clone(),
            key_attribute: self.key_attribute.clone(),
        }
    }
}

/// The `logging:` section, consumed by `vavilon-logger`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level or filter directive; `RUST_LOG` overrides it.
    pub level: String,
    pub console: bool,
    /// Daily rolling file output.
    pub file: bool,
    pub log_dir: PathBuf,
    pub file_prefix: String,
    /// chrono strftime format.
    pub time_format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console: true,
            file: false,
            log_dir: PathBuf::from("./logs"),
            file_prefix: "vavilon.log".to_string(),
            time_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = VavilonConfig::from_yaml("{}").unwrap();
        assert_eq!(config, VavilonConfig::default());
        assert_eq!(config.marker(), Marker::default());
    }

    #[test]
    fn test_overrides_and_env_substitution() {
        unsafe {
            std::env::set_var("VAVILON_CONFIG_TEST_DEFAULT", "PT-br");
        }
        let yaml = r#"
marker_class: i18n
key_attribute: data-i18n
default_locale: ${VAVILON_CONFIG_TEST_DEFAULT}
logging:
  level: ${VAVILON_CONFIG_TEST_LEVEL:debug}
  file: true
"#;
        let config = VavilonConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.marker_class, "i18n");
        assert_eq!(config.marker().key_attribute, "data-i18n");
        assert_eq!(config.dictionary_attribute, DEFAULT_DICTIONARY_ATTRIBUTE);
        assert_eq!(config.default_locale, Some(LocaleTag::new("pt-br")));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file);
        assert!(config.logging.console);
    }

    #[test]
    fn test_from_missing_file() {
        assert!(matches!(
            VavilonConfig::from_file("/this/path/should/not/exist.yaml"),
            Err(ConfigError::Io(_))
        ));
    }
}
