use thiserror::Error;

use crate::config::ConfigError;

/// Engine conditions. Every variant is recovered locally by the engine and
/// degrades to leaving the visible text as it is.
#[derive(Debug, Error)]
pub enum VavilonError {
    #[error("no locale candidate: no stored preference and the host reports no language")]
    LocaleUnavailable,
    #[error("dictionary for {locale} failed to load: {reason}")]
    DictionaryLoadFailed { locale: String, reason: String },
    #[error("no dictionary for {0}")]
    NoDictionaryFor(String),
    #[error("dictionary for {0} has not finished loading")]
    DictionaryPending(String),
    #[error("{0} not in dictionary")]
    MissingTranslation(String),
    #[error("engine is no longer running")]
    EngineStopped,
    #[error("{0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("no payload at {0}")]
    NotFound(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

pub type Result<T, E = VavilonError> = std::result::Result<T, E>;
