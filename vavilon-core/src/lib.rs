//! Page text localization.
//!
//! Resolves a visitor's locale, loads the matching dictionary and rewrites
//! the text of marked page elements, with runtime switching between the
//! declared dictionaries and the page's own authored text.

pub mod catalog;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod dictionary;
pub mod error;
pub mod host;
pub mod locale;
pub mod matcher;
pub mod registry;
pub mod replacer;
pub mod resolver;
pub mod runtime;

pub use catalog::{Catalog, LoadPlan};
pub use config::{LoggingConfig, VavilonConfig};
pub use coordinator::{Coordinator, Phase, Status};
pub use dictionary::{Dictionary, DictionaryLoadResult, DictionaryState, Strings};
pub use error::{LoadError, Result, VavilonError};
pub use locale::LocaleTag;
pub use replacer::ReplaceReport;
pub use runtime::{Engine, EngineHandle};
