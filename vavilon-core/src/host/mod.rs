//! Collaborators the engine talks to but does not own: the page, the
//! dictionary transport, the stored locale preference and the host's
//! language settings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::dictionary::Strings;
use crate::error::LoadError;
use crate::locale::LocaleTag;
use crate::registry::Marker;

pub mod fs;
pub mod memory;
pub mod system;

pub use fs::{FileStore, FsFetcher};
pub use memory::{FixedLanguages, MemoryFetcher, MemoryStore, StaticPage};
pub use system::SystemLanguages;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredSource {
    pub locale: String,
    pub origin: String,
}

/// An element carrying the translation marker. `key` is `None` when the
/// element lacks the key annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedElement {
    pub id: ElementId,
    pub key: Option<String>,
}

pub trait Page {
    fn lang(&self) -> String;

    /// Sources annotated with `attribute`, in document order.
    fn dictionary_sources(&self, attribute: &str) -> Vec<DeclaredSource>;

    fn marked_elements(&self, marker: &Marker) -> Vec<MarkedElement>;

    fn text(&self, id: ElementId) -> Option<String>;

    fn set_text(&mut self, id: ElementId, text: &str);
}

#[async_trait]
pub trait DictionaryFetcher: Send + Sync {
    /// Fetch and decode the flat key -> text payload at `origin`.
    async fn fetch(&self, origin: &str) -> Result<Strings, LoadError>;
}

pub trait PreferenceStore: Send {
    fn load(&self) -> Option<String>;

    fn save(&mut self, locale: &LocaleTag);
}

/// Language settings reported by the host, most preferred first.
pub trait LanguageSettings: Send {
    fn languages(&self) -> Vec<String>;
}
