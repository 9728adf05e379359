use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{DEFAULT_KEY_ATTRIBUTE, DEFAULT_MARKER_CLASS};
use crate::host::{ElementId, Page};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub class: String,
    pub key_attribute: String,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            class: DEFAULT_MARKER_CLASS.to_string(),
            key_attribute: DEFAULT_KEY_ATTRIBUTE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredElement {
    pub id: ElementId,
    pub key: String,
}

/// Elements to translate. Empty until [`ElementRegistry::discover`] runs.
#[derive(Debug, Default)]
pub struct ElementRegistry {
    elements: Option<Vec<RegisteredElement>>,
}

impl ElementRegistry {
    /// Reads every marked element from the page, replacing any earlier set.
    pub fn discover<P: Page + ?Sized>(&mut self, page: &P, marker: &Marker) -> &[RegisteredElement] {
        let elements: Vec<_> = page
            .marked_elements(marker)
            .into_iter()
            .filter_map(|marked| match marked.key {
                Some(key) if !key.is_empty() => Some(RegisteredElement { id: marked.id, key }),
                _ => {
                    warn!(element = marked.id.0, attribute = %marker.key_attribute, "Marked element has no translation key");
                    None
                }
            })
            .collect();
        debug!(count = elements.len(), "Registered elements");
        self.elements.insert(elements)
    }

    pub fn is_discovered(&self) -> bool {
        self.elements.is_some()
    }

    pub fn elements(&self) -> &[RegisteredElement] {
        self.elements.as_deref().unwrap_or_default()
    }
}
