use crate::catalog::Catalog;
use crate::dictionary::Dictionary;
use crate::locale::LocaleTag;
use crate::registry::ElementRegistry;

/// All engine state for one page. Created once per page and handed to each
/// component explicitly.
#[derive(Debug)]
pub struct Context {
    pub catalog: Catalog,
    pub registry: ElementRegistry,
    active: Option<LocaleTag>,
    pub user: LocaleTag,
    pub page_locale: LocaleTag,
}

impl Context {
    pub fn new(catalog: Catalog, user: LocaleTag, page_locale: LocaleTag) -> Self {
        Self {
            catalog,
            registry: ElementRegistry::default(),
            active: None,
            user,
            page_locale,
        }
    }

    pub fn active(&self) -> Option<&LocaleTag> {
        self.active.as_ref()
    }

    /// Returns `false` and leaves the active locale alone when `locale` is not
    /// in the catalog.
    pub fn set_active(&mut self, locale: LocaleTag) -> bool {
        if !self.catalog.contains(locale.as_str()) {
            return false;
        }
        self.active = Some(locale);
        true
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    pub fn active_dictionary(&self) -> Option<&Dictionary> {
        self.active
            .as_ref()
            .and_then(|locale| self.catalog.get(locale.as_str()))
    }
}
