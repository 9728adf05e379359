use tracing::{debug, warn};

use crate::context::Context;
use crate::error::VavilonError;
use crate::host::Page;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceReport {
    pub replaced: usize,
    /// Keys absent from the active dictionary, once per element.
    pub missing: Vec<String>,
}

/// Rewrites every registered element with the active dictionary's text.
///
/// Before an element is first overwritten its current text is captured into
/// the page-native dictionary, so switching back to the page locale needs no
/// fetch. Captured values are never replaced. Does nothing until elements
/// have been discovered and an active locale is set.
pub fn apply<P: Page + ?Sized>(ctx: &mut Context, page: &mut P) -> ReplaceReport {
    let mut report = ReplaceReport::default();
    let Some(active) = ctx.active().cloned() else {
        return report;
    };
    if !ctx.registry.is_discovered() {
        return report;
    }

    for element in ctx.registry.elements() {
        let Some(text) = ctx
            .catalog
            .get(active.as_str())
            .and_then(|dict| dict.get(&element.key))
            .map(str::to_string)
        else {
            warn!(locale = %active, "{}", VavilonError::MissingTranslation(element.key.clone()));
            report.missing.push(element.key.clone());
            continue;
        };

        let native = ctx.catalog.native_mut(&ctx.page_locale);
        if native.get(&element.key).is_none() {
            if let Some(original) = page.text(element.id) {
                native.capture(&element.key, original);
            }
        }

        page.set_text(element.id, &text);
        report.replaced += 1;
    }

    debug!(locale = %active, replaced = report.replaced, missing = report.missing.len(), "Replaced page text");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::dictionary::{DictionaryLoadResult, Strings};
    use crate::host::{DeclaredSource, ElementId, StaticPage};
    use crate::locale::LocaleTag;
    use crate::registry::Marker;

    fn setup(page: &StaticPage) -> Context {
        let catalog = Catalog::discover([DeclaredSource {
            locale: "fr".to_string(),
            origin: "dicts/fr.json".to_string(),
        }]);
        let mut ctx = Context::new(catalog, LocaleTag::new("fr"), LocaleTag::new("en"));
        ctx.catalog
            .record(DictionaryLoadResult {
                locale: LocaleTag::new("fr"),
                outcome: Ok(Strings::from([
                    ("greeting".to_string(), "Bonjour".to_string()),
                    ("farewell".to_string(), "Au revoir".to_string()),
                ])),
            })
            .unwrap();
        ctx.registry.discover(page, &Marker::default());
        ctx
    }

    #[test]
    fn test_noop_without_active_or_elements() {
        let mut page = StaticPage::new("en").with_element("greeting", "Hello");
        let mut ctx = setup(&page);
        assert_eq!(apply(&mut ctx, &mut page), ReplaceReport::default());
        assert_eq!(page.texts(), ["Hello"]);

        let mut ctx = Context::new(Catalog::default(), LocaleTag::new("fr"), LocaleTag::new("en"));
        ctx.catalog = setup(&page).catalog;
        assert!(ctx.set_active(LocaleTag::new("fr")));
        assert_eq!(apply(&mut ctx, &mut page), ReplaceReport::default());
        assert_eq!(page.texts(), ["Hello"]);
    }

    #[test]
    fn test_replaces_and_captures_original() {
        let mut page = StaticPage::new("en")
            .with_element("greeting", "Hello")
            .with_element("farewell", "Goodbye");
        let mut ctx = setup(&page);
        ctx.set_active(LocaleTag::new("fr"));

        let report = apply(&mut ctx, &mut page);
        assert_eq!(report.replaced, 2);
        assert_eq!(page.texts(), ["Bonjour", "Au revoir"]);

        let native = ctx.catalog.get("en").unwrap();
        assert!(native.is_synthetic());
        assert_eq!(native.get("greeting"), Some("Hello"));
        assert_eq!(native.get("farewell"), Some("Goodbye"));
    }

    #[test]
    fn test_idempotent() {
        let mut page = StaticPage::new("en").with_element("greeting", "Hello");
        let mut ctx = setup(&page);
        ctx.set_active(LocaleTag::new("fr"));

        let first = apply(&mut ctx, &mut page);
        let after_first = page.clone();
        let second = apply(&mut ctx, &mut page);
        assert_eq!(first, second);
        assert_eq!(page, after_first);
        assert_eq!(ctx.catalog.get("en").unwrap().get("greeting"), Some("Hello"));
    }

    #[test]
    fn test_snapshot_never_overwritten() {
        let mut page = StaticPage::new("en").with_element("greeting", "Hello");
        let mut ctx = setup(&page);
        ctx.set_active(LocaleTag::new("fr"));
        apply(&mut ctx, &mut page);

        page.set_text(ElementId(0), "Edited by someone else");
        apply(&mut ctx, &mut page);

        assert_eq!(ctx.catalog.get("en").unwrap().get("greeting"), Some("Hello"));
        assert_eq!(page.texts(), ["Bonjour"]);
    }

    #[test]
    fn test_missing_key_leaves_text_and_reports_each_occurrence() {
        let mut page = StaticPage::new("en")
            .with_element("subtitle", "Sub")
            .with_element("greeting", "Hello")
            .with_element("subtitle", "Sub again");
        let mut ctx = setup(&page);
        ctx.set_active(LocaleTag::new("fr"));

        let report = apply(&mut ctx, &mut page);
        assert_eq!(report.replaced, 1);
        assert_eq!(report.missing, ["subtitle", "subtitle"]);
        assert_eq!(page.texts(), ["Sub", "Bonjour", "Sub again"]);
        assert_eq!(ctx.catalog.get("en").unwrap().get("subtitle"), None);
    }

    #[test]
    fn test_revert_to_page_locale_uses_captured_text() {
        let mut page = StaticPage::new("en").with_element("greeting", "Hello");
        let mut ctx = setup(&page);
        ctx.set_active(LocaleTag::new("fr"));
        apply(&mut ctx, &mut page);

        assert!(ctx.set_active(LocaleTag::new("EN")));
        let report = apply(&mut ctx, &mut page);
        assert_eq!(report.replaced, 1);
        assert_eq!(page.texts(), ["Hello"]);
    }
}
