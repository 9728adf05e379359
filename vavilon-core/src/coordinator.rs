//! Readiness gate and locale switching.
//!
//! ```text
//! Init ──finish_init──▶ AwaitingReadiness ──(page ready ∧ active loaded)──▶ Applied
//!                                                                   ▲        │
//!                                                                   └────────┘
//!                                                               set_language
//! ```
//!
//! Page-ready and dictionary-loaded may arrive in either order. Both record
//! their fact and then run the same readiness check, so the first replacement
//! happens exactly once, after both have arrived.

use tracing::{debug, error, info, warn};

use crate::catalog::{Catalog, LoadPlan};
use crate::context::Context;
use crate::dictionary::{DictionaryLoadResult, DictionaryState};
use crate::error::{Result, VavilonError};
use crate::host::{Page, PreferenceStore};
use crate::locale::LocaleTag;
use crate::matcher;
use crate::registry::Marker;
use crate::replacer::{self, ReplaceReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    AwaitingReadiness,
    Applied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub phase: Phase,
    pub user_locale: LocaleTag,
    pub active_locale: Option<LocaleTag>,
    pub page_locale: LocaleTag,
    pub page_ready: bool,
    /// Number of replacement passes run so far.
    pub applications: usize,
}

pub struct Coordinator<P> {
    ctx: Context,
    page: P,
    store: Box<dyn PreferenceStore>,
    marker: Marker,
    phase: Phase,
    page_ready: bool,
    applications: usize,
}

impl<P: Page> Coordinator<P> {
    /// Discovers the page's dictionaries and picks the eager one, which
    /// becomes the active locale. Returns the loads the caller must issue.
    pub fn new(
        page: P,
        store: Box<dyn PreferenceStore>,
        user: LocaleTag,
        marker: Marker,
        dictionary_attribute: &str,
    ) -> (Self, LoadPlan) {
        let page_locale = LocaleTag::new(page.lang());
        let catalog = Catalog::discover(page.dictionary_sources(dictionary_attribute));
        let plan = catalog.plan(&user);

        let mut ctx = Context::new(catalog, user, page_locale);
        if let Some(eager) = &plan.eager {
            ctx.set_active(eager.locale.clone());
        }
        info!(
            user = %ctx.user,
            page = %ctx.page_locale,
            active = ?ctx.active().map(LocaleTag::as_str),
            "Engine initialized"
        );

        let coordinator = Self {
            ctx,
            page,
            store,
            marker,
            phase: Phase::Init,
            page_ready: false,
            applications: 0,
        };
        (coordinator, plan)
    }

    pub fn finish_init(&mut self) -> Option<ReplaceReport> {
        if self.phase == Phase::Init {
            self.phase = Phase::AwaitingReadiness;
        }
        self.check_readiness()
    }

    /// Host signal: the page structure is final. Elements are discovered on
    /// the first signal; repeats are ignored.
    pub fn on_page_ready(&mut self) -> Option<ReplaceReport> {
        if self.page_ready {
            debug!("Page-ready already handled");
            return None;
        }
        self.page_ready = true;
        self.ctx.registry.discover(&self.page, &self.marker);
        self.check_readiness()
    }

    /// A dictionary fetch resolved. A failure is recorded on the dictionary
    /// and returned; if it was the active locale's dictionary, the engine
    /// continues without an active locale.
    pub fn on_dictionary_loaded(&mut self, result: DictionaryLoadResult) -> Result<Option<ReplaceReport>> {
        let locale = result.locale.clone();
        if let Err(err) = self.ctx.catalog.record(result) {
            if self.ctx.active() == Some(&locale) {
                warn!(%locale, "Active dictionary unavailable; page text stays as authored");
                self.ctx.clear_active();
            }
            return Err(err);
        }
        Ok(self.check_readiness())
    }

    /// Explicit locale change. The dictionary must be loaded, except for the
    /// page locale once original text has been captured. On failure nothing
    /// changes.
    pub fn set_language(&mut self, requested: &str) -> Result<LocaleTag> {
        let locale = matcher::resolve(&self.ctx.catalog, requested)
            .inspect_err(|e| error!(requested, "{}", e))?;

        let dictionary = self.ctx.catalog.get(locale.as_str());
        let captured =
            locale == self.ctx.page_locale && dictionary.is_some_and(|d| !d.strings().is_empty());
        match dictionary.map(|d| d.state().clone()) {
            Some(DictionaryState::Loaded) => {}
            Some(state) if captured => {
                debug!(%locale, ?state, "Using captured page text for the page locale");
            }
            Some(DictionaryState::Pending) => {
                warn!(%locale, "Dictionary still loading; request ignored");
                return Err(VavilonError::DictionaryPending(locale.to_string()));
            }
            Some(DictionaryState::Failed(reason)) => {
                error!(%locale, %reason, "Requested dictionary failed to load");
                return Err(VavilonError::DictionaryLoadFailed {
                    locale: locale.to_string(),
                    reason,
                });
            }
            None => return Err(VavilonError::NoDictionaryFor(locale.to_string())),
        }

        self.ctx.set_active(locale.clone());
        self.store.save(&locale);
        info!(%locale, "Locale changed");

        match self.phase {
            Phase::Applied => {
                self.replace();
            }
            _ => {
                self.check_readiness();
            }
        }
        Ok(locale)
    }

    pub fn status(&self) -> Status {
        Status {
            phase: self.phase,
            user_locale: self.ctx.user.clone(),
            active_locale: self.ctx.active().cloned(),
            page_locale: self.ctx.page_locale.clone(),
            page_ready: self.page_ready,
            applications: self.applications,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn into_page(self) -> P {
        self.page
    }

    fn check_readiness(&mut self) -> Option<ReplaceReport> {
        if self.phase != Phase::AwaitingReadiness || !self.page_ready {
            return None;
        }
        let on_page_locale = self.ctx.active() == Some(&self.ctx.page_locale);
        let usable = self
            .ctx
            .active_dictionary()
            .is_some_and(|d| d.is_loaded() || (on_page_locale && !d.strings().is_empty()));
        if !usable {
            return None;
        }
        let report = self.replace();
        self.phase = Phase::Applied;
        Some(report)
    }

    fn replace(&mut self) -> ReplaceReport {
        self.applications += 1;
        replacer::apply(&mut self.ctx, &mut self.page)
    }
}
