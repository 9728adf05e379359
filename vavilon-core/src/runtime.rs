//! Drives a [`Coordinator`] from tokio.
//!
//! One task owns the coordinator and is the only place engine state changes.
//! Deferred dictionary fetches run as their own tasks and report back over
//! the same channel the host uses for page-ready and locale changes.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use crate::config::VavilonConfig;
use crate::coordinator::{Coordinator, Status};
use crate::dictionary::{self, DictionaryLoadResult};
use crate::error::{Result, VavilonError};
use crate::host::{DictionaryFetcher, LanguageSettings, MemoryStore, Page, PreferenceStore, SystemLanguages};
use crate::locale::LocaleTag;
use crate::resolver;

#[derive(Debug)]
pub enum Signal {
    PageReady,
    DictionaryLoaded(DictionaryLoadResult),
    SetLanguage {
        requested: String,
        reply: oneshot::Sender<Result<LocaleTag>>,
    },
    Status(oneshot::Sender<Status>),
}

/// Host-side entry points. Cheap to clone; the engine stops once every handle
/// is dropped and no fetch is outstanding.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Signal>,
}

impl EngineHandle {
    pub fn page_ready(&self) -> Result<()> {
        self.tx
            .send(Signal::PageReady)
            .map_err(|_| VavilonError::EngineStopped)
    }

    /// Switches the page to `requested`. Fails without touching the page if
    /// no dictionary matches or the matching one is not loaded yet.
    pub async fn set_language(&self, requested: impl Into<String>) -> Result<LocaleTag> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Signal::SetLanguage {
                requested: requested.into(),
                reply,
            })
            .map_err(|_| VavilonError::EngineStopped)?;
        rx.await.map_err(|_| VavilonError::EngineStopped)?
    }

    pub async fn status(&self) -> Result<Status> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Signal::Status(reply))
            .map_err(|_| VavilonError::EngineStopped)?;
        rx.await.map_err(|_| VavilonError::EngineStopped)
    }
}

pub struct Engine<P> {
    config: VavilonConfig,
    page: P,
    store: Box<dyn PreferenceStore>,
    languages: Box<dyn LanguageSettings>,
    fetcher: Arc<dyn DictionaryFetcher>,
    tx: mpsc::UnboundedSender<Signal>,
    rx: mpsc::UnboundedReceiver<Signal>,
}

pub struct EngineBuilder<P> {
    config: VavilonConfig,
    page: P,
    store: Box<dyn PreferenceStore>,
    languages: Box<dyn LanguageSettings>,
    fetcher: Arc<dyn DictionaryFetcher>,
}

impl<P: Page> EngineBuilder<P> {
    pub fn config(mut self, config: VavilonConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: impl PreferenceStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn languages(mut self, languages: impl LanguageSettings + 'static) -> Self {
        self.languages = Box::new(languages);
        self
    }

    pub fn build(self) -> (Engine<P>, EngineHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = EngineHandle { tx: tx.clone() };
        let engine = Engine {
            config: self.config,
            page: self.page,
            store: self.store,
            languages: self.languages,
            fetcher: self.fetcher,
            tx,
            rx,
        };
        (engine, handle)
    }
}

impl<P: Page> Engine<P> {
    pub fn builder(page: P, fetcher: impl DictionaryFetcher + 'static) -> EngineBuilder<P> {
        EngineBuilder {
            config: VavilonConfig::default(),
            page,
            store: Box::new(MemoryStore::default()),
            languages: Box::new(SystemLanguages),
            fetcher: Arc::new(fetcher),
        }
    }

    /// Resolves the user locale, builds the catalog (awaiting the eager
    /// dictionary), then serves signals until every sender is gone. Returns
    /// the final coordinator.
    pub async fn run(self) -> Result<Coordinator<P>> {
        let Engine {
            config,
            page,
            store,
            languages,
            fetcher,
            tx,
            mut rx,
        } = self;

        let user = resolver::resolve_or_default(
            store.as_ref(),
            languages.as_ref(),
            config.default_locale.as_ref(),
        )
        .inspect_err(|e| error!("{}", e))?;
        drop(languages);

        let (mut coordinator, plan) = Coordinator::new(
            page,
            store,
            user.tag,
            config.marker(),
            &config.dictionary_attribute,
        );

        for request in plan.deferred {
            let tx = tx.clone();
            let load = dictionary::load_deferred(Arc::clone(&fetcher), request);
            tokio::spawn(async move {
                let _ = tx.send(Signal::DictionaryLoaded(load.await));
            });
        }
        drop(tx);

        if let Some(request) = plan.eager {
            let result = dictionary::load_blocking(fetcher.as_ref(), &request).await;
            if let Err(e) = coordinator.on_dictionary_loaded(result) {
                error!("Eager dictionary unavailable, continuing without an active locale: {}", e);
            }
        }
        coordinator.finish_init();

        while let Some(signal) = rx.recv().await {
            dispatch(&mut coordinator, signal);
        }

        info!("Engine stopped");
        Ok(coordinator)
    }
}

fn dispatch<P: Page>(coordinator: &mut Coordinator<P>, signal: Signal) {
    match signal {
        Signal::PageReady => {
            coordinator.on_page_ready();
        }
        Signal::DictionaryLoaded(result) => {
            if let Err(e) = coordinator.on_dictionary_loaded(result) {
                warn!("Deferred dictionary unavailable: {}", e);
            }
        }
        Signal::SetLanguage { requested, reply } => {
            let _ = reply.send(coordinator.set_language(&requested));
        }
        Signal::Status(reply) => {
            let _ = reply.send(coordinator.status());
        }
    }
}
