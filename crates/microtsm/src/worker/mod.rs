mod container;
mod runtime;

use std::sync::Arc;

use microtsm_common::SyncMessage;
use microtsm_resolver::{HttpProber, ImportMapStore, Prober, Resolver};
use tracing::{debug, info};

pub use self::{
  container::{ClientId, RegistrationOptions, ServiceWorkerContainer, WorkerFactory, WorkerType},
  runtime::{WorkerHandle, WorkerRuntime},
};
use crate::{
  interceptor::{FetchInterceptor, FetchOutcome, FetchRequest, Fetcher, HttpFetcher},
  types::SharedOptions,
};

/// Lifecycle of one worker instance, in the order a worker moves through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkerState {
  Parsed,
  Installing,
  Installed,
  Activating,
  Activated,
  Redundant,
}

/// The worker-side state: the import map the page last synced, the resolver with its cache and
/// the interceptor every script request goes through.
#[derive(Debug)]
pub struct ModuleTransformWorker<P: Prober = HttpProber, F: Fetcher = HttpFetcher> {
  store: ImportMapStore,
  resolver: Resolver<P>,
  interceptor: FetchInterceptor<F>,
}

impl ModuleTransformWorker {
  /// A worker probing and fetching over the real network.
  pub fn http(options: SharedOptions) -> anyhow::Result<Self> {
    let prober = HttpProber::new(options.probe_timeout)?;
    Ok(Self::new(options, prober, HttpFetcher::default()))
  }
}

impl<P: Prober, F: Fetcher> ModuleTransformWorker<P, F> {
  pub fn new(options: SharedOptions, prober: P, fetcher: F) -> Self {
    Self {
      store: ImportMapStore::new(),
      resolver: Resolver::new(prober, options.probe_candidates.clone()),
      interceptor: FetchInterceptor::new(fetcher, Arc::clone(&options)),
    }
  }

  pub fn store(&self) -> &ImportMapStore {
    &self.store
  }

  /// A new version never waits for pages controlled by the old one to close.
  pub fn on_install(&self) {
    debug!(generation = self.store.generation(), "installed, skipping waiting");
  }

  /// Every open client is claimed, so pages are intercepted without a reload.
  pub fn on_activate(&self) {
    self.resolver.clear_cache();
    debug!("activated, claiming clients");
  }

  /// Applies a page message. Returns the new map generation if the store changed.
  pub fn on_message(&self, message: SyncMessage) -> Option<u64> {
    match message {
      SyncMessage::SetImportMap { import_map } => {
        let entries = import_map.len();
        let generation = self.store.replace(import_map);
        info!(generation, entries, "import map replaced");
        Some(generation)
      }
      SyncMessage::Unknown => {
        debug!("ignoring unknown message");
        None
      }
    }
  }

  /// Handles one fetch against the map current at the time the request arrives.
  pub async fn on_fetch(&self, request: &FetchRequest) -> anyhow::Result<FetchOutcome> {
    let snapshot = self.store.snapshot();
    self.interceptor.intercept(request, &snapshot, &self.resolver).await
  }
}
