use std::sync::Arc;

use anyhow::{anyhow, bail};
use microtsm_resolver::Prober;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use super::{ModuleTransformWorker, WorkerHandle, WorkerRuntime};
use crate::interceptor::Fetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkerType {
  #[default]
  Classic,
  Module,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationOptions {
  pub worker_type: WorkerType,
}

impl RegistrationOptions {
  pub fn module() -> Self {
    Self { worker_type: WorkerType::Module }
  }
}

/// Starts a fresh, not yet installed, worker instance.
pub type WorkerFactory = Arc<dyn Fn() -> anyhow::Result<WorkerHandle> + Send + Sync>;

struct HostedScript {
  worker_type: WorkerType,
  factory: WorkerFactory,
}

struct Registration {
  script_url: String,
  factory: WorkerFactory,
  active: Option<WorkerHandle>,
  controlled: FxHashSet<ClientId>,
}

#[derive(Default)]
struct ContainerState {
  next_client: u64,
  clients: FxHashSet<ClientId>,
  registration: Option<Registration>,
}

/// The origin-wide worker registry a page talks to.
///
/// Worker scripts have to be hosted before they can be registered. One registration covers the
/// whole origin.
#[derive(Default)]
pub struct ServiceWorkerContainer {
  scripts: FxHashMap<String, HostedScript>,
  state: Mutex<ContainerState>,
}

impl ServiceWorkerContainer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Makes `factory` available at `script_url`.
  #[must_use]
  pub fn host(
    mut self,
    script_url: impl Into<String>,
    worker_type: WorkerType,
    factory: WorkerFactory,
  ) -> Self {
    self.scripts.insert(script_url.into(), HostedScript { worker_type, factory });
    self
  }

  /// Hosts a module transform worker built by `make` at `script_url`.
  #[must_use]
  pub fn host_module_transform_worker<P, F, M>(self, script_url: impl Into<String>, make: M) -> Self
  where
    P: Prober + 'static,
    F: Fetcher + 'static,
    M: Fn() -> anyhow::Result<ModuleTransformWorker<P, F>> + Send + Sync + 'static,
  {
    let factory: WorkerFactory = Arc::new(move || make().map(WorkerRuntime::spawn));
    self.host(script_url, WorkerType::Module, factory)
  }

  pub fn open_client(&self) -> ClientId {
    let mut state = self.state.lock();
    let client = ClientId(state.next_client);
    state.next_client += 1;
    state.clients.insert(client);
    // Pages opened under an active registration are controlled from the start.
    if let Some(registration) = state.registration.as_mut().filter(|r| r.active.is_some()) {
      registration.controlled.insert(client);
    }
    client
  }

  pub fn close_client(&self, client: ClientId) {
    let mut state = self.state.lock();
    state.clients.remove(&client);
    if let Some(registration) = state.registration.as_mut() {
      registration.controlled.remove(&client);
    }
  }

  /// Installs and activates the worker hosted at `script_url`.
  ///
  /// Registering the script that is already active is a no-op. Otherwise the new worker takes
  /// over right away, replacing any active one, and claims every open client.
  pub async fn register(
    &self,
    script_url: &str,
    options: RegistrationOptions,
  ) -> anyhow::Result<()> {
    let hosted = self
      .scripts
      .get(script_url)
      .ok_or_else(|| anyhow!("failed to register a worker: no script at {script_url}"))?;
    if hosted.worker_type != options.worker_type {
      bail!(
        "failed to register a worker: {script_url} cannot run as a {:?} worker",
        options.worker_type
      );
    }
    if self.active_for(script_url).is_some() {
      debug!(script_url, "already registered");
      return Ok(());
    }

    let worker = (hosted.factory)()?;
    worker.install().await?;
    worker.activate().await?;

    let mut state = self.state.lock();
    let clients = state.clients.clone();
    let registration = state.registration.get_or_insert_with(|| Registration {
      script_url: script_url.to_string(),
      factory: Arc::clone(&hosted.factory),
      active: None,
      controlled: FxHashSet::default(),
    });
    registration.script_url = script_url.to_string();
    registration.factory = Arc::clone(&hosted.factory);
    if let Some(previous) = registration.active.replace(worker) {
      previous.terminate();
    }
    registration.controlled.extend(clients);
    info!(script_url, controlled = registration.controlled.len(), "worker activated");
    Ok(())
  }

  /// The worker currently intercepting requests of `client`.
  pub fn controller(&self, client: ClientId) -> Option<WorkerHandle> {
    let state = self.state.lock();
    let registration = state.registration.as_ref()?;
    if registration.controlled.contains(&client) {
      registration.active.clone()
    } else {
      None
    }
  }

  /// Stops the active worker the way a browser reclaims an idle one, and starts a replacement
  /// with empty state. The replacement keeps controlling the same clients.
  pub fn terminate(&self) -> anyhow::Result<()> {
    let mut state = self.state.lock();
    let Some(registration) = state.registration.as_mut() else {
      return Ok(());
    };
    let Some(previous) = registration.active.take() else {
      return Ok(());
    };
    previous.terminate();
    let replacement = (registration.factory)()?;
    replacement.resume()?;
    registration.active = Some(replacement);
    info!(script_url = %registration.script_url, "worker restarted with empty state");
    Ok(())
  }

  fn active_for(&self, script_url: &str) -> Option<WorkerHandle> {
    let state = self.state.lock();
    state
      .registration
      .as_ref()
      .filter(|registration| registration.script_url == script_url)
      .and_then(|registration| registration.active.clone())
  }
}
