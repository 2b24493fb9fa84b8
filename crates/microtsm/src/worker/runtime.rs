use std::sync::Arc;

use anyhow::anyhow;
use microtsm_common::SyncMessage;
use microtsm_resolver::Prober;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, trace};

use super::{ModuleTransformWorker, WorkerState};
use crate::interceptor::{FetchOutcome, FetchRequest, Fetcher};

pub(crate) enum WorkerEvent {
  Install { done: oneshot::Sender<()> },
  Activate { done: oneshot::Sender<()> },
  /// The host restarted an already activated worker; lifecycle handlers do not run again.
  Resume,
  Message(SyncMessage),
  Fetch { request: FetchRequest, respond_to: oneshot::Sender<anyhow::Result<FetchOutcome>> },
  Terminate,
}

/// Drives one worker instance from a single event queue.
///
/// Lifecycle events and messages are handled inline in arrival order, so the last
/// `SET_IMPORT_MAP` posted is the one in effect. Fetch events are spawned and run concurrently;
/// each one sees the map current when its turn in the queue came.
pub struct WorkerRuntime<P: Prober + 'static, F: Fetcher + 'static> {
  worker: Arc<ModuleTransformWorker<P, F>>,
  rx: mpsc::UnboundedReceiver<WorkerEvent>,
  state: watch::Sender<WorkerState>,
}

impl<P: Prober + 'static, F: Fetcher + 'static> WorkerRuntime<P, F> {
  /// Starts the event loop on the current tokio runtime.
  pub fn spawn(worker: ModuleTransformWorker<P, F>) -> WorkerHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let (state, state_rx) = watch::channel(WorkerState::Parsed);
    let runtime = Self { worker: Arc::new(worker), rx, state };
    tokio::spawn(runtime.run());
    WorkerHandle { tx, state: state_rx }
  }

  async fn run(mut self) {
    while let Some(event) = self.rx.recv().await {
      match event {
        WorkerEvent::Install { done } => {
          self.set_state(WorkerState::Installing);
          self.worker.on_install();
          self.set_state(WorkerState::Installed);
          done.send(()).ok();
        }
        WorkerEvent::Activate { done } => {
          self.set_state(WorkerState::Activating);
          self.worker.on_activate();
          self.set_state(WorkerState::Activated);
          done.send(()).ok();
        }
        WorkerEvent::Resume => self.set_state(WorkerState::Activated),
        WorkerEvent::Message(message) => {
          self.worker.on_message(message);
        }
        WorkerEvent::Fetch { request, respond_to } => {
          let worker = Arc::clone(&self.worker);
          tokio::spawn(async move {
            // The requester may have gone away; an abandoned rewrite is simply dropped.
            respond_to.send(worker.on_fetch(&request).await).ok();
          });
        }
        WorkerEvent::Terminate => break,
      }
    }
    // Refuse new events before anyone can observe the redundant state.
    self.rx.close();
    self.set_state(WorkerState::Redundant);
    debug!("worker stopped");
  }

  fn set_state(&self, state: WorkerState) {
    trace!(?state, "worker state");
    self.state.send_replace(state);
  }
}

/// Sending side of a running worker. Cheap to clone.
#[derive(Clone)]
pub struct WorkerHandle {
  tx: mpsc::UnboundedSender<WorkerEvent>,
  state: watch::Receiver<WorkerState>,
}

impl WorkerHandle {
  /// Fire and forget; nothing acknowledges a message.
  pub fn post_message(&self, message: SyncMessage) -> anyhow::Result<()> {
    self.send(WorkerEvent::Message(message))
  }

  pub async fn fetch(&self, request: FetchRequest) -> anyhow::Result<FetchOutcome> {
    let (respond_to, response) = oneshot::channel();
    self.send(WorkerEvent::Fetch { request, respond_to })?;
    response.await.map_err(|_| anyhow!("module transform worker dropped the fetch"))?
  }

  pub async fn install(&self) -> anyhow::Result<()> {
    let (done, installed) = oneshot::channel();
    self.send(WorkerEvent::Install { done })?;
    installed.await.map_err(|_| anyhow!("module transform worker stopped while installing"))
  }

  pub async fn activate(&self) -> anyhow::Result<()> {
    let (done, activated) = oneshot::channel();
    self.send(WorkerEvent::Activate { done })?;
    activated.await.map_err(|_| anyhow!("module transform worker stopped while activating"))
  }

  pub fn resume(&self) -> anyhow::Result<()> {
    self.send(WorkerEvent::Resume)
  }

  pub fn terminate(&self) {
    // Already stopped is fine.
    self.send(WorkerEvent::Terminate).ok();
  }

  pub fn state(&self) -> WorkerState {
    *self.state.borrow()
  }

  /// Waits until the worker is activated. Fails if it becomes redundant first.
  pub async fn activated(&self) -> anyhow::Result<()> {
    let mut state = self.state.clone();
    let reached = *state
      .wait_for(|state| matches!(state, WorkerState::Activated | WorkerState::Redundant))
      .await
      .map_err(|_| anyhow!("module transform worker is gone"))?;
    match reached {
      WorkerState::Activated => Ok(()),
      _ => Err(anyhow!("module transform worker became redundant before activating")),
    }
  }

  fn send(&self, event: WorkerEvent) -> anyhow::Result<()> {
    self.tx.send(event).map_err(|_| anyhow!("module transform worker is no longer running"))
  }
}

#[cfg(test)]
mod tests {
  use microtsm_common::{ImportMap, WorkerOptions};

  use super::*;
  use crate::{interceptor::FetchResponse, utils::normalize_options::normalize_options};

  struct Unreachable;

  impl Prober for Unreachable {
    async fn probe(&self, _url: &str) -> bool {
      false
    }
  }

  impl Fetcher for Unreachable {
    async fn fetch(&self, _request: &FetchRequest) -> anyhow::Result<FetchResponse> {
      anyhow::bail!("unreachable network")
    }
  }

  fn spawn() -> WorkerHandle {
    let options = Arc::new(normalize_options(WorkerOptions::default()));
    WorkerRuntime::spawn(ModuleTransformWorker::new(options, Unreachable, Unreachable))
  }

  #[tokio::test]
  async fn walks_the_lifecycle() {
    let handle = spawn();
    assert_eq!(handle.state(), WorkerState::Parsed);
    handle.install().await.unwrap();
    assert_eq!(handle.state(), WorkerState::Installed);
    handle.activate().await.unwrap();
    handle.activated().await.unwrap();
    assert_eq!(handle.state(), WorkerState::Activated);

    handle.terminate();
    let mut state = handle.state.clone();
    state.wait_for(|state| *state == WorkerState::Redundant).await.unwrap();
    assert!(handle.post_message(SyncMessage::set_import_map(ImportMap::new())).is_err());
  }

  #[tokio::test]
  async fn waiting_for_activation_fails_once_redundant() {
    let handle = spawn();
    handle.terminate();
    assert!(handle.activated().await.is_err());
  }

  #[tokio::test]
  async fn resumed_workers_are_active_without_lifecycle_handlers() {
    let handle = spawn();
    handle.resume().unwrap();
    handle.activated().await.unwrap();
  }
}
