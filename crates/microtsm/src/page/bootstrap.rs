use std::sync::Arc;

use anyhow::Context;
use microtsm_common::NormalizedWorkerOptions;
use tracing::info;

use super::{
  compat::{CompatibilityGate, GateDecision, Navigator},
  data_island::read_import_map_data_island,
  sync::{ImportMapSync, PageEvent},
  LocalStorage,
};
use crate::{
  interceptor::{FetchOutcome, FetchRequest},
  worker::{ClientId, RegistrationOptions},
};

/// A freshly loaded page of the host application.
#[derive(Clone)]
pub struct Page {
  /// Document markup, including the import map data island.
  pub html: String,
  pub navigator: Navigator,
  pub local_storage: LocalStorage,
  /// The application entry module loaded once the page is controlled.
  pub entry_url: String,
}

pub enum BootstrapOutcome {
  /// The document was replaced; nothing else ran.
  Unsupported { document: String },
  Started(StartedPage),
}

pub struct StartedPage {
  pub client: ClientId,
  pub sync: ImportMapSync,
  pub entry: FetchOutcome,
}

/// Brings a page under worker control and loads the entry module through it.
///
/// The page waits for its client to be claimed instead of reloading. The first sync is
/// posted before the entry is requested, so the entry is rewritten against the page's map.
pub async fn bootstrap(
  page: &Page,
  options: &NormalizedWorkerOptions,
) -> anyhow::Result<BootstrapOutcome> {
  let container = match CompatibilityGate::check(&page.navigator) {
    GateDecision::Unsupported { document } => {
      return Ok(BootstrapOutcome::Unsupported { document });
    }
    GateDecision::Proceed => {
      page.navigator.service_worker.as_ref().context("no worker container to register with")?
    }
  };

  let client = container.open_client();
  container
    .register(&options.script_url, RegistrationOptions::module())
    .await
    .context("module transform worker registration failed")?;
  let controller = container
    .controller(client)
    .context("module transform worker did not claim the page")?;
  controller.activated().await?;

  let import_map = read_import_map_data_island(&page.html);
  let mut sync =
    ImportMapSync::new(import_map, page.local_storage.clone(), Arc::clone(container), client);
  sync.handle(PageEvent::ControllerActivated)?;

  let entry = controller.fetch(FetchRequest::script(page.entry_url.as_str())).await?;
  info!(entry = %page.entry_url, "entry module loaded");
  Ok(BootstrapOutcome::Started(StartedPage { client, sync, entry }))
}
