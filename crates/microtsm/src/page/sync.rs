use std::sync::Arc;

use microtsm_common::{ImportMap, SyncMessage, IMPORT_MAP_OVERRIDES_KEY, RELAUNCH_EVENT};
use tracing::{debug, trace};

use super::{data_island::parse_import_map_overrides, LocalStorage};
use crate::worker::{ClientId, ServiceWorkerContainer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
  Visible,
  Hidden,
}

/// Page events the sync listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
  /// The controlling worker became active.
  ControllerActivated,
  Focus,
  VisibilityChange(Visibility),
  /// The host application relaunched.
  Relaunch,
  BeforeUnload,
}

impl PageEvent {
  /// Maps a DOM event name to the event the sync cares about, if any.
  pub fn from_dom_event(name: &str, visibility: Visibility) -> Option<Self> {
    match name {
      "controllerchange" => Some(Self::ControllerActivated),
      "focus" => Some(Self::Focus),
      "visibilitychange" => Some(Self::VisibilityChange(visibility)),
      "beforeunload" => Some(Self::BeforeUnload),
      _ if name == RELAUNCH_EVENT => Some(Self::Relaunch),
      _ => None,
    }
  }
}

/// Keeps the worker's import map in step with the page.
///
/// Workers may be stopped while idle and lose their map, so the map is posted again whenever
/// the page comes back to the foreground or the host relaunches. Posting is fire and forget.
pub struct ImportMapSync {
  import_map: ImportMap,
  storage: LocalStorage,
  container: Arc<ServiceWorkerContainer>,
  client: ClientId,
  attached: bool,
  activated: bool,
}

impl ImportMapSync {
  pub fn new(
    import_map: ImportMap,
    storage: LocalStorage,
    container: Arc<ServiceWorkerContainer>,
    client: ClientId,
  ) -> Self {
    Self { import_map, storage, container, client, attached: true, activated: false }
  }

  /// The embedded map with stored overrides applied on top.
  pub fn effective_import_map(&self) -> ImportMap {
    let mut import_map = self.import_map.clone();
    if let Some(raw) = self.storage.get(IMPORT_MAP_OVERRIDES_KEY) {
      import_map.merge(parse_import_map_overrides(&raw));
    }
    import_map
  }

  /// Returns whether a `SET_IMPORT_MAP` was posted.
  pub fn handle(&mut self, event: PageEvent) -> anyhow::Result<bool> {
    if !self.attached {
      trace!(?event, "sync detached, ignoring");
      return Ok(false);
    }
    match event {
      PageEvent::ControllerActivated => {
        // Only the first activation is synced here; later ones come with focus or relaunch.
        if std::mem::replace(&mut self.activated, true) {
          return Ok(false);
        }
        self.post()
      }
      PageEvent::Focus | PageEvent::VisibilityChange(Visibility::Visible) | PageEvent::Relaunch => {
        self.post()
      }
      PageEvent::VisibilityChange(Visibility::Hidden) => Ok(false),
      PageEvent::BeforeUnload => {
        self.attached = false;
        Ok(false)
      }
    }
  }

  /// Posts the current map to whichever worker controls the page now.
  pub fn post(&self) -> anyhow::Result<bool> {
    let Some(controller) = self.container.controller(self.client) else {
      debug!("page is not controlled yet, nothing to sync");
      return Ok(false);
    };
    let import_map = self.effective_import_map();
    debug!(entries = import_map.len(), "posting import map");
    controller.post_message(SyncMessage::set_import_map(import_map))?;
    Ok(true)
  }

  pub fn is_attached(&self) -> bool {
    self.attached
  }
}

#[test]
fn dom_events() {
  assert_eq!(
    PageEvent::from_dom_event("microtsm:root-app-relaunch", Visibility::Visible),
    Some(PageEvent::Relaunch)
  );
  assert_eq!(
    PageEvent::from_dom_event("visibilitychange", Visibility::Hidden),
    Some(PageEvent::VisibilityChange(Visibility::Hidden))
  );
  assert_eq!(PageEvent::from_dom_event("click", Visibility::Visible), None);
}
