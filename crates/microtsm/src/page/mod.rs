mod bootstrap;
mod compat;
mod data_island;
mod local_storage;
mod sync;

pub use self::{
  bootstrap::{bootstrap, BootstrapOutcome, Page, StartedPage},
  compat::{detect_browser, Browser, BrowserVersion, CompatibilityGate, GateDecision, Navigator},
  data_island::{parse_import_map_overrides, read_import_map_data_island},
  local_storage::LocalStorage,
  sync::{ImportMapSync, PageEvent, Visibility},
};
