mod import_map;
mod sync_message;
mod types;
mod worker_options;

pub use crate::{
  import_map::{ImportMap, ImportMapDocument, PrefixMatch},
  sync_message::SyncMessage,
  types::{
    import_kind::ImportKind, import_record::ImportRecord, specifier_kind::SpecifierKind,
  },
  worker_options::{
    normalized_worker_options::NormalizedWorkerOptions, WorkerOptions, DEFAULT_EXCLUDED_URL_PARTS,
    DEFAULT_LOADER, DEFAULT_PROBE_CANDIDATES, DEFAULT_PROBE_TIMEOUT_MS, IMPORT_MAP_OVERRIDES_KEY,
    IMPORT_MAP_SCRIPT_TYPE, RELAUNCH_EVENT, WORKER_SCRIPT_URL,
  },
};
