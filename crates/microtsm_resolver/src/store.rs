use std::sync::Arc;

use microtsm_common::ImportMap;
use parking_lot::RwLock;

/// The import map currently held by a worker.
///
/// Each [`ImportMapStore::replace`] bumps the generation; generation `0` is the empty map a
/// worker starts with before any page has synced.
#[derive(Debug, Default)]
pub struct ImportMapStore {
  current: RwLock<ImportMapSnapshot>,
}

/// An immutable view of the store at one generation.
#[derive(Debug, Clone, Default)]
pub struct ImportMapSnapshot {
  import_map: Arc<ImportMap>,
  generation: u64,
}

impl ImportMapSnapshot {
  pub fn new(import_map: impl Into<Arc<ImportMap>>, generation: u64) -> Self {
    Self { import_map: import_map.into(), generation }
  }

  pub fn import_map(&self) -> &ImportMap {
    &self.import_map
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }
}

impl ImportMapStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Swaps in `import_map` wholesale and returns the new generation.
  pub fn replace(&self, import_map: ImportMap) -> u64 {
    let mut current = self.current.write();
    let generation = current.generation + 1;
    *current = ImportMapSnapshot::new(import_map, generation);
    generation
  }

  pub fn snapshot(&self) -> ImportMapSnapshot {
    self.current.read().clone()
  }

  pub fn generation(&self) -> u64 {
    self.current.read().generation
  }
}

#[test]
fn replace_is_wholesale_and_bumps_generation() {
  let store = ImportMapStore::new();
  assert_eq!(store.generation(), 0);
  assert!(store.snapshot().import_map().is_empty());

  store.replace(ImportMap::from_iter([
    ("vue", "https://a/vue.js"),
    ("axios", "https://a/axios.js"),
  ]));
  let before = store.snapshot();

  assert_eq!(store.replace(ImportMap::from_iter([("vue", "https://b/vue.js")])), 2);
  let after = store.snapshot();
  assert_eq!(after.import_map().get_exact("vue"), Some("https://b/vue.js"));
  assert_eq!(after.import_map().get_exact("axios"), None);

  // Snapshots taken earlier are unaffected.
  assert_eq!(before.generation(), 1);
  assert_eq!(before.import_map().get_exact("axios"), Some("https://a/axios.js"));
}
