use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Origin-scoped string storage surviving page reloads.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
  items: Arc<RwLock<FxHashMap<String, String>>>,
}

impl LocalStorage {
  pub fn get(&self, key: &str) -> Option<String> {
    self.items.read().get(key).cloned()
  }

  pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
    self.items.write().insert(key.into(), value.into());
  }
}
