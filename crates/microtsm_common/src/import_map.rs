use microtsm_utils::indexmap::FxIndexMap;
use serde::{Deserialize, Serialize};

/// Specifier → URL table the worker resolves bare imports against.
///
/// Keys ending in `/` are prefix entries whose value is a base URL; every other key is an exact
/// entry. Empty keys are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FxIndexMap<String, String>", into = "FxIndexMap<String, String>")]
pub struct ImportMap {
  entries: FxIndexMap<String, String>,
}

/// The `{ "imports": { ... } }` document embedded in the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportMapDocument {
  #[serde(default)]
  pub imports: ImportMap,
}

/// A prefix entry that matched a specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixMatch<'a> {
  /// The matched key, e.g. `pkg/`.
  pub key: &'a str,
  /// The URL the key maps to, e.g. `https://cdn.example/pkg@1.0.0/`.
  pub base: &'a str,
  /// The specifier with `key` stripped, e.g. `button` for `pkg/button`.
  pub rest: &'a str,
}

impl ImportMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parses an import map document. Entries with an empty specifier are dropped.
  pub fn from_json(raw: &str) -> anyhow::Result<Self> {
    let document: ImportMapDocument = serde_json::from_str(raw)?;
    Ok(document.imports)
  }

  pub fn to_json(&self) -> String {
    let document = ImportMapDocument { imports: self.clone() };
    serde_json::to_string(&document).unwrap_or_else(|_| r#"{"imports":{}}"#.to_string())
  }

  /// Returns `false` and stores nothing if `specifier` is empty.
  pub fn insert(&mut self, specifier: impl Into<String>, url: impl Into<String>) -> bool {
    let specifier = specifier.into();
    if specifier.is_empty() {
      return false;
    }
    self.entries.insert(specifier, url.into());
    true
  }

  pub fn get_exact(&self, specifier: &str) -> Option<&str> {
    self.entries.get(specifier).map(String::as_str)
  }

  /// Picks the longest prefix key that `specifier` starts with.
  pub fn longest_prefix_match<'a>(&'a self, specifier: &'a str) -> Option<PrefixMatch<'a>> {
    self
      .prefix_entries()
      .filter(|(key, _)| specifier.starts_with(key))
      .max_by_key(|(key, _)| key.len())
      .map(|(key, base)| PrefixMatch { key, base, rest: &specifier[key.len()..] })
  }

  pub fn prefix_entries(&self) -> impl Iterator<Item = (&str, &str)> {
    self.iter().filter(|(key, _)| Self::is_prefix_key(key))
  }

  pub fn is_prefix_key(key: &str) -> bool {
    key.ends_with('/')
  }

  /// Overlays `other` onto `self`; entries of `other` win.
  pub fn merge(&mut self, other: ImportMap) {
    self.entries.extend(other.entries);
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl From<FxIndexMap<String, String>> for ImportMap {
  fn from(mut entries: FxIndexMap<String, String>) -> Self {
    entries.retain(|specifier, _| !specifier.is_empty());
    Self { entries }
  }
}

impl From<ImportMap> for FxIndexMap<String, String> {
  fn from(value: ImportMap) -> Self {
    value.entries
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ImportMap {
  fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
    let mut map = Self::new();
    for (specifier, url) in iter {
      map.insert(specifier, url);
    }
    map
  }
}
