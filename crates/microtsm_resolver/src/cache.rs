use arcstr::ArcStr;
use dashmap::{mapref::entry::Entry, DashMap};

/// Memoized resolution outcomes keyed by raw specifier.
///
/// Every entry remembers the import map generation it was computed under and only answers
/// lookups for that same generation, so replacing the import map invalidates it implicitly.
/// Negative outcomes are cached too.
#[derive(Debug, Default)]
pub struct ResolutionCache {
  entries: DashMap<ArcStr, CachedResolution>,
}

#[derive(Debug, Clone)]
struct CachedResolution {
  generation: u64,
  url: Option<ArcStr>,
}

impl ResolutionCache {
  /// `None` on a miss, `Some(None)` for a cached "unresolved".
  pub fn get(&self, specifier: &str, generation: u64) -> Option<Option<ArcStr>> {
    self
      .entries
      .get(specifier)
      .filter(|entry| entry.generation == generation)
      .map(|entry| entry.url.clone())
  }

  /// An entry is never replaced by one computed under an older generation.
  pub fn insert(&self, specifier: &str, generation: u64, url: Option<ArcStr>) {
    let resolution = CachedResolution { generation, url };
    match self.entries.entry(specifier.into()) {
      Entry::Occupied(mut occupied) => {
        if occupied.get().generation <= generation {
          occupied.insert(resolution);
        }
      }
      Entry::Vacant(vacant) => {
        vacant.insert(resolution);
      }
    }
  }

  pub fn clear(&self) {
    self.entries.clear();
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[test]
fn hits_only_for_the_same_generation() {
  let cache = ResolutionCache::default();
  cache.insert("vue", 1, Some("https://a/vue.js".into()));
  cache.insert("left-pad", 1, None);

  assert_eq!(cache.get("vue", 1), Some(Some("https://a/vue.js".into())));
  assert_eq!(cache.get("left-pad", 1), Some(None));
  assert_eq!(cache.get("vue", 2), None);
  assert_eq!(cache.get("axios", 1), None);
}

#[test]
fn older_generations_never_clobber_newer_ones() {
  let cache = ResolutionCache::default();
  cache.insert("vue", 2, Some("https://b/vue.js".into()));
  cache.insert("vue", 1, Some("https://a/vue.js".into()));
  assert_eq!(cache.get("vue", 2), Some(Some("https://b/vue.js".into())));

  cache.insert("vue", 3, None);
  assert_eq!(cache.get("vue", 3), Some(None));

  cache.clear();
  assert!(cache.is_empty());
}
