use arcstr::ArcStr;
use microtsm_common::{ImportMap, PrefixMatch};
use microtsm_utils::concat_string;
use tracing::{debug, trace};

use crate::{HttpProber, ImportMapSnapshot, Prober, ResolutionCache};

/// Resolves bare specifiers to absolute URLs.
///
/// Lookup order is exact entry, then the longest matching prefix entry. A prefix match does not
/// say which file lives behind the base URL, so candidate suffixes are probed in order and the
/// first one that exists wins. Relative specifiers must be filtered out by the caller.
#[derive(Debug)]
pub struct Resolver<P: Prober = HttpProber> {
  prober: P,
  probe_candidates: Vec<String>,
  cache: ResolutionCache,
}

impl<P: Prober> Resolver<P> {
  pub fn new(prober: P, probe_candidates: Vec<String>) -> Self {
    Self { prober, probe_candidates, cache: ResolutionCache::default() }
  }

  pub fn prober(&self) -> &P {
    &self.prober
  }

  pub fn cache(&self) -> &ResolutionCache {
    &self.cache
  }

  pub fn clear_cache(&self) {
    self.cache.clear();
  }

  /// `None` means the specifier is unresolvable under this snapshot.
  pub async fn resolve(&self, snapshot: &ImportMapSnapshot, specifier: &str) -> Option<ArcStr> {
    let generation = snapshot.generation();
    if let Some(cached) = self.cache.get(specifier, generation) {
      trace!(specifier, generation, "resolution cache hit");
      return cached;
    }

    let resolution = self.resolve_uncached(snapshot.import_map(), specifier).await;
    self.cache.insert(specifier, generation, resolution.clone());
    resolution
  }

  async fn resolve_uncached(&self, import_map: &ImportMap, specifier: &str) -> Option<ArcStr> {
    // An exact entry names a file, never a package directory, so it is not probed.
    if let Some(url) = import_map.get_exact(specifier) {
      return Some(url.into());
    }

    let PrefixMatch { key, base, rest } = import_map.longest_prefix_match(specifier)?;
    for candidate in &self.probe_candidates {
      let url = concat_string!(base, rest, candidate);
      if self.prober.probe(&url).await {
        debug!(specifier, prefix = key, %url, "resolved through prefix entry");
        return Some(url.into());
      }
    }

    debug!(specifier, prefix = key, "no probe candidate exists");
    None
  }
}
