use std::borrow::Cow;

use arcstr::ArcStr;
use futures::future::join_all;
use microtsm_common::{ImportRecord, NormalizedWorkerOptions};
use microtsm_ecmascript::{render_rewrites, EcmaCompiler};
use microtsm_resolver::{ImportMapSnapshot, Prober, Resolver};
use microtsm_utils::indexmap::FxIndexSet;
use rustc_hash::FxHashMap;
use tracing::warn;

/// Rewrites the imports of one module source against `snapshot`.
///
/// Every distinct bare specifier of a static import or re-export is resolved concurrently before
/// the single rendering pass. Dynamic imports are routed through the configured loader whatever
/// their argument.
pub async fn transform_imports<'s, P: Prober>(
  source: &'s str,
  snapshot: &ImportMapSnapshot,
  resolver: &Resolver<P>,
  options: &NormalizedWorkerOptions,
) -> Cow<'s, str> {
  let scan = match EcmaCompiler::scan_imports(source) {
    Ok(scan) => scan,
    Err(errors) => {
      warn!(errors = %errors, "module source could not be parsed, leaving it untouched");
      return Cow::Borrowed(source);
    }
  };

  let specifiers = scan
    .records
    .iter()
    .filter(|record| record.kind.is_static())
    .filter_map(ImportRecord::bare_specifier)
    .collect::<FxIndexSet<&ArcStr>>();

  let mut lookups = Vec::with_capacity(specifiers.len());
  for specifier in specifiers {
    lookups.push(async move {
      resolver.resolve(snapshot, specifier).await.map(|url| (specifier.as_str(), url))
    });
  }
  let resolutions =
    join_all(lookups).await.into_iter().flatten().collect::<FxHashMap<&str, ArcStr>>();

  render_rewrites(source, &scan, &options.loader, |specifier| {
    resolutions.get(specifier).map(ToString::to_string)
  })
}
