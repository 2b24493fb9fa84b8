use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxBuildHasher;

/// Insertion-ordered set, so work derived from it follows source order.
pub type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;
/// Insertion-ordered map, so serialized tables keep the order they were written in.
pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

#[test]
fn keeps_insertion_order() {
  let set = ["vue", "axios", "vue", "@scope/pkg"].into_iter().collect::<FxIndexSet<_>>();
  assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["vue", "axios", "@scope/pkg"]);
}
