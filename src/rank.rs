/// A zero-based position in the sorted order of a map or set.
///
/// Wrapping the index in a newtype keeps positional indexing distinct from
/// key-based indexing on the map.
///
/// # Examples
///
/// ```
/// use rank_tree::{Rank, RankTreeMap};
///
/// let mut map = RankTreeMap::new();
/// map.insert("a", 10);
/// map.insert("b", 20);
///
/// assert_eq!(map[Rank(0)], 10);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Rank(pub usize);
