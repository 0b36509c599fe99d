use core::fmt;

use super::{Keys, RankTreeMap, Values};
use crate::compare::{Comparator, NaturalOrder};

/// A read-only, ordered-set-shaped view of a map's keys.
///
/// The view borrows the map, so it is read-only by construction; there are
/// no mutators to forbid.
///
/// # Examples
///
/// ```
/// use rank_tree::RankTreeMap;
///
/// let map = RankTreeMap::from([(2, "b"), (1, "a"), (3, "c")]);
/// let keys = map.keys_view();
/// assert_eq!(keys.len(), 3);
/// assert!(keys.contains(&2));
/// assert_eq!(keys.get_at(0), Some(&1));
/// assert_eq!(keys.index_of(&3), Some(2));
/// ```
pub struct KeysView<'a, K, V, C = NaturalOrder> {
    map: &'a RankTreeMap<K, V, C>,
}

/// A read-only collection view of a map's values.
///
/// Values are unordered as a collection; iteration follows key order.
/// Membership testing has no index to lean on and is a linear scan.
pub struct ValuesView<'a, K, V, C = NaturalOrder> {
    map: &'a RankTreeMap<K, V, C>,
}

impl<'a, K, V, C> KeysView<'a, K, V, C> {
    pub(super) fn new(map: &'a RankTreeMap<K, V, C>) -> Self {
        Self { map }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The key with rank `index`.
    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<&'a K> {
        self.map.get_at(index).map(|(key, _)| key)
    }

    pub fn iter(&self) -> Keys<'a, K, V> {
        self.map.keys()
    }

    #[must_use]
    pub fn first(&self) -> Option<&'a K> {
        self.get_at(0)
    }

    #[must_use]
    pub fn last(&self) -> Option<&'a K> {
        self.map.last_key_value().map(|(key, _)| key)
    }
}

impl<K, V, C: Comparator<K>> KeysView<'_, K, V, C> {
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// The rank of `key`, or `None` if absent.
    #[must_use]
    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.map.index_of(key)
    }
}

impl<K, V, C> Clone for KeysView<'_, K, V, C> {
    fn clone(&self) -> Self {
        Self { map: self.map }
    }
}

impl<K, V, C> Copy for KeysView<'_, K, V, C> {}

impl<'a, K, V, C> IntoIterator for KeysView<'a, K, V, C> {
    type Item = &'a K;
    type IntoIter = Keys<'a, K, V>;

    fn into_iter(self) -> Keys<'a, K, V> {
        self.map.keys()
    }
}

impl<K: fmt::Debug, V, C> fmt::Debug for KeysView<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C> ValuesView<'a, K, V, C> {
    pub(super) fn new(map: &'a RankTreeMap<K, V, C>) -> Self {
        Self { map }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The value of the entry with rank `index`.
    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<&'a V> {
        self.map.get_at(index).map(|(_, value)| value)
    }

    pub fn iter(&self) -> Values<'a, K, V> {
        self.map.values()
    }
}

impl<K, V: PartialEq, C> ValuesView<'_, K, V, C> {
    /// Linear scan; values carry no index.
    #[must_use]
    pub fn contains(&self, value: &V) -> bool {
        self.iter().any(|candidate| candidate == value)
    }
}

impl<K, V, C> Clone for ValuesView<'_, K, V, C> {
    fn clone(&self) -> Self {
        Self { map: self.map }
    }
}

impl<K, V, C> Copy for ValuesView<'_, K, V, C> {}

impl<'a, K, V, C> IntoIterator for ValuesView<'a, K, V, C> {
    type Item = &'a V;
    type IntoIter = Values<'a, K, V>;

    fn into_iter(self) -> Values<'a, K, V> {
        self.map.values()
    }
}

impl<K, V: fmt::Debug, C> fmt::Debug for ValuesView<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
