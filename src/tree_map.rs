//! An ordered, positionally indexable map with optional duplicate keys.

use core::fmt;
use core::iter::{FusedIterator, Rev};
use core::ops::Index;

use crate::bias::Bias;
use crate::compare::{Comparator, NaturalOrder};
use crate::error::{Result, TreeError};
use crate::rank::Rank;
use crate::raw::{DEFAULT_ORDER, MIN_ORDER, NodeId, RawRankTree};

mod views;

pub use views::{KeysView, ValuesView};

/// An ordered map over a B+-tree with subtree-count augmentation.
///
/// Beyond the usual sorted-map operations, every entry is addressable by its
/// zero-based rank in O(log n) ([`get_at`], [`remove_at`], [`index_of`],
/// indexing by [`Rank`]), and the ordering is a per-instance [`Comparator`]
/// rather than a fixed `Ord` obligation.
///
/// Duplicate keys are off by default and can be enabled with
/// [`set_allows_duplicates`]; while enabled, the per-operation [`Bias`]
/// values choose which member of a run of equal keys an insert, lookup, or
/// removal targets.
///
/// It is a logic error for a key to be modified in such a way that its
/// ordering under the map's comparator changes while it is in the map. The
/// behavior resulting from such a logic error is unspecified but will not
/// result in undefined behavior.
///
/// # Examples
///
/// ```
/// use rank_tree::{Rank, RankTreeMap};
///
/// let mut scores = RankTreeMap::new();
/// scores.insert("Alice", 100);
/// scores.insert("Bob", 85);
/// scores.insert("Carol", 92);
///
/// assert_eq!(scores.get(&"Bob"), Some(&85));
/// assert_eq!(scores.len(), 3);
///
/// // Positional access follows the sorted order of the keys.
/// let (name, _) = scores.get_at(1).unwrap();
/// assert_eq!(*name, "Bob");
/// assert_eq!(scores.index_of(&"Carol"), Some(2));
/// assert_eq!(scores[Rank(0)], 100);
/// ```
///
/// [`get_at`]: RankTreeMap::get_at
/// [`remove_at`]: RankTreeMap::remove_at
/// [`index_of`]: RankTreeMap::index_of
/// [`set_allows_duplicates`]: RankTreeMap::set_allows_duplicates
pub struct RankTreeMap<K, V, C = NaturalOrder> {
    raw: RawRankTree<K, V>,
    cmp: C,
    allows_duplicates: bool,
    insert_bias: Bias,
    lookup_bias: Bias,
    remove_bias: Bias,
    read_only: bool,
}

/// An iterator over the entries of a [`RankTreeMap`], in key order.
///
/// Created by [`RankTreeMap::iter`] and the range methods.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    tree: Option<&'a RawRankTree<K, V>>,
    front: Option<(NodeId, usize)>,
    back: Option<(NodeId, usize)>,
    remaining: usize,
}

/// An iterator over the keys of a [`RankTreeMap`].
///
/// Created by [`RankTreeMap::keys`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of a [`RankTreeMap`], in key order.
///
/// Created by [`RankTreeMap::values`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An owning iterator over the entries of a [`RankTreeMap`], in key order.
///
/// Created by the [`IntoIterator`] impl on the map itself.
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

impl<K, V> RankTreeMap<K, V, NaturalOrder> {
    /// Creates an empty map ordered by `K`'s natural order, with the
    /// default node order of 128.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTreeMap;
    ///
    /// let mut map = RankTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    /// Creates an empty map with the given node order (the per-node entry
    /// capacity of the underlying tree).
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidCapacity`] if `order < 3`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::{RankTreeMap, TreeError};
    ///
    /// let map: RankTreeMap<i32, i32> = RankTreeMap::with_order(10).unwrap();
    /// assert_eq!(map.order(), 10);
    ///
    /// let too_small = RankTreeMap::<i32, i32>::with_order(2);
    /// assert_eq!(too_small.err(), Some(TreeError::InvalidCapacity(2)));
    /// ```
    pub fn with_order(order: usize) -> Result<Self> {
        Self::with_order_and_comparator(order, NaturalOrder)
    }
}

impl<K, V, C> RankTreeMap<K, V, C> {
    /// Creates an empty map ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        match Self::with_order_and_comparator(DEFAULT_ORDER, cmp) {
            Ok(map) => map,
            Err(_) => unreachable!("default order is valid"),
        }
    }

    /// Creates an empty map with the given node order, ordered by `cmp`.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidCapacity`] if `order < 3`.
    pub fn with_order_and_comparator(order: usize, cmp: C) -> Result<Self> {
        if order < MIN_ORDER {
            return Err(TreeError::InvalidCapacity(order));
        }
        Ok(Self {
            raw: RawRankTree::new(order),
            cmp,
            allows_duplicates: false,
            insert_bias: Bias::default(),
            lookup_bias: Bias::default(),
            remove_bias: Bias::default(),
            read_only: false,
        })
    }

    /// The node order the tree was built with.
    #[must_use]
    pub const fn order(&self) -> usize {
        self.raw.order()
    }

    /// The comparator ordering this map.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Whether equal keys may coexist.
    #[must_use]
    pub const fn allows_duplicates(&self) -> bool {
        self.allows_duplicates
    }

    /// Enables or disables duplicate keys. Enabling is always permitted;
    /// disabling requires the map to be empty, so a uniqueness guarantee is
    /// never asserted over entries that may already violate it.
    ///
    /// # Errors
    ///
    /// [`TreeError::DuplicatesTransition`] when disabling on a non-empty map.
    pub fn set_allows_duplicates(&mut self, allow: bool) -> Result<()> {
        if !allow && !self.is_empty() {
            return Err(TreeError::DuplicatesTransition);
        }
        self.allows_duplicates = allow;
        Ok(())
    }

    /// The bias applied to insert positions while duplicates are enabled.
    #[must_use]
    pub const fn insert_bias(&self) -> Bias {
        self.insert_bias
    }

    pub fn set_insert_bias(&mut self, bias: Bias) {
        self.insert_bias = bias;
    }

    /// The bias applied to lookups while duplicates are enabled.
    #[must_use]
    pub const fn lookup_bias(&self) -> Bias {
        self.lookup_bias
    }

    pub fn set_lookup_bias(&mut self, bias: Bias) {
        self.lookup_bias = bias;
    }

    /// The bias applied to removals while duplicates are enabled.
    #[must_use]
    pub const fn remove_bias(&self) -> Bias {
        self.remove_bias
    }

    pub fn set_remove_bias(&mut self, bias: Bias) {
        self.remove_bias = bias;
    }

    /// Whether the map currently rejects mutation.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Latches (or unlatches) the map against mutation. While latched,
    /// every mutating method panics.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Removes every entry. The tree's first leaf is reused, so clearing
    /// does not shrink-and-regrow the arena on refill.
    ///
    /// # Panics
    ///
    /// Panics if the map is read-only.
    pub fn clear(&mut self) {
        self.assert_writable();
        self.raw.clear();
    }

    /// The entry with rank `index`, or `None` past the end.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTreeMap;
    ///
    /// let map = RankTreeMap::from([(3, "c"), (1, "a"), (2, "b")]);
    /// assert_eq!(map.get_at(0), Some((&1, &"a")));
    /// assert_eq!(map.get_at(2), Some((&3, &"c")));
    /// assert_eq!(map.get_at(3), None);
    /// ```
    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<(&K, &V)> {
        let (leaf, pos) = self.raw.leaf_at(index)?;
        Some(self.raw.entry(leaf, pos))
    }

    /// The entry with rank `index`, with the value mutable.
    pub fn get_at_mut(&mut self, index: usize) -> Option<(&K, &mut V)> {
        let (leaf, pos) = self.raw.leaf_at(index)?;
        Some(self.raw.entry_mut(leaf, pos))
    }

    /// Replaces the value of the entry with rank `index`, returning the old
    /// value.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index >= len`.
    ///
    /// # Panics
    ///
    /// Panics if the map is read-only.
    pub fn set_value_at(&mut self, index: usize, value: V) -> Result<V> {
        self.assert_writable();
        let (leaf, pos) = self.raw.leaf_at(index).ok_or(TreeError::IndexOutOfRange {
            index,
            len: self.len(),
        })?;
        Ok(self.raw.replace_value(leaf, pos, value))
    }

    /// The first entry in key order.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.get_at(0)
    }

    /// The last entry in key order.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let (leaf, pos) = self.raw.last_position()?;
        Some(self.raw.entry(leaf, pos))
    }

    /// An iterator over the entries, in key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: Some(&self.raw),
            front: Some((self.raw.first_leaf(), 0)),
            back: self.raw.last_position(),
            remaining: self.len(),
        }
    }

    /// An iterator over the entries with ranks `index..len`, ascending.
    /// Empty when `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTreeMap;
    ///
    /// let map = RankTreeMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
    /// let tail: Vec<_> = map.iter_from_index(1).map(|(&k, _)| k).collect();
    /// assert_eq!(tail, [2, 3]);
    /// ```
    pub fn iter_from_index(&self, index: usize) -> Iter<'_, K, V> {
        match self.raw.leaf_at(index) {
            Some(front) => Iter {
                tree: Some(&self.raw),
                front: Some(front),
                back: self.raw.last_position(),
                remaining: self.len() - index,
            },
            None => Iter::default(),
        }
    }

    /// The entries with ranks `0..=index`, ascending. `index` is clamped to
    /// the last entry.
    pub(crate) fn iter_up_to_index(&self, index: usize) -> Iter<'_, K, V> {
        let len = self.len();
        if len == 0 {
            return Iter::default();
        }
        let index = index.min(len - 1);
        Iter {
            tree: Some(&self.raw),
            front: Some((self.raw.first_leaf(), 0)),
            back: self.raw.leaf_at(index),
            remaining: index + 1,
        }
    }

    /// An iterator over the entries with ranks `index, index-1, …, 0`.
    /// `index` is clamped to the last entry; empty when the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTreeMap;
    ///
    /// let map = RankTreeMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
    /// let down: Vec<_> = map.iter_back_from_index(1).map(|(&k, _)| k).collect();
    /// assert_eq!(down, [2, 1]);
    /// ```
    pub fn iter_back_from_index(&self, index: usize) -> Rev<Iter<'_, K, V>> {
        self.iter_up_to_index(index).rev()
    }

    /// An iterator over the keys, in order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// An iterator over the values, in key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// A read-only, ordered-set-shaped view of the keys.
    #[must_use]
    pub fn keys_view(&self) -> KeysView<'_, K, V, C> {
        KeysView::new(self)
    }

    /// A read-only collection view of the values.
    #[must_use]
    pub fn values_view(&self) -> ValuesView<'_, K, V, C> {
        ValuesView::new(self)
    }

    fn assert_writable(&self) {
        assert!(!self.read_only, "cannot mutate a read-only container");
    }

    /// Effective bias for an operation: the configured one while duplicates
    /// are enabled, otherwise no bias.
    fn effective(&self, bias: Bias) -> Bias {
        if self.allows_duplicates { bias } else { Bias::Arbitrary }
    }
}

impl<K, V, C: Comparator<K>> RankTreeMap<K, V, C> {
    /// Returns a reference to the value of `key`. With duplicates enabled
    /// the [`lookup_bias`] selects which member of the run answers.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTreeMap;
    ///
    /// let map = RankTreeMap::from([(1, "a")]);
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    ///
    /// [`lookup_bias`]: RankTreeMap::lookup_bias
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let (leaf, pos, found) = self.raw.find(key, &self.cmp, self.effective(self.lookup_bias));
        found.then(|| self.raw.entry(leaf, pos).1)
    }

    /// Returns a mutable reference to the value of `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (leaf, pos, found) = self.raw.find(key, &self.cmp, self.effective(self.lookup_bias));
        found.then(move || self.raw.value_mut(leaf, pos))
    }

    /// Returns the stored key and value for `key`.
    #[must_use]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let (leaf, pos, found) = self.raw.find(key, &self.cmp, self.effective(self.lookup_bias));
        found.then(|| self.raw.entry(leaf, pos))
    }

    /// Like [`get`](RankTreeMap::get), but absence is an error.
    ///
    /// # Errors
    ///
    /// [`TreeError::KeyNotFound`] if `key` is not present.
    pub fn try_get(&self, key: &K) -> Result<&V> {
        self.get(key).ok_or(TreeError::KeyNotFound)
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.find(key, &self.cmp, Bias::Arbitrary).2
    }

    /// The rank of `key`, or `None` if absent. With duplicates enabled the
    /// [`lookup_bias`](RankTreeMap::lookup_bias) picks the run member whose
    /// rank is reported.
    #[must_use]
    pub fn index_of(&self, key: &K) -> Option<usize> {
        let (leaf, pos, found) = self.raw.find(key, &self.cmp, self.effective(self.lookup_bias));
        found.then(|| self.raw.rank_of(leaf, pos))
    }

    /// The rank of the first entry whose key sorts strictly above `key`,
    /// or `None` when no entry does. Skips the entire run when `key` itself
    /// is present multiple times.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTreeMap;
    ///
    /// let map = RankTreeMap::from([(10, ()), (20, ()), (30, ())]);
    /// assert_eq!(map.first_index_greater_than(&10), Some(1));
    /// assert_eq!(map.first_index_greater_than(&15), Some(1));
    /// assert_eq!(map.first_index_greater_than(&30), None);
    /// ```
    #[must_use]
    pub fn first_index_greater_than(&self, key: &K) -> Option<usize> {
        let (leaf, pos, found) = self.raw.find(key, &self.cmp, Bias::Tail);
        let rank = self.raw.rank_of(leaf, pos);
        let index = if found { rank + 1 } else { rank };
        (index < self.len()).then_some(index)
    }

    /// The rank of the last entry whose key sorts strictly below `key`,
    /// or `None` when no entry does.
    #[must_use]
    pub fn last_index_less_than(&self, key: &K) -> Option<usize> {
        let (leaf, pos, _) = self.raw.find(key, &self.cmp, Bias::Head);
        self.raw.rank_of(leaf, pos).checked_sub(1)
    }

    /// An iterator over the entries whose keys are `>= key`, ascending.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTreeMap;
    ///
    /// let map = RankTreeMap::from([(1, 'a'), (2, 'b'), (4, 'd')]);
    /// let tail: Vec<_> = map.range_from(&2).map(|(&k, _)| k).collect();
    /// assert_eq!(tail, [2, 4]);
    /// ```
    pub fn range_from(&self, key: &K) -> Iter<'_, K, V> {
        let (leaf, pos, _) = self.raw.find(key, &self.cmp, Bias::Head);
        let rank = self.raw.rank_of(leaf, pos);
        Iter {
            tree: Some(&self.raw),
            front: Some((leaf, pos)),
            back: self.raw.last_position(),
            remaining: self.len() - rank,
        }
    }

    /// The entries whose keys are `<= key`, ascending; ends at the tail of
    /// the run when `key` repeats.
    pub(crate) fn range_up_to(&self, key: &K) -> Iter<'_, K, V> {
        let (leaf, pos, found) = self.raw.find(key, &self.cmp, Bias::Tail);
        let end = if found { Some((leaf, pos)) } else { self.raw.step_back(leaf, pos) };
        match end {
            Some((leaf, pos)) => Iter {
                tree: Some(&self.raw),
                front: Some((self.raw.first_leaf(), 0)),
                back: Some((leaf, pos)),
                remaining: self.raw.rank_of(leaf, pos) + 1,
            },
            None => Iter::default(),
        }
    }

    /// An iterator over the entries whose keys are `<= key`, descending.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTreeMap;
    ///
    /// let map = RankTreeMap::from([(1, 'a'), (2, 'b'), (4, 'd')]);
    /// let down: Vec<_> = map.range_to_rev(&3).map(|(&k, _)| k).collect();
    /// assert_eq!(down, [2, 1]);
    /// ```
    pub fn range_to_rev(&self, key: &K) -> Rev<Iter<'_, K, V>> {
        self.range_up_to(key).rev()
    }

    /// An iterator over the entries whose keys lie in `[lo, hi]`, ascending.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidRange`] when `hi` sorts below `lo`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTreeMap;
    ///
    /// let map = RankTreeMap::from([(1, 'a'), (2, 'b'), (3, 'c'), (5, 'e')]);
    /// let mid: Vec<_> = map.range(&2, &4).unwrap().map(|(&k, _)| k).collect();
    /// assert_eq!(mid, [2, 3]);
    /// ```
    pub fn range(&self, lo: &K, hi: &K) -> Result<Iter<'_, K, V>> {
        if self.cmp.cmp(hi, lo).is_lt() {
            return Err(TreeError::InvalidRange);
        }
        let (start_leaf, start_pos, _) = self.raw.find(lo, &self.cmp, Bias::Head);
        let start_rank = self.raw.rank_of(start_leaf, start_pos);

        let (leaf, pos, found) = self.raw.find(hi, &self.cmp, Bias::Tail);
        let end = if found { Some((leaf, pos)) } else { self.raw.step_back(leaf, pos) };
        let Some((end_leaf, end_pos)) = end else {
            return Ok(Iter::default());
        };
        let end_rank = self.raw.rank_of(end_leaf, end_pos);
        if end_rank < start_rank {
            return Ok(Iter::default());
        }
        Ok(Iter {
            tree: Some(&self.raw),
            front: Some((start_leaf, start_pos)),
            back: Some((end_leaf, end_pos)),
            remaining: end_rank - start_rank + 1,
        })
    }
}

impl<K: Clone, V, C> RankTreeMap<K, V, C> {
    /// Removes and returns the entry with rank `index`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] if `index >= len`.
    ///
    /// # Panics
    ///
    /// Panics if the map is read-only.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::RankTreeMap;
    ///
    /// let mut map = RankTreeMap::from([(1, 'a'), (2, 'b')]);
    /// assert_eq!(map.remove_at(0), Ok((1, 'a')));
    /// assert!(map.remove_at(5).is_err());
    /// ```
    pub fn remove_at(&mut self, index: usize) -> Result<(K, V)> {
        self.assert_writable();
        let (leaf, pos) = self.raw.leaf_at(index).ok_or(TreeError::IndexOutOfRange {
            index,
            len: self.len(),
        })?;
        Ok(self.raw.remove_at(leaf, pos))
    }
}

impl<K: Clone, V, C: Comparator<K>> RankTreeMap<K, V, C> {
    /// Inserts `key ↦ value`, replacing and returning the previous value
    /// when the key is already present (the [`insert_bias`] picks the run
    /// member to replace while duplicates are enabled).
    ///
    /// # Panics
    ///
    /// Panics if the map is read-only.
    ///
    /// [`insert_bias`]: RankTreeMap::insert_bias
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.assert_writable();
        let bias = self.effective(self.insert_bias);
        let (leaf, pos, found) = self.raw.find(&key, &self.cmp, bias);
        if found {
            return Some(self.raw.replace_value(leaf, pos, value));
        }
        self.raw.insert_at(leaf, pos, key, value);
        None
    }

    /// Inserts `key ↦ value` as a new entry. With duplicates enabled the
    /// new entry joins the run at the end the [`insert_bias`] names; with
    /// duplicates disabled an existing key is an error.
    ///
    /// # Errors
    ///
    /// [`TreeError::DuplicateKey`] when duplicates are disabled and `key`
    /// is present.
    ///
    /// # Panics
    ///
    /// Panics if the map is read-only.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::{Bias, RankTreeMap, TreeError};
    ///
    /// let mut map = RankTreeMap::new();
    /// map.try_insert(1, "one").unwrap();
    /// assert_eq!(map.try_insert(1, "uno"), Err(TreeError::DuplicateKey));
    ///
    /// let mut multi = RankTreeMap::new();
    /// multi.set_allows_duplicates(true).unwrap();
    /// multi.set_insert_bias(Bias::Tail);
    /// multi.try_insert(1, "one").unwrap();
    /// multi.try_insert(1, "uno").unwrap();
    /// assert_eq!(multi.len(), 2);
    /// ```
    ///
    /// [`insert_bias`]: RankTreeMap::insert_bias
    pub fn try_insert(&mut self, key: K, value: V) -> Result<()> {
        self.assert_writable();
        let bias = self.effective(self.insert_bias);
        let (leaf, mut pos, found) = self.raw.find(&key, &self.cmp, bias);
        if found {
            if !self.allows_duplicates {
                return Err(TreeError::DuplicateKey);
            }
            if bias.is_tail() {
                pos += 1;
            }
        }
        self.raw.insert_at(leaf, pos, key, value);
        Ok(())
    }

    /// Removes `key` and returns its value, if present. The
    /// [`remove_bias`](RankTreeMap::remove_bias) picks the run member to
    /// remove while duplicates are enabled.
    ///
    /// # Panics
    ///
    /// Panics if the map is read-only.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key` and returns the stored entry, if present.
    ///
    /// # Panics
    ///
    /// Panics if the map is read-only.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        self.assert_writable();
        let (leaf, pos, found) = self.raw.find(key, &self.cmp, self.effective(self.remove_bias));
        found.then(|| self.raw.remove_at(leaf, pos))
    }
}

impl<K: Clone, V: Clone, C> RankTreeMap<K, V, C> {
    /// Clones every entry, in key order, into `dst` starting at `offset`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfRange`] when the entries do not fit.
    pub fn copy_to(&self, dst: &mut [(K, V)], offset: usize) -> Result<()> {
        let end = offset
            .checked_add(self.len())
            .filter(|&end| end <= dst.len())
            .ok_or(TreeError::IndexOutOfRange {
                index: offset,
                len: dst.len(),
            })?;
        for (slot, (key, value)) in dst[offset..end].iter_mut().zip(self.iter()) {
            *slot = (key.clone(), value.clone());
        }
        Ok(())
    }
}

// ─── Trait impls ─────────────────────────────────────────────────────────────

impl<K, V, C: Default> Default for RankTreeMap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for RankTreeMap<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            cmp: self.cmp.clone(),
            allows_duplicates: self.allows_duplicates,
            insert_bias: self.insert_bias,
            lookup_bias: self.lookup_bias,
            remove_bias: self.remove_bias,
            read_only: self.read_only,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for RankTreeMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C> Index<Rank> for RankTreeMap<K, V, C> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if the rank is out of range.
    fn index(&self, rank: Rank) -> &V {
        match self.get_at(rank.0) {
            Some((_, value)) => value,
            None => panic!("rank {} out of range for length {}", rank.0, self.len()),
        }
    }
}

impl<K, V, C: Comparator<K>> Index<&K> for RankTreeMap<K, V, C> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present.
    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Clone, V, C: Comparator<K> + Default> FromIterator<(K, V)> for RankTreeMap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_comparator(C::default());
        map.extend(iter);
        map
    }
}

impl<K: Clone + Ord, V, const N: usize> From<[(K, V); N]> for RankTreeMap<K, V> {
    /// ```
    /// use rank_tree::RankTreeMap;
    ///
    /// let map = RankTreeMap::from([(2, "b"), (1, "a")]);
    /// assert_eq!(map.get_at(0), Some((&1, &"a")));
    /// ```
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Clone, V, C: Comparator<K>> Extend<(K, V)> for RankTreeMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a RankTreeMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V, C> IntoIterator for RankTreeMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

// ─── Iterators ───────────────────────────────────────────────────────────────

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree?;
        let (mut leaf, mut pos) = self.front?;
        // Skip exhausted leaves; the chain may contain an empty one.
        loop {
            let node = tree.node(leaf).as_leaf();
            if pos < node.count() {
                break;
            }
            leaf = node.next()?;
            pos = 0;
        }
        let entry = tree.entry(leaf, pos);
        self.remaining -= 1;
        self.front = Some((leaf, pos + 1));
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree?;
        let (leaf, pos) = self.back?;
        let entry = tree.entry(leaf, pos);
        self.remaining -= 1;
        self.back = tree.step_back(leaf, pos);
        Some(entry)
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<K, V> Default for Iter<'_, K, V> {
    fn default() -> Self {
        Self {
            tree: None,
            front: None,
            back: None,
            remaining: 0,
        }
    }
}

impl<K, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("remaining", &self.inner.len()).finish()
    }
}
