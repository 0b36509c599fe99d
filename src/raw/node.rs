use smallvec::SmallVec;

use super::arena::NodeId;
use crate::compare::Comparator;

/// Inline slots per node vector before spilling to the heap. The node order
/// is a runtime parameter, so this only sizes the stack portion; trees built
/// with small orders (tests commonly use 3..16) never touch the heap per node.
pub(crate) const INLINE: usize = 8;

pub(crate) type Slots<T> = SmallVec<[T; INLINE]>;

/// A tree node: either an internal separator node or a leaf.
///
/// Internal nodes keep `keys` and `children` parallel: `keys[i]` is the
/// smallest live key in the subtree under `children[i]`. Leaves keep `keys`
/// and `values` parallel and are threaded into a doubly-linked chain.
pub(crate) enum Node<K, V> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K, V>),
}

pub(crate) struct InternalNode<K> {
    parent: Option<NodeId>,
    /// Number of leaf entries in the subtree rooted at this node.
    total: usize,
    keys: Slots<K>,
    children: Slots<NodeId>,
}

pub(crate) struct LeafNode<K, V> {
    parent: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    keys: Slots<K>,
    values: Slots<V>,
}

/// Result of searching for a key in a node.
pub(crate) enum SearchResult {
    /// Key was found at the given slot (an arbitrary one if it repeats).
    Found(usize),
    /// Key was not found; the slot is where it would be inserted.
    NotFound(usize),
}

impl<K, V> Node<K, V> {
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub(crate) fn as_leaf(&self) -> &LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    pub(crate) fn as_internal(&self) -> &InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Number of live slots.
    pub(crate) fn count(&self) -> usize {
        match self {
            Node::Internal(internal) => internal.count(),
            Node::Leaf(leaf) => leaf.count(),
        }
    }

    /// Number of leaf entries in this subtree. For a leaf this is its count.
    pub(crate) fn total(&self) -> usize {
        match self {
            Node::Internal(internal) => internal.total(),
            Node::Leaf(leaf) => leaf.count(),
        }
    }

    pub(crate) fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Internal(internal) => internal.parent,
            Node::Leaf(leaf) => leaf.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Node::Internal(internal) => internal.parent = parent,
            Node::Leaf(leaf) => leaf.parent = parent,
        }
    }

    /// The node's smallest live key, if any.
    pub(crate) fn first_key(&self) -> Option<&K> {
        match self {
            Node::Internal(internal) => internal.keys.first(),
            Node::Leaf(leaf) => leaf.keys.first(),
        }
    }
}

impl<K> InternalNode<K> {
    pub(crate) fn new(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            total: 0,
            keys: SmallVec::new(),
            children: SmallVec::new(),
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }

    pub(crate) fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    pub(crate) fn add_total(&mut self, delta: usize) {
        self.total += delta;
    }

    pub(crate) fn sub_total(&mut self, delta: usize) {
        self.total -= delta;
    }

    #[inline]
    pub(crate) fn key(&self, slot: usize) -> &K {
        &self.keys[slot]
    }

    pub(crate) fn set_key(&mut self, slot: usize, key: K) {
        self.keys[slot] = key;
    }

    #[inline]
    pub(crate) fn child(&self, slot: usize) -> NodeId {
        self.children[slot]
    }

    pub(crate) fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Slot occupied by `child` in this node. The child must be present.
    pub(crate) fn slot_of(&self, child: NodeId) -> usize {
        self.children.iter().position(|&c| c == child).expect("child not present in parent")
    }

    /// Inserts a separator/child pair at `slot`, shifting the tail right.
    pub(crate) fn insert_entry(&mut self, slot: usize, key: K, child: NodeId) {
        self.keys.insert(slot, key);
        self.children.insert(slot, child);
    }

    /// Removes the separator/child pair at `slot`, shifting the tail left.
    pub(crate) fn remove_entry(&mut self, slot: usize) -> (K, NodeId) {
        (self.keys.remove(slot), self.children.remove(slot))
    }

    /// Moves the first `count` separator/child pairs out of this node.
    pub(crate) fn drain_head(&mut self, count: usize) -> (Slots<K>, Slots<NodeId>) {
        let keys = self.keys.drain(..count).collect();
        let children = self.children.drain(..count).collect();
        (keys, children)
    }

    /// Moves every pair from `slot` onward out of this node.
    pub(crate) fn drain_tail(&mut self, slot: usize) -> (Slots<K>, Slots<NodeId>) {
        let keys = self.keys.drain(slot..).collect();
        let children = self.children.drain(slot..).collect();
        (keys, children)
    }

    /// Appends separator/child pairs at the tail.
    pub(crate) fn extend(&mut self, keys: Slots<K>, children: Slots<NodeId>) {
        self.keys.extend(keys);
        self.children.extend(children);
    }

    #[inline]
    pub(crate) fn search<C: Comparator<K>>(&self, key: &K, cmp: &C) -> SearchResult {
        match self.keys.binary_search_by(|probe| cmp.cmp(probe, key)) {
            Ok(slot) => SearchResult::Found(slot),
            Err(slot) => SearchResult::NotFound(slot),
        }
    }
}

impl<K, V> LeafNode<K, V> {
    pub(crate) fn new(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            prev: None,
            next: None,
            keys: SmallVec::new(),
            values: SmallVec::new(),
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    pub(crate) fn set_prev(&mut self, prev: Option<NodeId>) {
        self.prev = prev;
    }

    pub(crate) fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub(crate) fn set_next(&mut self, next: Option<NodeId>) {
        self.next = next;
    }

    #[inline]
    pub(crate) fn key(&self, slot: usize) -> &K {
        &self.keys[slot]
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, slot: usize) -> &mut V {
        &mut self.values[slot]
    }

    pub(crate) fn replace_value(&mut self, slot: usize, value: V) -> V {
        core::mem::replace(&mut self.values[slot], value)
    }

    pub(crate) fn entry(&self, slot: usize) -> (&K, &V) {
        (&self.keys[slot], &self.values[slot])
    }

    pub(crate) fn entry_mut(&mut self, slot: usize) -> (&K, &mut V) {
        (&self.keys[slot], &mut self.values[slot])
    }

    /// Inserts a key/value pair at `slot`, shifting the tail right.
    pub(crate) fn insert(&mut self, slot: usize, key: K, value: V) {
        self.keys.insert(slot, key);
        self.values.insert(slot, value);
    }

    /// Removes the key/value pair at `slot`, shifting the tail left.
    pub(crate) fn remove(&mut self, slot: usize) -> (K, V) {
        (self.keys.remove(slot), self.values.remove(slot))
    }

    /// Moves the first `count` entries out of this leaf.
    pub(crate) fn drain_head(&mut self, count: usize) -> (Slots<K>, Slots<V>) {
        let keys = self.keys.drain(..count).collect();
        let values = self.values.drain(..count).collect();
        (keys, values)
    }

    /// Moves every entry from `slot` onward out of this leaf.
    pub(crate) fn drain_tail(&mut self, slot: usize) -> (Slots<K>, Slots<V>) {
        let keys = self.keys.drain(slot..).collect();
        let values = self.values.drain(slot..).collect();
        (keys, values)
    }

    /// Appends entries at the tail.
    pub(crate) fn extend(&mut self, keys: Slots<K>, values: Slots<V>) {
        self.keys.extend(keys);
        self.values.extend(values);
    }

    /// Takes every entry, leaving the leaf empty but still linked.
    pub(crate) fn take_all(&mut self) -> (Slots<K>, Slots<V>) {
        (core::mem::take(&mut self.keys), core::mem::take(&mut self.values))
    }

    pub(crate) fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
        self.parent = None;
        self.prev = None;
        self.next = None;
    }

    #[inline]
    pub(crate) fn search<C: Comparator<K>>(&self, key: &K, cmp: &C) -> SearchResult {
        match self.keys.binary_search_by(|probe| cmp.cmp(probe, key)) {
            Ok(slot) => SearchResult::Found(slot),
            Err(slot) => SearchResult::NotFound(slot),
        }
    }
}

impl<K: Clone, V: Clone> Clone for Node<K, V> {
    fn clone(&self) -> Self {
        match self {
            Node::Internal(internal) => Node::Internal(InternalNode {
                parent: internal.parent,
                total: internal.total,
                keys: internal.keys.clone(),
                children: internal.children.clone(),
            }),
            Node::Leaf(leaf) => Node::Leaf(LeafNode {
                parent: leaf.parent,
                prev: leaf.prev,
                next: leaf.next,
                keys: leaf.keys.clone(),
                values: leaf.values.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::NaturalOrder;

    #[test]
    fn leaf_search_reports_insertion_slot() {
        let mut leaf: LeafNode<i32, ()> = LeafNode::new(None);
        for (slot, key) in [10, 20, 30].into_iter().enumerate() {
            leaf.insert(slot, key, ());
        }
        assert!(matches!(leaf.search(&20, &NaturalOrder), SearchResult::Found(1)));
        assert!(matches!(leaf.search(&25, &NaturalOrder), SearchResult::NotFound(2)));
        assert!(matches!(leaf.search(&5, &NaturalOrder), SearchResult::NotFound(0)));
        assert!(matches!(leaf.search(&35, &NaturalOrder), SearchResult::NotFound(3)));
    }

    #[test]
    fn leaf_drains_preserve_order() {
        let mut leaf: LeafNode<i32, i32> = LeafNode::new(None);
        for (slot, key) in [1, 2, 3, 4].into_iter().enumerate() {
            leaf.insert(slot, key, key * 10);
        }
        let (keys, values) = leaf.drain_tail(2);
        assert_eq!(keys.as_slice(), &[3, 4]);
        assert_eq!(values.as_slice(), &[30, 40]);
        assert_eq!(leaf.count(), 2);

        let (keys, values) = leaf.drain_head(1);
        assert_eq!(keys.as_slice(), &[1]);
        assert_eq!(values.as_slice(), &[10]);
        assert_eq!(leaf.key(0), &2);
    }
}
