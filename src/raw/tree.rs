use alloc::vec::Vec;

use super::arena::{Arena, NodeId};
use super::node::{InternalNode, LeafNode, Node, SearchResult, Slots};
use crate::bias::Bias;
use crate::compare::Comparator;

/// Smallest legal node order.
pub(crate) const MIN_ORDER: usize = 3;

/// Default node order when the caller does not choose one.
pub(crate) const DEFAULT_ORDER: usize = 128;

/// The core B+-tree engine backing `RankTreeMap` and `RankTreeSet`.
///
/// Every entry lives in a leaf; internal nodes carry min-of-child separator
/// keys and subtree entry totals. Leaves form a doubly-linked chain starting
/// at `first_leaf`, which is created with the tree and never replaced — an
/// empty tree is just the root pointing at the empty first leaf, and `clear`
/// re-initializes that leaf in place.
///
/// The engine is comparator-agnostic and always permits equal keys; the
/// facades enforce uniqueness where duplicates are disabled. Ordering is
/// supplied per call so the engine never captures the comparator type.
pub(crate) struct RawRankTree<K, V> {
    nodes: Arena<Node<K, V>>,
    root: NodeId,
    first_leaf: NodeId,
    order: usize,
}

impl<K, V> RawRankTree<K, V> {
    /// Creates an empty tree. `order` must already be validated (≥ 3).
    pub(crate) fn new(order: usize) -> Self {
        debug_assert!(order >= MIN_ORDER);
        let mut nodes = Arena::new();
        let first_leaf = nodes.alloc(Node::Leaf(LeafNode::new(None)));
        Self {
            nodes,
            root: first_leaf,
            first_leaf,
            order,
        }
    }

    /// Number of entries in the tree.
    pub(crate) fn len(&self) -> usize {
        self.nodes.get(self.root).total()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) const fn order(&self) -> usize {
        self.order
    }

    pub(crate) const fn first_leaf(&self) -> NodeId {
        self.first_leaf
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        self.nodes.get(id)
    }

    /// The entry at an in-leaf position.
    #[inline]
    pub(crate) fn entry(&self, leaf: NodeId, pos: usize) -> (&K, &V) {
        self.nodes.get(leaf).as_leaf().entry(pos)
    }

    pub(crate) fn value_mut(&mut self, leaf: NodeId, pos: usize) -> &mut V {
        self.nodes.get_mut(leaf).as_leaf_mut().value_mut(pos)
    }

    pub(crate) fn entry_mut(&mut self, leaf: NodeId, pos: usize) -> (&K, &mut V) {
        self.nodes.get_mut(leaf).as_leaf_mut().entry_mut(pos)
    }

    pub(crate) fn replace_value(&mut self, leaf: NodeId, pos: usize, value: V) -> V {
        self.nodes.get_mut(leaf).as_leaf_mut().replace_value(pos, value)
    }

    /// Re-initializes the tree to empty, keeping (and reusing) the first
    /// leaf. Every other node is released back to the arena.
    pub(crate) fn clear(&mut self) {
        self.nodes.reset_keeping(self.first_leaf);
        self.nodes.get_mut(self.first_leaf).as_leaf_mut().clear();
        self.root = self.first_leaf;
        debug_assert_eq!(self.nodes.len(), 1);
    }

    /// Consumes every entry in ascending order by walking the leaf chain,
    /// then resets the tree. O(n); no rebalancing.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut out = Vec::with_capacity(self.len());
        let mut current = Some(self.first_leaf);
        while let Some(id) = current {
            let leaf = self.nodes.get_mut(id).as_leaf_mut();
            current = leaf.next();
            let (keys, values) = leaf.take_all();
            out.extend(keys.into_iter().zip(values));
        }
        self.clear();
        out
    }

    /// Descends to the leaf holding the entry with absolute rank `index`.
    /// Uses child subtree totals, so each level inspects at most `order`
    /// children.
    pub(crate) fn leaf_at(&self, index: usize) -> Option<(NodeId, usize)> {
        if index >= self.len() {
            return None;
        }
        let mut remaining = index;
        let mut current = self.root;
        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => {
                    let mut descended = false;
                    for &child in internal.children() {
                        let total = self.nodes.get(child).total();
                        if remaining < total {
                            current = child;
                            descended = true;
                            break;
                        }
                        remaining -= total;
                    }
                    debug_assert!(descended, "leaf_at: subtree totals out of sync at rank {index}");
                    if !descended {
                        return None;
                    }
                }
                Node::Leaf(_) => return Some((current, remaining)),
            }
        }
    }

    /// Absolute rank of an in-leaf position: the position plus the totals of
    /// every left sibling on the path to the root. Accepts the one-past-end
    /// position of a leaf (yielding the rank an insertion there would get).
    pub(crate) fn rank_of(&self, leaf: NodeId, pos: usize) -> usize {
        let mut rank = pos;
        let mut current = leaf;
        while let Some(parent) = self.nodes.get(current).parent() {
            let internal = self.nodes.get(parent).as_internal();
            let slot = internal.slot_of(current);
            for &child in &internal.children()[..slot] {
                rank += self.nodes.get(child).total();
            }
            current = parent;
        }
        rank
    }

    /// Position of the last entry, if any.
    pub(crate) fn last_position(&self) -> Option<(NodeId, usize)> {
        if self.is_empty() {
            return None;
        }
        let mut current = self.root;
        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => current = internal.child(internal.count() - 1),
                Node::Leaf(leaf) => return Some((current, leaf.count() - 1)),
            }
        }
    }

    /// Position of the entry immediately before `(leaf, pos)`, stepping
    /// through the chain and tolerating empty leaves. `pos` may be an
    /// insertion position.
    pub(crate) fn step_back(&self, leaf: NodeId, pos: usize) -> Option<(NodeId, usize)> {
        if pos > 0 {
            return Some((leaf, pos - 1));
        }
        let mut current = self.nodes.get(leaf).as_leaf().prev();
        while let Some(id) = current {
            let node = self.nodes.get(id).as_leaf();
            if node.count() > 0 {
                return Some((id, node.count() - 1));
            }
            current = node.prev();
        }
        None
    }

    /// Locates `key`, or the position where it would be inserted.
    ///
    /// Descent selects children by binary search over the separators; a miss
    /// descends into the greatest-lower-bound child. Where the key repeats,
    /// `bias` steers the result to the head or tail of the run: separator
    /// runs are walked within each internal node, a tail search scans
    /// forward inside the leaf (the separator rule puts the run's last
    /// member in the descended leaf), and a head search walks backward
    /// through the leaf chain until the run ends.
    pub(crate) fn find<C: Comparator<K>>(&self, key: &K, cmp: &C, bias: Bias) -> (NodeId, usize, bool) {
        let mut current = self.root;
        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => {
                    let slot = match internal.search(key, cmp) {
                        SearchResult::Found(mut slot) => {
                            match bias {
                                Bias::Head => {
                                    while slot > 0 && cmp.cmp(internal.key(slot - 1), key).is_eq() {
                                        slot -= 1;
                                    }
                                }
                                Bias::Tail => {
                                    while slot + 1 < internal.count() && cmp.cmp(internal.key(slot + 1), key).is_eq() {
                                        slot += 1;
                                    }
                                }
                                Bias::Arbitrary => {}
                            }
                            slot
                        }
                        SearchResult::NotFound(slot) => slot.saturating_sub(1),
                    };
                    current = internal.child(slot);
                }
                Node::Leaf(leaf) => {
                    return match leaf.search(key, cmp) {
                        SearchResult::Found(pos) => {
                            let (leaf, pos) = match bias {
                                Bias::Head => self.head_of_run(current, pos, key, cmp),
                                Bias::Tail => {
                                    let mut pos = pos;
                                    while pos + 1 < leaf.count() && cmp.cmp(leaf.key(pos + 1), key).is_eq() {
                                        pos += 1;
                                    }
                                    (current, pos)
                                }
                                Bias::Arbitrary => (current, pos),
                            };
                            (leaf, pos, true)
                        }
                        SearchResult::NotFound(pos) => (current, pos, false),
                    };
                }
            }
        }
    }

    /// Walks from a known member of a run of equal keys to the run's first
    /// member, crossing leaf boundaries through `prev`. Runs may straddle
    /// parent pivots (and whole leaves may consist of the key), so the walk
    /// continues until a smaller key or the chain's start is reached.
    fn head_of_run<C: Comparator<K>>(&self, mut leaf: NodeId, mut pos: usize, key: &K, cmp: &C) -> (NodeId, usize) {
        loop {
            let node = self.nodes.get(leaf).as_leaf();
            while pos > 0 && cmp.cmp(node.key(pos - 1), key).is_eq() {
                pos -= 1;
            }
            if pos > 0 {
                return (leaf, pos);
            }
            // Only the (leftmost) first leaf may be empty, so an empty or
            // non-matching predecessor ends the run.
            let Some(prev_id) = node.prev() else {
                return (leaf, pos);
            };
            let prev = self.nodes.get(prev_id).as_leaf();
            let count = prev.count();
            if count == 0 || !cmp.cmp(prev.key(count - 1), key).is_eq() {
                return (leaf, pos);
            }
            leaf = prev_id;
            pos = count - 1;
        }
    }
}

impl<K: Clone, V> RawRankTree<K, V> {
    /// Inserts an entry at a position previously produced by [`find`].
    ///
    /// Splits the leaf first when it is full, re-targeting the insertion to
    /// the new right sibling when the position falls past the entries the
    /// original leaf keeps. A new minimum propagates to ancestor separators;
    /// subtree totals along the parent chain grow by one.
    ///
    /// [`find`]: RawRankTree::find
    pub(crate) fn insert_at(&mut self, leaf: NodeId, pos: usize, key: K, value: V) {
        let (leaf, pos) = self.ensure_room(leaf, pos);
        self.nodes.get_mut(leaf).as_leaf_mut().insert(pos, key, value);
        if pos == 0 {
            self.refresh_parent_key(leaf);
        }
        let mut current = leaf;
        while let Some(parent) = self.nodes.get(current).parent() {
            self.nodes.get_mut(parent).as_internal_mut().add_total(1);
            current = parent;
        }
    }

    /// Removes and returns the entry at `(leaf, pos)`, then rebalances.
    pub(crate) fn remove_at(&mut self, leaf: NodeId, pos: usize) -> (K, V) {
        let mut current = leaf;
        while let Some(parent) = self.nodes.get(current).parent() {
            self.nodes.get_mut(parent).as_internal_mut().sub_total(1);
            current = parent;
        }
        let (key, value) = self.nodes.get_mut(leaf).as_leaf_mut().remove(pos);
        if pos == 0 && self.nodes.get(leaf).count() > 0 {
            self.refresh_parent_key(leaf);
        }
        self.merge(leaf);
        (key, value)
    }

    /// Splits `leaf` if it is full and maps the insertion position into
    /// whichever half it now belongs to.
    fn ensure_room(&mut self, leaf: NodeId, pos: usize) -> (NodeId, usize) {
        if self.nodes.get(leaf).count() < self.order {
            return (leaf, pos);
        }
        let right = self.split(leaf);
        let kept = self.nodes.get(leaf).count();
        if pos > kept {
            (right, pos - kept)
        } else {
            (leaf, pos)
        }
    }

    /// Splits a full node, moving its upper half into a fresh right sibling
    /// under the same parent. Grows a new root first when the node is the
    /// root, and recursively splits the parent when it is itself full.
    /// Returns the sibling.
    fn split(&mut self, node: NodeId) -> NodeId {
        self.grow_root_if_needed(node);
        let parent = self.nodes.get(node).parent().expect("split target has a parent");
        if self.nodes.get(parent).count() >= self.order {
            self.split(parent);
        }
        // The parent split may have migrated `node` under the new sibling.
        let parent = self.nodes.get(node).parent().expect("split target has a parent");

        let keep = self.nodes.get(node).count() / 2;
        let (sibling, separator) = if self.nodes.get(node).is_leaf() {
            let (keys, values) = self.nodes.get_mut(node).as_leaf_mut().drain_tail(keep);
            let old_next = self.nodes.get(node).as_leaf().next();
            let separator = keys[0].clone();
            let mut right = LeafNode::new(Some(parent));
            right.set_prev(Some(node));
            right.set_next(old_next);
            right.extend(keys, values);
            let right_id = self.nodes.alloc(Node::Leaf(right));
            self.nodes.get_mut(node).as_leaf_mut().set_next(Some(right_id));
            if let Some(next) = old_next {
                self.nodes.get_mut(next).as_leaf_mut().set_prev(Some(right_id));
            }
            (right_id, separator)
        } else {
            let (keys, children) = self.nodes.get_mut(node).as_internal_mut().drain_tail(keep);
            let separator = keys[0].clone();
            let child_ids: Slots<NodeId> = children.clone();
            let moved: usize = child_ids.iter().map(|&c| self.nodes.get(c).total()).sum();
            let mut right = InternalNode::new(Some(parent));
            right.set_total(moved);
            right.extend(keys, children);
            let right_id = self.nodes.alloc(Node::Internal(right));
            for &child in &child_ids {
                self.nodes.get_mut(child).set_parent(Some(right_id));
            }
            self.nodes.get_mut(node).as_internal_mut().sub_total(moved);
            (right_id, separator)
        };

        let slot = self.nodes.get(parent).as_internal().slot_of(node);
        self.nodes.get_mut(parent).as_internal_mut().insert_entry(slot + 1, separator, sibling);
        sibling
    }

    /// Gives the root a fresh internal parent and promotes it, so the root
    /// can be split like any other node.
    fn grow_root_if_needed(&mut self, node: NodeId) {
        if self.nodes.get(node).parent().is_some() {
            return;
        }
        debug_assert_eq!(node, self.root);
        let key = self.nodes.get(node).first_key().expect("splitting an empty root").clone();
        let total = self.nodes.get(node).total();
        let mut root = InternalNode::new(None);
        root.set_total(total);
        root.insert_entry(0, key, node);
        let root_id = self.nodes.alloc(Node::Internal(root));
        self.nodes.get_mut(node).set_parent(Some(root_id));
        self.root = root_id;
    }

    /// Re-copies a node's minimum key into its parent separator, cascading
    /// upward for as long as the node sits in slot 0 of its parent.
    fn refresh_parent_key(&mut self, mut node: NodeId) {
        loop {
            let Some(parent) = self.nodes.get(node).parent() else {
                return;
            };
            let Some(min) = self.nodes.get(node).first_key() else {
                return;
            };
            let min = min.clone();
            let slot = self.nodes.get(parent).as_internal().slot_of(node);
            self.nodes.get_mut(parent).as_internal_mut().set_key(slot, min);
            if slot != 0 {
                return;
            }
            node = parent;
        }
    }

    /// Post-removal rebalance. An underfull node (count < order / 2) pulls
    /// entries from its next peer, rebalancing when taking everything would
    /// overflow, then recurses on the drained peer. A node left empty is
    /// unlinked — except the first leaf, which is the chain's permanent
    /// left sentinel. At the root, a single-child internal chain collapses.
    fn merge(&mut self, node: NodeId) {
        if node == self.root {
            self.collapse_root();
            return;
        }
        let count = self.nodes.get(node).count();
        if count < self.order / 2
            && let Some(next) = self.next_peer(node)
        {
            let mut pull = self.nodes.get(next).count();
            if count + pull > self.order {
                pull -= (count + pull) / 2;
            }
            self.move_head_to_tail(next, node, pull);
            self.merge(next);
            return;
        }
        if count == 0 {
            self.unlink_empty(node);
        }
    }

    /// The node's right-hand peer at its own level: the chain `next` for a
    /// leaf, the same-parent right sibling for an internal node.
    fn next_peer(&self, node: NodeId) -> Option<NodeId> {
        if self.nodes.get(node).is_leaf() {
            return self.nodes.get(node).as_leaf().next();
        }
        let parent = self.nodes.get(node).parent()?;
        let internal = self.nodes.get(parent).as_internal();
        let slot = internal.slot_of(node);
        internal.children().get(slot + 1).copied()
    }

    /// Moves the first `count` entries of `src` onto the tail of `dst`
    /// (same-level nodes). Re-points moved children, adjusts subtree totals
    /// up both parent chains until they meet at the lowest common ancestor,
    /// and refreshes the separators whose minimums changed.
    fn move_head_to_tail(&mut self, src: NodeId, dst: NodeId, count: usize) {
        if count == 0 {
            return;
        }
        let dst_was_empty = self.nodes.get(dst).count() == 0;
        let moved: usize;
        if self.nodes.get(src).is_leaf() {
            let (keys, values) = self.nodes.get_mut(src).as_leaf_mut().drain_head(count);
            moved = count;
            self.nodes.get_mut(dst).as_leaf_mut().extend(keys, values);
        } else {
            let (keys, children) = self.nodes.get_mut(src).as_internal_mut().drain_head(count);
            let child_ids: Slots<NodeId> = children.clone();
            moved = child_ids.iter().map(|&c| self.nodes.get(c).total()).sum();
            for &child in &child_ids {
                self.nodes.get_mut(child).set_parent(Some(dst));
            }
            self.nodes.get_mut(src).as_internal_mut().sub_total(moved);
            let dst_node = self.nodes.get_mut(dst).as_internal_mut();
            dst_node.add_total(moved);
            dst_node.extend(keys, children);
        }

        let mut a = src;
        let mut b = dst;
        loop {
            let pa = self.nodes.get(a).parent();
            let pb = self.nodes.get(b).parent();
            match (pa, pb) {
                (Some(pa), Some(pb)) if pa != pb => {
                    self.nodes.get_mut(pa).as_internal_mut().sub_total(moved);
                    self.nodes.get_mut(pb).as_internal_mut().add_total(moved);
                    a = pa;
                    b = pb;
                }
                _ => break,
            }
        }

        // Appending never changes dst's minimum unless dst was empty;
        // draining src's head always changes src's.
        if dst_was_empty {
            self.refresh_parent_key(dst);
        }
        if self.nodes.get(src).count() > 0 {
            self.refresh_parent_key(src);
        }
    }

    /// Detaches an emptied node from its parent (and the leaf chain), frees
    /// it, and continues rebalancing upward. The first leaf is exempt.
    fn unlink_empty(&mut self, node: NodeId) {
        if node == self.first_leaf {
            return;
        }
        let Some(parent) = self.nodes.get(node).parent() else {
            return;
        };
        let slot = self.nodes.get(parent).as_internal().slot_of(node);
        self.nodes.get_mut(parent).as_internal_mut().remove_entry(slot);

        if self.nodes.get(node).is_leaf() {
            let leaf = self.nodes.get(node).as_leaf();
            let (prev, next) = (leaf.prev(), leaf.next());
            if let Some(prev) = prev {
                self.nodes.get_mut(prev).as_leaf_mut().set_next(next);
            }
            if let Some(next) = next {
                self.nodes.get_mut(next).as_leaf_mut().set_prev(prev);
            }
        }
        self.nodes.free(node);

        if slot == 0 {
            self.refresh_parent_key(parent);
        }
        self.merge(parent);
    }

    /// While the root is an internal node with a single child, promote that
    /// child.
    fn collapse_root(&mut self) {
        loop {
            let Node::Internal(internal) = self.nodes.get(self.root) else {
                return;
            };
            if internal.count() != 1 {
                return;
            }
            let child = internal.child(0);
            let old_root = self.root;
            self.nodes.get_mut(child).set_parent(None);
            self.root = child;
            self.nodes.free(old_root);
        }
    }
}

impl<K: Clone, V: Clone> Clone for RawRankTree<K, V> {
    fn clone(&self) -> Self {
        // Ids are arena indices, so a slot-for-slot clone preserves the
        // whole graph verbatim.
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            first_leaf: self.first_leaf,
            order: self.order,
        }
    }
}
