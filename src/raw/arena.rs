use alloc::vec::Vec;
use core::num::NonZero;

/// Identifies a node slot in the [`Arena`].
///
/// Stored shifted by one so the niche optimization makes `Option<NodeId>`
/// the same size as `NodeId` — parent and sibling links cost four bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct NodeId(NonZero<u32>);

impl NodeId {
    pub(crate) const MAX: usize = (u32::MAX - 1) as usize;

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`NodeId::from_index()` - `index` > `NodeId::MAX`!");
        // SAFETY: `index + 1` cannot be zero and cannot overflow u32 after the bound check.
        #[allow(clippy::cast_possible_truncation)]
        Self(NonZero::new((index + 1) as u32).unwrap())
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Slot arena owning every node of a tree.
///
/// Freed slots are recycled through a free list, so a `NodeId` is only valid
/// until the slot it names is freed. The tree structure never retains an id
/// to a freed slot; that discipline lives in `raw::tree`.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<NodeId>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live (allocated, not freed) slots.
    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) fn alloc(&mut self, element: T) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.to_index()] = Some(element);
            id
        } else {
            assert!(
                self.slots.len() < NodeId::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                NodeId::MAX
            );
            self.slots.push(Some(element));
            NodeId::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &T {
        self.slots[id.to_index()].as_ref().expect("`Arena::get()` - `id` is freed!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut T {
        self.slots[id.to_index()].as_mut().expect("`Arena::get_mut()` - `id` is freed!")
    }

    /// Removes the element at `id` and returns it, recycling the slot.
    pub(crate) fn take(&mut self, id: NodeId) -> T {
        let element = self.slots[id.to_index()].take().expect("`Arena::take()` - `id` is freed!");
        self.free.push(id);
        element
    }

    pub(crate) fn free(&mut self, id: NodeId) {
        drop(self.take(id));
    }

    /// Frees every slot except `keep`, which stays live and keeps its id.
    pub(crate) fn reset_keeping(&mut self, keep: NodeId) {
        let keep = keep.to_index();
        self.free.clear();
        for index in 0..self.slots.len() {
            if index == keep {
                continue;
            }
            self.slots[index] = None;
            self.free.push(NodeId::from_index(index));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    // Verify the niche optimization assumptions behind the link fields.
    assert_eq_size!(NodeId, Option<NodeId>);
    assert_eq_size!(NodeId, u32);

    #[test]
    fn id_round_trip() {
        for index in [0usize, 1, 17, NodeId::MAX] {
            assert_eq!(NodeId::from_index(index).to_index(), index);
        }
    }

    #[test]
    fn reset_keeping_retains_one_slot() {
        let mut arena: Arena<u32> = Arena::new();
        let a = arena.alloc(1);
        let b = arena.alloc(2);
        let c = arena.alloc(3);
        arena.reset_keeping(b);
        assert_eq!(arena.len(), 1);
        assert_eq!(*arena.get(b), 2);
        // Freed slots are recycled before the vector grows.
        let d = arena.alloc(4);
        assert!(d == a || d == c);
    }

    proptest! {
        #[test]
        fn arena_behaves_like_model(operations in prop::collection::vec(strategy(), 0..256)) {
            let mut model: Vec<(NodeId, u32)> = Vec::new();
            let mut arena: Arena<u32> = Arena::new();

            for operation in operations {
                match operation {
                    Operation::Alloc(value) => {
                        let id = arena.alloc(value);
                        model.push((id, value));
                    }
                    Operation::Mutate(which, value) => {
                        if model.is_empty() {
                            continue;
                        }
                        let index = which % model.len();
                        *arena.get_mut(model[index].0) = value;
                        model[index].1 = value;
                    }
                    Operation::Take(which) => {
                        if model.is_empty() {
                            continue;
                        }
                        let index = which % model.len();
                        let taken = arena.take(model[index].0);
                        let (_, expected) = model.swap_remove(index);
                        prop_assert_eq!(taken, expected);
                    }
                }

                prop_assert_eq!(arena.len(), model.len());
                for &(id, value) in &model {
                    prop_assert_eq!(*arena.get(id), value);
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Alloc(u32),
        Mutate(usize, u32),
        Take(usize),
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            4 => any::<u32>().prop_map(Operation::Alloc),
            2 => (any::<usize>(), any::<u32>()).prop_map(|(w, v)| Operation::Mutate(w, v)),
            2 => any::<usize>().prop_map(Operation::Take),
        ]
    }
}
