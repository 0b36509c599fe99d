use std::collections::BTreeSet;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rank_tree::{Rank, RankTreeSet, TreeError};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 4_000;

fn key_strategy() -> impl Strategy<Value = i64> {
    -2_000i64..2_000i64
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum SetOp {
    Insert(i64),
    Remove(i64),
    Contains(i64),
    IndexOf(i64),
    First,
    Last,
}

fn set_op_strategy() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        5 => key_strategy().prop_map(SetOp::Insert),
        3 => key_strategy().prop_map(SetOp::Remove),
        2 => key_strategy().prop_map(SetOp::Contains),
        1 => key_strategy().prop_map(SetOp::IndexOf),
        1 => Just(SetOp::First),
        1 => Just(SetOp::Last),
    ]
}

// ─── Core operations ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Replays a random sequence of operations on both RankTreeSet and
    /// BTreeSet and asserts identical results at every step.
    #[test]
    fn set_ops_match_btreeset(ops in proptest::collection::vec(set_op_strategy(), TEST_SIZE)) {
        let mut rt_set: RankTreeSet<i64> = RankTreeSet::new();
        let mut bt_set: BTreeSet<i64> = BTreeSet::new();

        for op in &ops {
            match op {
                SetOp::Insert(k) => {
                    prop_assert_eq!(rt_set.insert(*k), bt_set.insert(*k), "insert({})", k);
                }
                SetOp::Remove(k) => {
                    prop_assert_eq!(rt_set.remove(k), bt_set.remove(k), "remove({})", k);
                }
                SetOp::Contains(k) => {
                    prop_assert_eq!(rt_set.contains(k), bt_set.contains(k), "contains({})", k);
                }
                SetOp::IndexOf(k) => {
                    let expected = bt_set.iter().position(|probe| probe == k);
                    prop_assert_eq!(rt_set.index_of(k), expected, "index_of({})", k);
                }
                SetOp::First => {
                    prop_assert_eq!(rt_set.first(), bt_set.first());
                }
                SetOp::Last => {
                    prop_assert_eq!(rt_set.last(), bt_set.last());
                }
            }
            prop_assert_eq!(rt_set.len(), bt_set.len(), "len mismatch after {:?}", op);
        }

        let rt_items: Vec<_> = rt_set.iter().copied().collect();
        let bt_items: Vec<_> = bt_set.iter().copied().collect();
        prop_assert_eq!(rt_items, bt_items, "final iteration mismatch");
    }

    /// whereGreaterOrEqual / whereLessOrEqualBackwards yield exactly the
    /// sorted suffix and reversed prefix around the probe key.
    #[test]
    fn directional_ranges(
        values in proptest::collection::vec(key_strategy(), 0..800),
        probe in key_strategy(),
    ) {
        let rt_set: RankTreeSet<i64> = values.iter().copied().collect();
        let sorted: Vec<i64> = rt_set.iter().copied().collect();

        let from: Vec<i64> = rt_set.range_from(&probe).copied().collect();
        let expected: Vec<i64> = sorted.iter().copied().filter(|&v| v >= probe).collect();
        prop_assert_eq!(from, expected, "range_from({})", probe);

        let back: Vec<i64> = rt_set.range_to_rev(&probe).copied().collect();
        let mut expected: Vec<i64> = sorted.iter().copied().filter(|&v| v <= probe).collect();
        expected.reverse();
        prop_assert_eq!(back, expected, "range_to_rev({})", probe);
    }

    /// at(i) equals the i-th yield of the forward iterator, and the rank
    /// round-trips through index_of.
    #[test]
    fn positional_access(values in proptest::collection::vec(key_strategy(), 1..600)) {
        let rt_set: RankTreeSet<i64> = values.iter().copied().collect();
        for (index, value) in rt_set.iter().enumerate() {
            prop_assert_eq!(rt_set.get_at(index), Some(value));
            prop_assert_eq!(rt_set.index_of(value), Some(index));
        }
        prop_assert_eq!(rt_set.get_at(rt_set.len()), None);
    }
}

// ─── Scenario walkthroughs ───────────────────────────────────────────────────

/// Order-3 tree, keys 1..9 in order, remove(3), then removeAt(0): forward
/// iteration yields 2,4,5,6,7,8,9.
#[test]
fn smallest_order_walkthrough() {
    let mut set: RankTreeSet<i32> = RankTreeSet::with_order(3).unwrap();
    for key in 1..=9 {
        assert!(set.insert(key));
    }
    assert!(set.remove(&3));
    assert_eq!(set.remove_at(0), Ok(1));

    let remaining: Vec<i32> = set.iter().copied().collect();
    assert_eq!(remaining, [2, 4, 5, 6, 7, 8, 9]);
}

/// 10,000 random values in [0, 1000) with duplicates allowed at node order
/// 10: iteration equals the sorted multiset, and the strict index queries
/// bracket every run exactly.
#[test]
fn duplicate_runs_bracketed_by_index_queries() {
    let mut rng = StdRng::seed_from_u64(7);
    let values: Vec<i32> = (0..10_000).map(|_| rng.gen_range(0..1_000)).collect();

    let mut set: RankTreeSet<i32> = RankTreeSet::with_order(10).unwrap();
    set.set_allows_duplicates(true).unwrap();
    for &v in &values {
        assert!(set.insert(v));
    }

    let mut sorted = values.clone();
    sorted.sort_unstable();
    let forward: Vec<i32> = set.iter().copied().collect();
    assert_eq!(forward, sorted);

    for &k in sorted.iter().step_by(997) {
        let first = sorted.iter().position(|&v| v == k).unwrap();
        let last = sorted.iter().rposition(|&v| v == k).unwrap();
        assert_eq!(set.first_index_greater_than(&(k - 1)), Some(first), "first index of {k}");
        assert_eq!(set.last_index_less_than(&(k + 1)), Some(last), "last index of {k}");
    }
}

/// Repeated removeAt(random) until empty matches a reference list step for
/// step.
#[test]
fn random_remove_at_until_empty() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut set: RankTreeSet<i64> = RankTreeSet::with_order(10).unwrap();
    let mut reference: Vec<i64> = Vec::new();
    let mut value = 0i64;
    while reference.len() < 1_000 {
        value += 1 + i64::from(rng.gen_range(0..3u8));
        set.insert(value);
        reference.push(value);
    }

    while !reference.is_empty() {
        let index = rng.gen_range(0..reference.len());
        assert_eq!(set.remove_at(index), Ok(reference.remove(index)));
        if reference.len() % 100 == 0 {
            let remaining: Vec<i64> = set.iter().copied().collect();
            assert_eq!(remaining, reference);
        }
    }
    assert!(set.is_empty());
}

// ─── Duplicates and bias on the set ──────────────────────────────────────────

#[test]
fn multiset_counts_runs() {
    let mut set: RankTreeSet<i32> = RankTreeSet::with_order(4).unwrap();
    set.set_allows_duplicates(true).unwrap();
    for v in [5, 3, 5, 5, 1, 3] {
        set.insert(v);
    }
    assert_eq!(set.len(), 6);
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 3, 3, 5, 5, 5]);

    // Each remove takes exactly one member of the run.
    assert!(set.remove(&5));
    assert!(set.remove(&5));
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 3, 3, 5]);
    assert!(set.contains(&5));
    assert!(set.remove(&5));
    assert!(!set.contains(&5));
}

#[test]
fn try_insert_is_strict_without_duplicates() {
    let mut set: RankTreeSet<i32> = RankTreeSet::new();
    set.try_insert(1).unwrap();
    assert_eq!(set.try_insert(1), Err(TreeError::DuplicateKey));
    assert!(!set.insert(1));
    assert_eq!(set.len(), 1);

    set.set_allows_duplicates(true).unwrap();
    assert!(set.insert(1));
    assert_eq!(set.len(), 2);
}

// ─── Configuration, errors, and the remaining surface ────────────────────────

#[test]
fn invalid_order_is_rejected() {
    assert_eq!(RankTreeSet::<i32>::with_order(2).err(), Some(TreeError::InvalidCapacity(2)));
    assert!(RankTreeSet::<i32>::with_order(3).is_ok());
}

#[test]
#[should_panic(expected = "cannot mutate a read-only container")]
fn read_only_rejects_clear() {
    let mut set: RankTreeSet<i32> = RankTreeSet::new();
    set.insert(1);
    set.set_read_only(true);
    set.clear();
}

#[test]
fn custom_comparator_orders_by_length() {
    let mut set = RankTreeSet::with_comparator(|a: &&str, b: &&str| a.len().cmp(&b.len()).then(a.cmp(b)));
    for word in ["kiwi", "fig", "banana", "apple"] {
        set.insert(word);
    }
    let words: Vec<_> = set.iter().copied().collect();
    assert_eq!(words, ["fig", "kiwi", "apple", "banana"]);
    assert_eq!(set.index_of(&"apple"), Some(2));
}

#[test]
fn copy_to_and_rank_indexing() {
    let set = RankTreeSet::from([30, 10, 20]);
    assert_eq!(set[Rank(1)], 20);

    let mut dst = [0; 5];
    set.copy_to(&mut dst, 2).unwrap();
    assert_eq!(dst, [0, 0, 10, 20, 30]);
    let mut too_small = [0; 2];
    assert!(set.copy_to(&mut too_small, 0).is_err());
}

#[test]
fn iteration_surface() {
    let set = RankTreeSet::from([4, 1, 3, 2]);

    assert_eq!(set.iter_from_index(2).copied().collect::<Vec<_>>(), [3, 4]);
    assert_eq!(set.iter_from_index(4).count(), 0);
    assert_eq!(set.iter_back_from_index(2).copied().collect::<Vec<_>>(), [3, 2, 1]);
    assert_eq!(set.iter().rev().copied().collect::<Vec<_>>(), [4, 3, 2, 1]);
    assert_eq!(set.range(&2, &3).unwrap().copied().collect::<Vec<_>>(), [2, 3]);
    assert_eq!(set.range(&3, &2).err(), Some(TreeError::InvalidRange));

    let owned: Vec<i32> = set.clone().into_iter().collect();
    assert_eq!(owned, [1, 2, 3, 4]);

    let debug = format!("{set:?}");
    assert_eq!(debug, "{1, 2, 3, 4}");
}

/// Clearing preserves the container's identity: rebuilding yields the same
/// sequence as building fresh (first-leaf reuse is an internal detail, but
/// it must not leak into observable order).
#[test]
fn clear_then_rebuild_matches_fresh_build() {
    let mut set: RankTreeSet<i32> = RankTreeSet::with_order(3).unwrap();
    for v in 0..200 {
        set.insert(v * 7 % 100);
    }
    set.clear();
    assert_eq!(set.len(), 0);
    assert_eq!(set.iter().count(), 0);

    let mut fresh: RankTreeSet<i32> = RankTreeSet::with_order(3).unwrap();
    for v in [9, 4, 6, 1] {
        set.insert(v);
        fresh.insert(v);
    }
    assert_eq!(set.iter().collect::<Vec<_>>(), fresh.iter().collect::<Vec<_>>());
}
